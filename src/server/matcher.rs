use std::sync::Arc;

use serde_json::Value;

use crate::{common::data::FixtureRecord, server::sniff::normalize_media_type};

/// Selects the fixture that should serve a request from a candidate set
/// sharing the request's method and URL.
///
/// The binding decision is byte-for-byte equality between the live body and
/// the fixture's recorded request body; the last candidate in iteration
/// order that matches wins. When the declared content type indicates JSON,
/// both sides are additionally compared structurally — that comparison is
/// informational only and is logged, it never influences which fixture is
/// selected. Changing this to a semantic decision requires an explicit
/// contract change.
pub fn select_fixture(
    content_type: Option<&str>,
    body: &[u8],
    candidates: &[Arc<FixtureRecord>],
) -> Option<Arc<FixtureRecord>> {
    let mut winner: Option<Arc<FixtureRecord>> = None;

    for candidate in candidates {
        if body_matches(content_type, body, &candidate.request.body) {
            winner = Some(candidate.clone());
        }
    }

    winner
}

fn body_matches(content_type: Option<&str>, live_body: &[u8], fixture_body: &str) -> bool {
    if content_type.map(indicates_json).unwrap_or(false) {
        log_json_comparison(live_body, fixture_body);
    }

    live_body == fixture_body.as_bytes()
}

fn indicates_json(content_type: &str) -> bool {
    normalize_media_type(content_type).contains("json")
}

/// Diagnostic-only structural comparison of the two bodies as JSON. Parse
/// failures are logged and count as "not JSON-equal" without affecting the
/// byte-equality decision.
fn log_json_comparison(live_body: &[u8], fixture_body: &str) {
    let live: Result<Value, _> = serde_json::from_slice(live_body);
    let fixture: Result<Value, _> = serde_json::from_str(fixture_body);

    match (live, fixture) {
        (Ok(live), Ok(fixture)) => {
            if live == fixture {
                tracing::debug!("JSON bodies are structurally equal");
            } else {
                tracing::debug!("JSON bodies are structurally different");
            }
        }
        (live, fixture) => {
            tracing::debug!(
                live_parse_failed = live.is_err(),
                fixture_parse_failed = fixture.is_err(),
                "cannot compare bodies as JSON"
            );
        }
    }
}
