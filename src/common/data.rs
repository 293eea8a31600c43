use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Describes what an incoming request must look like to be served by a
/// fixture. Headers are advisory and currently not used for matching;
/// method, URL and body drive the decision.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestShape {
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: String,
}

/// The recorded response a fixture replays on a match.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RecordedResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: String,
}

/// One fixture as it appears in the fixture file, before the store has
/// assigned it an id. Field names mirror the on-disk JSON document.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FixtureDefinition {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub request: RequestShape,
    pub response: RecordedResponse,
}

/// An immutable fixture record held by the store. The id is assigned at
/// load time, uniquely identifies the record for the life of the process
/// and is never reused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixtureRecord {
    pub id: usize,
    pub method: String,
    pub url: String,
    pub request: RequestShape,
    pub response: RecordedResponse,
}

impl FixtureRecord {
    pub fn new(id: usize, definition: FixtureDefinition) -> Self {
        Self {
            id,
            method: definition.method,
            url: definition.url,
            request: definition.request,
            response: definition.response,
        }
    }
}
