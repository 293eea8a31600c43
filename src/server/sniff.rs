//! Content-type detection from leading body bytes, used by the traffic
//! inspector when a request carries no content type or one that is not on
//! the loggable allow-list.

/// Number of leading bytes the detector samples. Bodies shorter than this
/// are sampled in full.
pub const SNIFF_SAMPLE_SIZE: usize = 512;

/// Strips parameters from a media type and case-folds it, so
/// `Application/JSON; charset=utf-8` becomes `application/json`.
pub fn normalize_media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Detects a media type from the first bytes of a body. Only inspects up to
/// [`SNIFF_SAMPLE_SIZE`] bytes; passing a longer slice is fine. The returned
/// label is already normalized (lowercase, no parameters).
pub fn detect(body: &[u8]) -> &'static str {
    let sample = &body[..body.len().min(SNIFF_SAMPLE_SIZE)];

    // UTF-16 BOMs mark text we cannot inspect further byte-wise.
    if sample.starts_with(&[0xFE, 0xFF]) || sample.starts_with(&[0xFF, 0xFE]) {
        return "text/plain";
    }

    let trimmed = skip_leading_whitespace(strip_utf8_bom(sample));
    if trimmed.is_empty() {
        return "text/plain";
    }

    const HTML_SIGNATURES: &[&str] = &[
        "<!doctype html", "<html", "<head", "<body", "<script", "<iframe", "<div", "<table",
        "<a ", "<p", "<!--",
    ];

    if starts_with_any_ci(trimmed, HTML_SIGNATURES) {
        return "text/html";
    }

    if starts_with_ci(trimmed, "<?xml") {
        return "text/xml";
    }

    if matches!(trimmed[0], b'{' | b'[' | b'"') {
        return "application/json";
    }

    if contains_binary_bytes(sample) {
        return "application/octet-stream";
    }

    "text/plain"
}

fn strip_utf8_bom(sample: &[u8]) -> &[u8] {
    sample
        .strip_prefix(&[0xEF, 0xBB, 0xBF])
        .unwrap_or(sample)
}

fn skip_leading_whitespace(sample: &[u8]) -> &[u8] {
    let start = sample
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(sample.len());
    &sample[start..]
}

fn starts_with_any_ci(sample: &[u8], signatures: &[&str]) -> bool {
    signatures.iter().any(|sig| starts_with_ci(sample, sig))
}

fn starts_with_ci(sample: &[u8], signature: &str) -> bool {
    sample.len() >= signature.len()
        && sample[..signature.len()].eq_ignore_ascii_case(signature.as_bytes())
}

fn contains_binary_bytes(sample: &[u8]) -> bool {
    sample
        .iter()
        .any(|&b| b < 0x09 || (0x0E..0x20).contains(&b) || b == 0x7F)
}
