mod common;

use common::{fixture, start_server};
use reqwest::StatusCode;

#[tokio::test]
async fn placeholder_logged_body_still_reaches_the_matcher_intact() {
    // The recorded shape body contains control bytes, so the inspector
    // refuses to log it; the dispatcher must still see every byte.
    let shape_body = "\u{0}\u{1}\u{2}binary-ish payload";
    let (addr, _shutdown) = start_server(vec![fixture(
        "POST",
        "/bin",
        shape_body,
        200,
        &[],
        "matched binary body",
    )])
    .await;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("http://{}/bin", addr))
        .header("Content-Type", "application/octet-stream")
        .body(shape_body.as_bytes().to_vec())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "matched binary body");
}

#[tokio::test]
async fn sniffed_body_is_handed_downstream_unchanged() {
    // No Content-Type header at all: the inspector samples a prefix to
    // detect the type, then the matcher compares the full original bytes.
    let body = "{\"sniff\":\"me\"}";
    let (addr, _shutdown) =
        start_server(vec![fixture("POST", "/sniffed", body, 200, &[], "sniffed ok")]).await;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("http://{}/sniffed", addr))
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "sniffed ok");
}

#[tokio::test]
async fn large_body_restoration_is_lossless_past_the_sniff_sample() {
    // Body far larger than the 512 byte sniff sample; a fixture matches it
    // byte-for-byte, which fails if the inspector truncates or reorders.
    let body = "z".repeat(64 * 1024);
    let (addr, _shutdown) =
        start_server(vec![fixture("POST", "/large", &body, 200, &[], "large ok")]).await;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("http://{}/large", addr))
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "large ok");
}

#[tokio::test]
async fn multipart_request_still_goes_through_method_url_matching() {
    // Multipart bodies are inspected (field values and file metadata only)
    // but are not a match discriminator; with no fixture for the route the
    // dispatcher answers with the regular 404, not a server error.
    let (addr, _shutdown) = start_server(vec![]).await;

    let form = reqwest::multipart::Form::new()
        .text("name", "bob")
        .part(
            "upload",
            reqwest::multipart::Part::bytes(b"file contents".to_vec())
                .file_name("a.txt")
                .mime_str("text/plain")
                .unwrap(),
        );

    let client = reqwest::Client::new();
    let res = client
        .post(format!("http://{}/upload", addr))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "request not found");
}

#[tokio::test]
async fn malformed_multipart_is_a_server_error() {
    let (addr, _shutdown) = start_server(vec![]).await;

    // multipart/form-data without a boundary parameter cannot be parsed.
    let client = reqwest::Client::new();
    let res = client
        .post(format!("http://{}/upload", addr))
        .header("Content-Type", "multipart/form-data")
        .body("not really multipart")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn json_content_type_with_mismatched_body_still_gets_404() {
    // The informational JSON comparison runs for JSON content types but
    // never decides the match; equal structure with different bytes loses.
    let (addr, _shutdown) = start_server(vec![fixture(
        "POST",
        "/v1/doc",
        "{\"a\": 1}",
        200,
        &[],
        "doc",
    )])
    .await;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("http://{}/v1/doc", addr))
        .header("Content-Type", "application/json")
        .body("{\"a\":1}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
