use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::{header::CONTENT_TYPE, Request, Response, StatusCode};
use serde::Serialize;
use thiserror::Error;

use crate::{
    common::data::RecordedResponse,
    server::{matcher, state, state::FixtureStore},
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot query fixture store: {0}")]
    StoreError(#[from] state::Error),
    #[error("cannot construct response: {0}")]
    ResponseConstructionError(#[from] http::Error),
    #[error("invalid status code recorded in fixture: {0}")]
    InvalidStatusCode(#[from] http::status::InvalidStatusCode),
    #[error("cannot serialize response body: {0}")]
    ResponseBodySerializeError(#[from] serde_json::Error),
    #[error("cannot parse multipart form data: {0}")]
    MultipartError(#[from] multer::Error),
    #[error("unknown error")]
    Unknown,
}

/// Request-handling seam between the server loop, the traffic inspector and
/// the dispatcher. The request body is already fully buffered when a
/// handler sees it.
#[async_trait]
pub trait Handler {
    async fn handle(&self, req: Request<Bytes>) -> Result<Response<Bytes>, Error>;
}

/// The request dispatcher: queries the store by (method, URL), lets the
/// body matcher disambiguate, and replays the winning fixture's recorded
/// response. Anything else receives the structured 404 fallback.
pub struct FixtureHandler<S>
where
    S: FixtureStore + Send + Sync + 'static,
{
    store: Arc<S>,
}

#[async_trait]
impl<S> Handler for FixtureHandler<S>
where
    S: FixtureStore + Send + Sync + 'static,
{
    async fn handle(&self, req: Request<Bytes>) -> Result<Response<Bytes>, Error> {
        let method = req.method().as_str();
        let url = request_url(&req);
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());

        let candidates = self.store.query_by_method_and_url(method, &url)?;

        tracing::trace!(
            method,
            url = %url,
            candidates = candidates.len(),
            "dispatching request"
        );

        if let Some(fixture) = matcher::select_fixture(content_type, req.body(), &candidates) {
            tracing::debug!(fixture_id = fixture.id, "serving fixture response");
            return serve_recorded_response(&fixture.response);
        }

        not_found_response()
    }
}

impl<S> FixtureHandler<S>
where
    S: FixtureStore + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

/// The URL fixtures are keyed on: path plus query, exactly as sent.
fn request_url(req: &Request<Bytes>) -> String {
    req.uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string())
}

fn serve_recorded_response(recorded: &RecordedResponse) -> Result<Response<Bytes>, Error> {
    let mut builder = Response::builder().status(StatusCode::from_u16(recorded.status_code)?);

    for (name, value) in &recorded.headers {
        builder = builder.header(name, value);
    }

    let body = if recorded.body.is_empty() {
        Bytes::new()
    } else {
        Bytes::from(recorded.body.clone())
    };

    Ok(builder.body(body)?)
}

#[derive(Serialize)]
struct ErrorMessage<'a> {
    message: &'a str,
}

fn not_found_response() -> Result<Response<Bytes>, Error> {
    let body = serde_json::to_vec(&ErrorMessage {
        message: "request not found",
    })?;

    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(CONTENT_TYPE, "application/json")
        .body(Bytes::from(body))?)
}
