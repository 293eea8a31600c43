use std::{convert::Infallible, fmt::Write};

use async_trait::async_trait;
use bytes::Bytes;
use http::{header::CONTENT_TYPE, Request, Response};
use multer::{Constraints, Multipart, SizeLimit};

use crate::server::{
    handler::{Error, Handler},
    sniff,
    sniff::normalize_media_type,
};

/// Media types whose bodies are logged verbatim. Anything else is sniffed
/// and, if still not on this list, logged as a placeholder only.
const LOGGABLE_MEDIA_TYPES: &[&str] = &[
    "application/x-www-form-urlencoded",
    "application/javascript",
    "application/json",
    "application/xml",
    "text/plain",
    "text/html",
    "text/csv",
    "text/xml",
];

/// Upper bound for multipart parsing; parts beyond it fail the request.
const MULTIPART_MAX_BYTES: u64 = 32 * 1024 * 1024;

const SECTION_RULE: &str = "--------------------------------------------------";
const BANNER_RULE: &str = "==================================================";

/// Middleware that observes every request for logging before the
/// dispatcher sees it. The body is an owned buffer by the time a handler
/// runs, so inspection reads cheap views of it and the inner handler
/// receives the identical bytes no matter how often the inspector looked.
pub struct TrafficInspector<H>
where
    H: Handler + Send + Sync + 'static,
{
    inner: H,
}

#[async_trait]
impl<H> Handler for TrafficInspector<H>
where
    H: Handler + Send + Sync + 'static,
{
    async fn handle(&self, req: Request<Bytes>) -> Result<Response<Bytes>, Error> {
        let mut entry = String::new();

        let _ = writeln!(entry);
        let _ = writeln!(entry, "{}", BANNER_RULE);
        let _ = writeln!(entry, "[{}] {}", req.method(), req.uri().path());
        let _ = writeln!(entry, "{}", BANNER_RULE);

        let _ = writeln!(entry, "Headers");
        let _ = writeln!(entry, "{}", SECTION_RULE);
        for (name, value) in req.headers() {
            let _ = writeln!(entry, "{}: {}", name, String::from_utf8_lossy(value.as_bytes()));
        }
        let _ = writeln!(entry, "{}", SECTION_RULE);
        let _ = writeln!(entry);

        let _ = writeln!(entry, "Body");
        let _ = writeln!(entry, "{}", SECTION_RULE);
        self.inspect_body(&req, &mut entry).await?;
        let _ = writeln!(entry, "{}", SECTION_RULE);

        // One event per request so concurrent entries never interleave.
        tracing::info!(target: "apisim::traffic", "{}", entry);

        self.inner.handle(req).await
    }
}

impl<H> TrafficInspector<H>
where
    H: Handler + Send + Sync + 'static,
{
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    async fn inspect_body(&self, req: &Request<Bytes>, entry: &mut String) -> Result<(), Error> {
        let body = req.body();
        let raw_content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());

        if body.is_empty() {
            let _ = writeln!(entry, "(no body)");
            return Ok(());
        }

        let declared = raw_content_type.map(normalize_media_type);

        if declared.as_deref() == Some("multipart/form-data") {
            // raw_content_type is present here, the boundary lives in its parameters
            let boundary = multer::parse_boundary(raw_content_type.unwrap_or_default())?;
            return inspect_multipart(body.clone(), boundary, entry).await;
        }

        if let Some(declared) = declared.as_deref() {
            if LOGGABLE_MEDIA_TYPES.contains(&declared) {
                let _ = writeln!(entry, "{}", String::from_utf8_lossy(body));
                return Ok(());
            }
        }

        // Unlisted or absent content type: sniff a bounded prefix and decide
        // from the detected type. The dispatcher always gets the full
        // original buffer regardless of the outcome here.
        let detected = sniff::detect(body);
        if LOGGABLE_MEDIA_TYPES.contains(&detected) {
            let _ = writeln!(entry, "(content type detected as {})", detected);
            let _ = writeln!(entry, "{}", String::from_utf8_lossy(body));
        } else {
            let _ = writeln!(
                entry,
                "(body not logged: unsupported content type {})",
                declared.as_deref().unwrap_or(detected)
            );
        }

        Ok(())
    }
}

/// Parses the multipart structure and logs field names/values and file
/// metadata. Raw file bytes are never logged. A parse error fails the
/// request with a server error.
async fn inspect_multipart(body: Bytes, boundary: String, entry: &mut String) -> Result<(), Error> {
    let stream = futures_util::stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let constraints =
        Constraints::new().size_limit(SizeLimit::new().whole_stream(MULTIPART_MAX_BYTES));
    let mut multipart = Multipart::with_constraints(stream, boundary, constraints);

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        if let Some(file_name) = field.file_name() {
            let _ = writeln!(
                entry,
                "Form Field: {}, FileName: {}, Content-Type: {}",
                name,
                file_name,
                field
                    .content_type()
                    .map(|mime| mime.to_string())
                    .unwrap_or_default()
            );
        } else {
            let value = field.text().await?;
            let _ = writeln!(entry, "Form Field: {}, Value: {}", name, value);
        }
    }

    Ok(())
}
