//! `apisim` is a fixture-replay HTTP API simulator. It loads a catalog of
//! (method, URL, request shape) → response mappings from a JSON file at
//! startup and answers every incoming request with the recorded response of
//! the single best-matching fixture, or a structured 404 if none matches.
//!
//! Requests are matched in two steps:
//!
//! * an indexed lookup over the compound (method, URL) key selects the
//!   candidate fixtures, and
//! * when several fixtures share that key, the request body disambiguates
//!   them by byte-for-byte equality with each fixture's recorded request
//!   body (the last match in catalog order wins).
//!
//! Every request additionally passes through a traffic inspector that logs
//! method, path, headers and body — sniffing the content type from leading
//! bytes when the declared one is missing or not loggable, and reporting
//! multipart uploads as field/file metadata — without disturbing the body
//! the matching engine reads.
//!
//! # Example
//!
//! ```no_run
//! use apisim::server::builder::ApiSimServerBuilder;
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = ApiSimServerBuilder::new()
//!         .port(8800)
//!         .fixture_file("data/api-data.json")
//!         .build();
//!
//!     server.start().await.expect("server failed");
//! }
//! ```

pub mod common;
pub mod server;

pub mod prelude {
    pub use crate::{
        common::data::{FixtureDefinition, FixtureRecord, RecordedResponse, RequestShape},
        server::{
            builder::ApiSimServerBuilder,
            state::{FixtureStore, InMemoryFixtureStore},
            ApiSimServer,
        },
    };
}
