use std::{path::PathBuf, sync::Arc};

use crate::server::{
    handler::FixtureHandler,
    inspector::TrafficInspector,
    persistence::read_fixture_definitions,
    server::{MockServer, MockServerConfig},
    state::{FixtureStore, InMemoryFixtureStore},
    ApiSimServer,
};

/// Assembles the server: constructs the store, loads the fixture catalog
/// and wires the inspector around the dispatcher. Configuration not set
/// here falls back to defaults suitable for local use.
pub struct ApiSimServerBuilder {
    port: Option<u16>,
    expose: Option<bool>,
    fixture_file: Option<PathBuf>,
}

impl ApiSimServerBuilder {
    pub fn new() -> Self {
        ApiSimServerBuilder {
            port: None,
            expose: None,
            fixture_file: None,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn port_option(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Exposes the server on all interfaces instead of loopback only.
    pub fn expose(mut self, expose: bool) -> Self {
        self.expose = Some(expose);
        self
    }

    pub fn expose_option(mut self, expose: Option<bool>) -> Self {
        self.expose = expose;
        self
    }

    /// Path of the JSON fixture catalog to load at startup.
    pub fn fixture_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.fixture_file = Some(path.into());
        self
    }

    pub fn fixture_file_option(mut self, path: Option<PathBuf>) -> Self {
        self.fixture_file = path;
        self
    }

    /// Builds the server with a freshly loaded in-memory store. A fixture
    /// file that cannot be read or parsed is logged and leaves the store
    /// empty; the server still starts and serves 404s.
    pub fn build(self) -> ApiSimServer {
        let store = Arc::new(InMemoryFixtureStore::new());

        if let Some(path) = &self.fixture_file {
            match read_fixture_definitions(path.clone()) {
                Ok(definitions) => match store.load(definitions) {
                    Ok(ids) => tracing::info!("Loaded {} fixtures", ids.len()),
                    Err(err) => tracing::error!("cannot load fixtures into store: {}", err),
                },
                Err(err) => tracing::error!(
                    "cannot read fixture file '{}': {}",
                    path.to_string_lossy(),
                    err
                ),
            }
        }

        self.build_with_store(store)
    }

    /// Builds the server around an existing store. Tests use this seam to
    /// load fixtures programmatically.
    pub fn build_with_store<S>(
        self,
        store: Arc<S>,
    ) -> MockServer<TrafficInspector<FixtureHandler<S>>>
    where
        S: FixtureStore + Send + Sync + 'static,
    {
        let handler = TrafficInspector::new(FixtureHandler::new(store));

        MockServer::new(
            Box::new(handler),
            MockServerConfig {
                static_port: self.port,
                expose: self.expose.unwrap_or(false),
            },
        )
    }
}

impl Default for ApiSimServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
