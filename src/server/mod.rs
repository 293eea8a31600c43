pub mod builder;
pub mod handler;
pub mod inspector;
pub mod matcher;
pub mod persistence;
pub mod server;
pub mod sniff;
pub mod state;

use crate::server::{handler::FixtureHandler, inspector::TrafficInspector, server::MockServer, state::InMemoryFixtureStore};

/// The fully wired server type the builder produces by default: the
/// traffic inspector wrapping the fixture dispatcher over the in-memory
/// store.
pub type ApiSimServer = MockServer<TrafficInspector<FixtureHandler<InMemoryFixtureStore>>>;
