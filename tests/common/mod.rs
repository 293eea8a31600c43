use std::{collections::BTreeMap, net::SocketAddr, sync::Arc};

use tokio::sync::oneshot;

use apisim::prelude::*;

/// Starts a server with the given fixtures on an ephemeral loopback port.
/// Returns the bound address and a sender that shuts the server down when
/// dropped or triggered.
pub async fn start_server(definitions: Vec<FixtureDefinition>) -> (SocketAddr, oneshot::Sender<()>) {
    let store = Arc::new(InMemoryFixtureStore::new());
    store.load(definitions).expect("cannot load fixtures");

    let server = ApiSimServerBuilder::new().build_with_store(store);

    let (addr_tx, addr_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        server
            .start_with_signals(Some(addr_tx), async {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("server failed");
    });

    let addr = addr_rx.await.expect("server did not publish its address");
    (addr, shutdown_tx)
}

pub fn fixture(
    method: &str,
    url: &str,
    shape_body: &str,
    status: u16,
    response_headers: &[(&str, &str)],
    response_body: &str,
) -> FixtureDefinition {
    FixtureDefinition {
        method: method.to_string(),
        url: url.to_string(),
        request: RequestShape {
            headers: BTreeMap::new(),
            body: shape_body.to_string(),
        },
        response: RecordedResponse {
            status_code: status,
            headers: response_headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: response_body.to_string(),
        },
    }
}
