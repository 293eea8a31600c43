use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use apisim::server::builder::ApiSimServerBuilder;

/// Fixture-replay HTTP API simulator.
#[derive(Parser, Debug)]
#[command(name = "apisim", version, about)]
struct Cli {
    /// Port to listen on.
    #[arg(short, long, env = "APISIM_PORT", default_value_t = 8800)]
    port: u16,

    /// Bind on all interfaces instead of loopback only.
    #[arg(long, env = "APISIM_EXPOSE")]
    expose: bool,

    /// JSON file containing the fixture catalog.
    #[arg(short, long, env = "APISIM_FIXTURES", default_value = "data/api-data.json")]
    fixtures: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("apisim=info")),
        )
        .init();

    let cli = Cli::parse();

    tracing::info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let server = ApiSimServerBuilder::new()
        .port(cli.port)
        .expose(cli.expose)
        .fixture_file(cli.fixtures)
        .build();

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("cannot listen for shutdown signal: {}", err);
        }
        tracing::info!("Shutting down");
    };

    if let Err(err) = server.start_with_signals(None, shutdown).await {
        tracing::error!("server failed: {}", err);
        std::process::exit(1);
    }
}
