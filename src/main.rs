//! API proxy server.
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!     Client Request     │                  API PROXY                   │
//!     ───────────────────┼─▶ /api/login ──▶ login strategy ──┐          │
//!                        │                                   │          │
//!                        │   /api/…     ──▶ api strategy ────┼──────────┼──▶ Upstream API
//!                        │                                   │          │
//!                        │   /…         ──▶ static files     │          │
//!     Client Response    │                                   │          │
//!     ◀──────────────────┼───────────── dispatcher ◀─────────┘          │
//!                        └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use api_proxy::config::{load_config, resolve_config_path};
use api_proxy::lifecycle::signals::spawn_signal_listener;
use api_proxy::observability::logging;
use api_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "api-proxy")]
#[command(about = "Static file server and auth-translating API proxy", long_about = None)]
struct Cli {
    /// Path to config file (defaults to ./api-proxy.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config.as_deref())?;
    let config = load_config(&config_path)?;

    logging::init(&config.observability.log_level);

    tracing::info!(
        path = %config_path.display(),
        port = config.port,
        root = %config.root,
        api_scheme = %config.api.scheme,
        api_host = %config.api.host,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(config.bind_address()).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    spawn_signal_listener(&shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
