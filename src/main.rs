//! publicai-relay
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ request id ─▶ trace ─▶ dispatcher
//!                                              │
//!             ┌──────────────┬─────────────────┼──────────────┬────────────────┐
//!             ▼              ▼                 ▼              ▼                ▼
//!        OPTIONS 204    GET ?fetch=      other method    rate limiter     chat-proxy
//!        (strict CORS)  fetch-proxy      405             429              POST upstream
//!                       (permissive)                                      (bearer key)
//!                           │                                                 │
//!                           ▼                                                 ▼
//!                     source site ──▶ text extractor              upstream chat API
//! ```

use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use publicai_relay::config::{loader, RelayConfig};
use publicai_relay::lifecycle::{signals, Shutdown};
use publicai_relay::observability::{logging, metrics};
use publicai_relay::RelayServer;

#[derive(Parser, Debug)]
#[command(name = "publicai-relay")]
#[command(about = "Edge relay for chat completions with a webpage fetch-proxy", long_about = None)]
struct Args {
    /// Optional TOML config file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut config: RelayConfig = match &args.config {
        Some(path) => loader::load_config(path)?,
        None => loader::from_env()?,
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("publicai-relay v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        chat_url = %config.upstream.chat_url,
        fetch_timeout_ms = config.fetch.timeout_ms,
        chat_timeout_secs = ?config.timeouts.chat_secs,
        max_body_size = config.security.max_body_size,
        "Configuration loaded"
    );

    if config.upstream.api_key.is_none() {
        tracing::warn!(
            vars = ?loader::CREDENTIAL_VARS,
            "No upstream credential set; chat requests will be answered with 503"
        );
    }

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    let server = RelayServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
