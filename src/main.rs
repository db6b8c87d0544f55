//! Tabflow - Main Entry Point
//!
//! HTTP service for walking a tabular dataset through encoding, scaling,
//! splitting, training, and evaluation.

use clap::Parser;
use tabflow::server::{run_server, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "tabflow", version, about = "Tabular ML pipeline server")]
struct Cli {
    /// Host to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(long, short)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabflow=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ServerConfig::default();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    run_server(config).await
}
