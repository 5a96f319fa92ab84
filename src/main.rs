//! # PigeonPost — Deferred Webhook Relay
//!
//! Accepts a message over HTTP, holds it for the configured delay, then
//! forwards it as a JSON envelope to the configured destination URL.
//!
//! Usage:
//!   pigeonpost                                  # Start relay (default port 10000)
//!   pigeonpost --port 8080                      # Custom port
//!   pigeonpost --webhook-url https://hook...    # Override destination

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use pigeonpost_core::PigeonConfig;

#[derive(Parser)]
#[command(
    name = "pigeonpost",
    version,
    about = "📮 PigeonPost — deferred webhook relay"
)]
struct Cli {
    /// Config file path (default: ~/.pigeonpost/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Listen host
    #[arg(long)]
    host: Option<String>,

    /// Listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Destination webhook URL
    #[arg(long)]
    webhook_url: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn expand_path(p: &str) -> String {
    shellexpand::tilde(p).to_string()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "pigeonpost=debug,pigeonpost_gateway=debug,pigeonpost_relay=debug,tower_http=debug"
    } else {
        "pigeonpost=info,pigeonpost_gateway=info,pigeonpost_relay=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    // Config file, then PIGEONPOST_* env, then CLI flags
    let mut config = match &cli.config {
        Some(path) => {
            let path = expand_path(path);
            let mut config = PigeonConfig::load_from(Path::new(&path))?;
            config.apply_env();
            config
        }
        None => PigeonConfig::load()?,
    };
    if let Some(host) = cli.host {
        config.gateway.host = host;
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }
    if let Some(url) = cli.webhook_url {
        config.webhook.url = url;
    }

    tracing::info!("📮 PigeonPost starting (env: {})", config.gateway.environment);

    pigeonpost_gateway::start(&config).await
}
