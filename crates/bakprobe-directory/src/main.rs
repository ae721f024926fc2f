//! bakprobe-directory - Read-only HTTP directory of servers and backup shares
//!
//! Loads the configured servers and file shares, queries every server once
//! for its version metadata, then serves the result as JSON.

use anyhow::{Context, Result};
use bakprobe_directory::{router, Configuration, Directory, MssqlCatalog, Service};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Serve configured SQL Server instances and backup file shares over HTTP
#[derive(Parser, Debug)]
#[command(name = "bakprobe-directory")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding servers.json and fileshares.json
    #[arg(short, long, env = "BAKPROBE_CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Address to listen on
    #[arg(short, long, env = "BAKPROBE_LISTEN", default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    /// Accept self-signed server certificates
    #[arg(long)]
    trust_server_certificate: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    let config = Configuration::load(&cli.config_dir).with_context(|| {
        format!("Failed to load configuration from {}", cli.config_dir.display())
    })?;

    let catalog = Arc::new(MssqlCatalog::new().trust_cert(cli.trust_server_certificate));

    // Every server is enriched before the listener exists
    let directory = Directory::enrich(config, &*catalog)
        .await
        .context("Failed to query configured servers")?;

    info!(
        "Serving {} servers and {} file shares",
        directory.servers().len(),
        directory.files().len()
    );

    let service = Arc::new(Service::new(directory, catalog));
    let listener = tokio::net::TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("Failed to bind {}", cli.listen))?;

    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(service))
        .await
        .context("HTTP server failed")?;

    Ok(())
}
