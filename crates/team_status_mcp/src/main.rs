//! Team status MCP server binary.
//!
//! Loads `.env`, settings and credentials, then serves the tools on stdio.

use team_status_core::Credentials;
use team_status_mcp::{build_server, serve, Settings};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Variable holding the log filter.
const LOG_FILTER_VAR: &str = "TEAM_STATUS_LOG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let dotenv_loaded = dotenv::dotenv().is_ok();

    // Initialize logging. Stdout carries the protocol, so logs go to stderr.
    let filter = EnvFilter::try_from_env(LOG_FILTER_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
        .with(filter)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        dotenv_loaded = dotenv_loaded,
        "Starting team status server"
    );

    let settings = Settings::from_env().map_err(|e| {
        error!(error = %e, "Failed to load settings");
        e
    })?;

    let server = build_server(settings, Credentials::from_env());
    serve(server).await.map_err(|e| {
        error!(error = %e, "Server terminated with an error");
        e
    })
}
