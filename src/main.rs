//! # Babel Chat
//!
//! Entry point of the multi-room chat relay. Initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Message store (PostgreSQL or in-memory)
//! - HTTP/WebSocket server

use anyhow::Result;
use tracing::info;

use babel_chat::config::Settings;
use babel_chat::presentation::http::handlers::health::init_server_start;
use babel_chat::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    babel_chat::telemetry::init_tracing();
    init_server_start();

    info!("Starting Babel Chat...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        persistent = settings.database.url.is_some(),
        "Configuration loaded"
    );

    // Build and run the application
    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
