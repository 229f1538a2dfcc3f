//! # Chat Realtime
//!
//! Entry point: tracing, configuration, then the HTTP/WebSocket server.

use anyhow::Result;
use tracing::info;

use chat_realtime::config::Settings;
use chat_realtime::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    chat_realtime::telemetry::init_tracing();

    info!("Starting chat realtime server...");

    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
