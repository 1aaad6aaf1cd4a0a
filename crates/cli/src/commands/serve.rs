//! `askbase serve` — Start the HTTP API server.

use askbase_config::AppConfig;
use tracing::info;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🦀 Askbase Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", config.model);

    info!(
        host = %config.gateway.host,
        port = config.gateway.port,
        model = %config.model,
        "Starting gateway"
    );

    askbase_gateway::start(config).await?;

    Ok(())
}
