use crypto_agent_orchestrator::{agent::Orchestrator, api::start_server, config::AgentConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let api_port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("API_PORT"))
        .unwrap_or_else(|_| "8080".to_string())
        .parse()?;

    info!("Crypto Agent Orchestrator - API Server");
    info!("Port: {}", api_port);

    let config = AgentConfig::from_env();
    let orchestrator = Arc::new(Orchestrator::from_config(&config));

    info!("Orchestrator initialized");

    start_server(orchestrator, api_port).await?;

    Ok(())
}
