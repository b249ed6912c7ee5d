use crypto_agent_orchestrator::{agent::Orchestrator, config::AgentConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Built-in demo prompts, one per graph route.
const DEFAULT_PROMPTS: &[&str] = &[
    "Find the latest news about Bitcoin and summarize in one sentence.",
    "How much is dogecoin worth right now?",
    "Give me one short focus tip.",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Crypto Agent Orchestrator starting");

    let config = AgentConfig::from_env();
    let orchestrator = Orchestrator::from_config(&config);

    let prompts: Vec<String> = config
        .prompts
        .clone()
        .unwrap_or_else(|| DEFAULT_PROMPTS.iter().map(|p| p.to_string()).collect());

    for prompt in &prompts {
        println!("\n--- {} ---", prompt);

        match orchestrator.run(prompt).await {
            Ok(final_state) => {
                for message in &final_state.messages {
                    println!("{}: {}", message.role, message.content);
                }
                if let Some(answer) = final_state.final_answer() {
                    println!("\nFinal answer: {}", answer);
                }
            }
            Err(e) => {
                // A failed run is reported; the remaining prompts still run.
                error!(error = %e, "run failed");
                eprintln!("Run error: {}", e);
            }
        }
    }

    Ok(())
}
