use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use foodtrace::{ApiServer, ApiServerConfig, ChatOrchestrator, ChatRequest, ServiceConfig};

#[derive(Parser)]
#[command(name = "foodtrace")]
#[command(about = "Ingredient traceability chat service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start API server
    Serve {
        /// Host to bind to (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask one question and print the answer
    Ask {
        /// The question
        message: String,
    },

    /// Probe every collaborator and print the results
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "foodtrace=info,foodtrace_clients=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = ServiceConfig::from_env()?;

    info!(
        "Inference engine: {} (model {})",
        config.ollama_url, config.ollama_model
    );
    info!("Ingredient backend: {}", config.backend_url);
    info!("Cache: {}", config.cache.backend);

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }

            let orchestrator = Arc::new(ChatOrchestrator::from_config(&config)?);
            let server = ApiServer::new(ApiServerConfig::from(&config), orchestrator);
            server.start().await?;
        }

        Commands::Ask { message } => {
            let orchestrator = ChatOrchestrator::from_config(&config)?;
            let response = orchestrator.chat(ChatRequest::new(message)).await?;
            println!("{}", response.response);
            println!();
            println!("(model: {})", response.model);
        }

        Commands::Health => {
            let orchestrator = ChatOrchestrator::from_config(&config)?;
            let health = orchestrator.health().await;

            for result in [&health.inference, &health.cache, &health.backend] {
                let status_icon = if result.is_connected() { "●" } else { "✗" };
                print!(
                    "{} {:<10} {:?} ({}ms)",
                    status_icon,
                    result.target.to_string(),
                    result.status,
                    result.response_time_ms
                );
                match &result.error {
                    Some(error) => println!("  {}", error),
                    None => println!(),
                }
            }
            if let Some(stats) = &health.cache_stats {
                println!("Cache: {}", stats);
            }

            if !health.is_operational() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
