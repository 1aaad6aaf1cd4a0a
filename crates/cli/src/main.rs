//! Askbase CLI — the main entry point.
//!
//! Commands:
//! - `serve`  — Start the HTTP API server
//! - `ask`    — Ask a single question from the command line
//! - `doctor` — Diagnose configuration health

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "askbase",
    about = "Askbase — retrieval-augmented chat backend",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question
    Ask {
        /// The question to ask
        query: String,

        /// Knowledge base to retrieve context from
        #[arg(short, long)]
        knowledge_base: Option<String>,

        /// Stream the answer token by token
        #[arg(short, long)]
        stream: bool,
    },

    /// Diagnose configuration health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Ask {
            query,
            knowledge_base,
            stream,
        } => commands::ask::run(&query, knowledge_base.as_deref(), stream).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
