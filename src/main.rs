use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "askdocs")]
#[command(about = "Company knowledge assistant over your internal documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP chat server
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Build the vector index from the raw documents directory
    Index {
        #[arg(long)]
        raw_docs: Option<PathBuf>,
        #[arg(long)]
        vector_store: Option<PathBuf>,
        /// Drop the existing index first, e.g. after changing the embedding model
        #[arg(long)]
        rebuild: bool,
    },
    /// Ask a single question without history
    Ask { message: String },
    /// Print retrieval statistics as JSON
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command {
        Commands::Serve { host, port } => commands::serve(config, host, port).await,
        Commands::Index {
            raw_docs,
            vector_store,
            rebuild,
        } => commands::index(config, raw_docs, vector_store, rebuild).await,
        Commands::Ask { message } => commands::ask(config, message).await,
        Commands::Stats => commands::stats(config).await,
    }
}
