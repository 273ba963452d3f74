use anyhow::Result;
use clap::Parser;

mod agents;
mod cli;
mod config;
mod github;
mod llm;
mod orchestrator;
mod store;
mod types;
mod utils;
mod websearch;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    let (config, command) = args.into_parts();

    orchestrator::run(&config, command).await
}
