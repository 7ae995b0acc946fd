use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use drafter::cli::commands;
use drafter::DrafterConfig;

#[derive(Parser)]
#[command(name = "drafter")]
#[command(about = "Drafter - playbook-grounded incident report drafting for MDR SOC analysts")]
#[command(version)]
struct Cli {
  /// Configuration file (defaults to drafter.json, .drafter.json or .drafter/config.json)
  #[arg(long, global = true, env = "DRAFTER_CONFIG")]
  config: Option<PathBuf>,

  /// Keep the playbook index in memory for this run only
  #[arg(long, global = true)]
  ephemeral: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Ingest the playbook corpus into the collection if it is empty
  Index {
    /// Clear the collection first and re-ingest
    #[arg(long)]
    reset: bool,
  },
  /// Show the playbooks closest to a query
  Search {
    /// Query terms (space-separated)
    #[arg(required = true)]
    terms: Vec<String>,
    /// Number of playbooks to return
    #[arg(short, long)]
    k: Option<usize>,
  },
  /// Print the prompt a request would send, without generating
  Prompt {
    /// JSON request body
    request: PathBuf,
  },
  /// Generate a report draft for a request
  Draft {
    /// JSON request body
    request: PathBuf,
    /// Directory for the saved draft (defaults to the outputs directory)
    #[arg(short, long)]
    out: Option<PathBuf>,
  },
}

async fn handle(command: Command, config: &DrafterConfig, ephemeral: bool) -> Result<()> {
  match command {
    Command::Index { reset } => commands::index_playbooks(config, ephemeral, reset).await,
    Command::Search { terms, k } => commands::search_playbooks(config, ephemeral, &terms, k).await,
    Command::Prompt { request } => commands::print_prompt(config, ephemeral, &request).await,
    Command::Draft { request, out } => {
      commands::draft_report(config, ephemeral, &request, out.as_deref()).await
    }
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  let config = DrafterConfig::load(cli.config.as_deref())?;

  handle(cli.command, &config, cli.ephemeral).await
}
