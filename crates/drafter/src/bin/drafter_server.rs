//! Drafter HTTP server
//!
//! Serves report drafting and playbook retrieval over HTTP.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use drafter::server::start_server;
use drafter::DrafterConfig;

#[derive(Parser)]
#[command(name = "drafter_server")]
#[command(about = "Drafter REST API Server")]
#[command(version)]
struct Args {
  /// Configuration file
  #[arg(long, env = "DRAFTER_CONFIG")]
  config: Option<PathBuf>,

  /// Bind address, overrides the configuration
  #[arg(long)]
  bind: Option<SocketAddr>,

  /// Keep the playbook index in memory
  #[arg(long)]
  ephemeral: bool,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Lance and DataFusion are chatty at info
  let filter = if args.verbose {
    EnvFilter::new("info,lance=warn,lance_datafusion=warn,datafusion=warn")
  } else {
    EnvFilter::new("drafter=info,lance=error,lance_datafusion=error,datafusion=error,warn")
  };
  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  let mut config = DrafterConfig::load(args.config.as_deref())?;
  if let Some(bind) = args.bind {
    config.server.bind = bind;
  }

  chronicle::info!(&format!("Starting Drafter REST Server v{}", env!("CARGO_PKG_VERSION")));
  chronicle::info!(&format!("Binding to address: {}", config.server.bind));

  start_server(config, args.ephemeral).await
}
