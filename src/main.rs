mod cache;
mod config;
mod gdc;
mod server;
mod tools;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use crate::cache::CaseSetStore;
use crate::gdc::GdcClient;
use crate::tools::Toolbox;

#[derive(Parser, Debug)]
#[command(name = "gdc-cases")]
#[command(about = "Cached GDC case sets and set-algebra tools for language-model agents")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/gdc-cases/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// How long case-set handles stay valid, in seconds
  #[arg(long)]
  ttl_secs: Option<u64>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
  /// Answer tool calls given as JSON lines on stdin (default)
  Serve,
  /// Print the tool catalog as JSON
  Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = init_tracing();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;
  if let Some(ttl_secs) = args.ttl_secs {
    config.cache.ttl_secs = ttl_secs;
  }

  match args.command.unwrap_or(Command::Serve) {
    Command::Tools => {
      println!("{}", serde_json::to_string_pretty(&tools::catalog_json())?);
    }
    Command::Serve => {
      let store = Arc::new(
        CaseSetStore::new()
          .with_ttl(config.cache.ttl())
          .with_max_entries(config.cache.max_entries),
      );
      let sweeper = config
        .cache
        .sweep_interval()
        .map(|interval| cache::spawn_sweeper(Arc::clone(&store), interval));

      let client = GdcClient::new(&config.gdc)?;
      let toolbox = Toolbox::new(store, Arc::new(client));

      tracing::info!(
        gdc = %config.gdc.url,
        ttl_secs = config.cache.ttl_secs,
        "serving case-set tools on stdio"
      );
      server::serve(toolbox, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;

      if let Some(sweeper) = sweeper {
        sweeper.abort();
      }
    }
  }

  Ok(())
}

/// Log to stderr; stdout carries tool responses.
fn init_tracing() -> tracing_appender::non_blocking::WorkerGuard {
  let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .init();
  guard
}
