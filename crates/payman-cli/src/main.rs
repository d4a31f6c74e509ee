//! payman: bulk reward payouts for delegates.
//!
//! Computes what a delegate owes its delegators for a cycle and pays it out
//! in batched transfer operations.

mod chain;
mod commands;
mod config;
mod print;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::chain::DryRunChain;
use crate::config::PaymanConfig;

#[derive(Parser)]
#[command(name = "payman")]
#[command(about = "A bulk payout tool for delegates", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: $PAYMAN_HOME/config.toml or ~/.payman/config.toml)
    #[arg(short, long, env = "PAYMAN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a payout and print the report
    Report {
        /// Cycle to report on (default: payout.cycle from config)
        #[arg(long)]
        cycle: Option<u32>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute rewards for a cycle and batch-pay delegators
    Payout {
        /// Cycle to pay out (default: payout.cycle from config)
        #[arg(long)]
        cycle: Option<u32>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Batch-pay transfers listed in a JSON file
    Batch {
        /// JSON array of {"address": ..., "amount": ...} (amounts in mutez)
        #[arg(short, long)]
        payments: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = PaymanConfig::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("payman={}", config.logging.log_level).parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = DryRunChain::new(config.snapshot_dir(), config.chain.wallet_balance);

    // Ctrl-C stops further batches; batches already submitted stay submitted.
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl-C received, no further batches will be submitted");
            let _ = cancel_tx.send(true);
        }
    });

    info!(snapshot_dir = %config.snapshot_dir().display(), "payman starting");

    match cli.command {
        Commands::Report { cycle, json } => {
            commands::report::run(&config, &client, cycle, json).await
        }
        Commands::Payout { cycle, json } => {
            commands::payout::run(&config, &client, cycle, json, &cancel_rx).await
        }
        Commands::Batch { payments } => {
            commands::batch::run(&config, &client, &payments, &cancel_rx).await
        }
    }
}
