//! One-shot reconciliation run
//!
//! Runs a full batch pass (or a single account with `--account`) and prints
//! the run report as JSON. Intended to be invoked by an external scheduler.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use server_core::config::Config;
use server_core::domains::membership::AccountId;
use server_core::domains::reconciliation::Reconciler;
use server_core::kernel::ServerDeps;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "reconcile_all")]
#[command(about = "Reconcile facility entitlements against every provider")]
struct Cli {
    /// Reconcile only this CRM account
    #[arg(long)]
    account: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    let deps = ServerDeps::from_config(&config).context("Failed to build provider clients")?;
    let reconciler = Reconciler::new(deps, config.sync_settings());

    let report = match cli.account {
        Some(account) => reconciler
            .run_single(&AccountId::new(account), Utc::now())
            .await
            .context("Single-account reconciliation failed")?,
        None => Some(
            reconciler
                .run_batch(Utc::now())
                .await
                .context("Batch reconciliation failed")?,
        ),
    };

    match report {
        Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
        None => tracing::info!("Skipped: inside maintenance window"),
    }

    Ok(())
}
