//! SmartSavvy Migration Entry Point
//!
//! Reads the document-database exports and loads them into PostgreSQL,
//! remapping every foreign key to the newly generated relational ids.

use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result};
use dotenv::dotenv;
use savvy_migrate::catalog;
use savvy_migrate::{Dependencies, MigrationConfig, MigrationPlan};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging.
///
/// `RUST_LOG` overrides the default `info` filter; `LOG_FORMAT=json` switches
/// to structured JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}

async fn run() -> Result<()> {
    let config = MigrationConfig::from_env().context("invalid configuration")?;
    info!(
        export_dir = %config.export_dir.display(),
        dry_run = config.dry_run,
        "Starting SmartSavvy migration"
    );

    let plan = MigrationPlan::build(&catalog::smartsavvy(), &config.selection, &config.export_dir)?;
    info!(order = ?plan.entity_names(), "✓ Planned {} phases", plan.len());

    let orchestrator = Dependencies::new(&config).await?.into_orchestrator();
    let report = orchestrator.run(&plan).await?;
    report.log_summary();

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    init_tracing();

    match run().await {
        Ok(()) => {
            info!("MIGRATION DONE");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Migration failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
