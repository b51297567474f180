//! Sweeper: one-shot cleanup of aged resources under tiered retention rules.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cleanup::{
    CleanupExecutor, CleanupMetrics, ExecutorConfig, LoggingStorage, ObjectStoreStorage,
};
use common::config::Configuration;
use common::storage::create_object_store;
use retention::{RetentionPolicy, parse_rules};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "sweeper.toml")]
    config: String,

    /// Identify expired resources without deleting them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = if Path::new(&args.config).exists() {
        Configuration::load_from_path(Path::new(&args.config))
            .context("failed to load configuration")?
    } else {
        info!("configuration file not found, using defaults");
        Configuration::default()
    };

    let rules =
        parse_rules(&config.cleanup.rules).context("invalid retention rules in configuration")?;
    let policy =
        RetentionPolicy::new(rules).context("inconsistent retention rules in configuration")?;

    info!(policy = %policy, storage = %config.storage.dsn, "starting cleanup run");

    let store = create_object_store(&config.storage).context("failed to open storage")?;
    let storage = LoggingStorage::new(ObjectStoreStorage::new(store));

    let executor_config = ExecutorConfig {
        dry_run: args.dry_run || config.cleanup.dry_run,
    };
    let metrics = CleanupMetrics::new();
    let executor = CleanupExecutor::new(executor_config, metrics.clone());

    let result = executor
        .run(&storage, &policy)
        .await
        .context("storage cleanup failed")?;

    info!(
        listed = result.resources_listed,
        expired = result.resources_expired,
        deleted = result.resources_deleted,
        duration_ms = (result.completed_at - result.started_at).num_milliseconds(),
        "cleanup run completed"
    );

    metrics.summary().log();

    Ok(())
}
