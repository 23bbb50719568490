//! Catalog-Alt main entry point
//!
//! This is the command-line interface for the bulk alt-text updater.

use anyhow::Context;
use catalog_alt::config::{load_config_with_hash, load_credential, Config};
use catalog_alt::engine::{run_batch, BatchSummary};
use catalog_alt::logging::init_logging;
use catalog_alt::storage::{CheckpointStore, SkuList};
use clap::Parser;
use std::path::PathBuf;

/// Catalog-Alt: resumable bulk alt-text updater
///
/// Reads SKU IDs from a list file, and for every SKU rewrites image labels
/// that do not match the normalized product name. Progress is checkpointed,
/// so an interrupted run picks up where it left off.
#[derive(Parser, Debug)]
#[command(name = "catalog-alt")]
#[command(version)]
#[command(about = "Resumable bulk alt-text updater for catalog images", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase console verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print errors to the console
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Resume from the checkpoint (default behavior)
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Clear the checkpoint and start over
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Validate config and show what would be processed, without network calls
    #[arg(long, conflicts_with = "status")]
    dry_run: bool,

    /// Show checkpoint progress against the SKU list and exit
    #[arg(long, conflicts_with = "dry_run")]
    status: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;

    let _log_guards = init_logging(&config.files, cli.verbose, cli.quiet)?;
    tracing::info!(
        "Configuration loaded from {} (hash: {})",
        cli.config.display(),
        config_hash
    );

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.status {
        handle_status(&config)
    } else {
        handle_run(&config, cli.fresh).await
    }
}

/// Handles the --dry-run mode: validates inputs and shows what would run
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Catalog-Alt Dry Run ===\n");

    println!("API:");
    println!("  Base URL: {}", config.api.resolved_base_url());
    println!("  Auth header: {}", config.api.auth_header);
    println!("  Credential env: {}", config.api.credential_env);

    println!("\nEngine:");
    println!("  Max workers: {}", config.engine.max_workers);
    println!("  Request timeout: {}s", config.engine.request_timeout_secs);
    println!("  Rate limit delay: {}ms", config.engine.rate_limit_delay_ms);
    println!(
        "  Retries: {} (backoff factor {})",
        config.engine.max_retries, config.engine.backoff_factor
    );
    println!("  Checkpoint interval: {}", config.engine.checkpoint_interval);
    println!("  Halt on auth expiry: {}", config.engine.halt_on_auth_expired);

    println!("\nFiles:");
    println!("  SKU list: {}", config.files.sku_list);
    println!("  Checkpoint: {}", config.files.checkpoint);
    println!("  Log: {}", config.files.log);
    println!("  Error log: {}", config.files.error_log);

    let (total, pending) = pending_counts(config)?;
    println!("\n✓ Configuration is valid");
    println!("✓ Would process {} of {} listed SKUs", pending, total);

    Ok(())
}

/// Handles the --status mode: reports checkpoint progress
fn handle_status(config: &Config) -> anyhow::Result<()> {
    let checkpoint = CheckpointStore::load(&config.files.checkpoint);
    let (total, pending) = pending_counts(config)?;

    println!("Checkpoint: {}", config.files.checkpoint);
    println!("  SKUs checkpointed: {}", checkpoint.len());
    println!("SKU list: {}", config.files.sku_list);
    println!("  SKUs listed: {}", total);
    println!("  SKUs pending: {}", pending);

    Ok(())
}

fn pending_counts(config: &Config) -> anyhow::Result<(usize, usize)> {
    let checkpoint = CheckpointStore::load(&config.files.checkpoint);
    let ids = SkuList::new(&config.files.sku_list).load()?;
    let pending = ids
        .iter()
        .filter(|id| !checkpoint.is_processed(**id))
        .count();
    Ok((ids.len(), pending))
}

/// Handles the main update run
async fn handle_run(config: &Config, fresh: bool) -> anyhow::Result<()> {
    let credential = load_credential(&config.api)?;

    if fresh {
        tracing::info!("Starting fresh run (ignoring previous checkpoint)");
    } else {
        tracing::info!("Starting run (resuming from checkpoint if present)");
    }

    tracing::info!(
        "Rate limit delay: {}ms, request timeout: {}s",
        config.engine.rate_limit_delay_ms,
        config.engine.request_timeout_secs
    );

    match run_batch(config, &credential, fresh, shutdown_signal()).await {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}

fn print_summary(summary: &BatchSummary) {
    println!("\n=== Run Summary ===");
    println!("  Processed: {}/{}", summary.completed, summary.total);
    println!("  Newly checkpointed: {}", summary.checkpointed);
    println!("  Already checkpointed: {}", summary.already_processed);
    println!("  Duplicates skipped: {}", summary.duplicates);
    println!(
        "  SKUs updated: {} ({} images)",
        summary.updated, summary.images_updated
    );
    println!("  Unresolved (retry next run): {}", summary.unresolved);
    if summary.interrupted {
        println!("  Run was interrupted; re-run to continue");
    }
    if summary.halted {
        println!("  Run halted on expired credential; refresh it and re-run");
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C signal, finishing in-flight SKUs"),
            Err(e) => {
                tracing::warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                tracing::info!("Received terminate signal, finishing in-flight SKUs");
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
