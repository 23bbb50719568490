//! Batch engine for rewriting image alt text
//!
//! This module contains the core update logic:
//! - The per-SKU processor (details, images, decide, update)
//! - The scheduler that runs processors concurrently and owns the checkpoint

mod processor;
mod scheduler;

pub use processor::{ItemProcessor, SkuProcessor};
pub use scheduler::{BatchSummary, Scheduler, SchedulerConfig};

use crate::catalog::CatalogApi;
use crate::client::client_from_config;
use crate::config::Config;
use crate::storage::{CheckpointStore, SkuList};
use crate::{critical, AltError};
use std::future::Future;

/// Runs a complete batch
///
/// This is the main entry point for an update run. It will:
/// 1. Load the checkpoint, clearing it first when `fresh` is set
/// 2. Load the SKU list
/// 3. Build the shared HTTP client and rate limiter
/// 4. Process every SKU until done or `shutdown` resolves
/// 5. Save the checkpoint and compact the list
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `credential` - Session credential sent with every request
/// * `fresh` - Discard previous progress before starting
/// * `shutdown` - Resolves when the operator asks the run to stop
///
/// # Returns
///
/// * `Ok(BatchSummary)` - Counts for the run, including an interrupted one
/// * `Err(AltError)` - Setup failed, or a worker crashed (after the final flush)
pub async fn run_batch<F>(
    config: &Config,
    credential: &str,
    fresh: bool,
    shutdown: F,
) -> Result<BatchSummary, AltError>
where
    F: Future<Output = ()>,
{
    let mut checkpoint = CheckpointStore::load(&config.files.checkpoint);
    if fresh {
        checkpoint.clear()?;
        tracing::info!("Starting fresh (checkpoint cleared)");
    }

    let sku_list = SkuList::new(&config.files.sku_list);
    let sku_ids = sku_list.load()?;

    if sku_ids.is_empty() {
        critical!(
            "No SKUs to process. Check your {} file.",
            sku_list.path().display()
        );
        return Ok(BatchSummary::default());
    }

    let client = client_from_config(config, credential)?;
    let api = CatalogApi::new(client, config.api.resolved_base_url());
    let processor = ItemProcessor::new(api, config.alt_text.fallback.clone());

    tracing::info!("--- STARTING ALT TEXT UPDATE ---");
    tracing::info!("Total SKUs to process: {}", sku_ids.len());
    tracing::info!("Already checkpointed: {}", checkpoint.len());
    tracing::info!("Max workers: {}", config.engine.max_workers);

    let mut scheduler = Scheduler::new(
        processor,
        checkpoint,
        sku_list,
        SchedulerConfig::from(&config.engine),
    );

    scheduler.run(&sku_ids, shutdown).await
}
