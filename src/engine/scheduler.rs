//! Bounded worker pool driving the per-SKU processor
//!
//! This module handles:
//! - Keeping at most `max_workers` SKUs in flight
//! - Skipping SKUs already in the checkpoint and duplicate IDs
//! - Recording terminal outcomes in the checkpoint (sole writer)
//! - Periodic checkpoint flush and input list compaction
//! - Graceful stop on interruption or credential expiry, with a final flush

use crate::config::EngineConfig;
use crate::engine::SkuProcessor;
use crate::state::ItemOutcome;
use crate::storage::{CheckpointStore, SkuList};
use crate::{critical, AltError, SkuId};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Scheduler tunables
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Maximum SKUs processed concurrently
    pub max_workers: usize,
    /// Completions between checkpoint flushes
    pub checkpoint_interval: usize,
    /// Stop dispatching once a worker reports an expired credential
    pub halt_on_auth_expired: bool,
}

impl From<&EngineConfig> for SchedulerConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_workers: config.max_workers.max(1) as usize,
            checkpoint_interval: config.checkpoint_interval.max(1) as usize,
            halt_on_auth_expired: config.halt_on_auth_expired,
        }
    }
}

/// Aggregate counts for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// IDs in the input list, duplicates included
    pub total: usize,
    /// IDs that finished, in any outcome
    pub completed: usize,
    /// IDs skipped because the checkpoint already had them
    pub already_processed: usize,
    /// Repeated IDs skipped within this run
    pub duplicates: usize,
    /// IDs newly added to the checkpoint
    pub checkpointed: usize,
    /// IDs whose images were rewritten
    pub updated: usize,
    /// Images rewritten across all IDs
    pub images_updated: usize,
    /// IDs left for a later run
    pub unresolved: usize,
    /// The run stopped early on a shutdown signal
    pub interrupted: bool,
    /// The run stopped early on an expired credential
    pub halted: bool,
}

/// Drives the processor over a list of SKUs
pub struct Scheduler<P> {
    processor: Arc<P>,
    checkpoint: CheckpointStore,
    sku_list: SkuList,
    config: SchedulerConfig,
}

impl<P: SkuProcessor> Scheduler<P> {
    /// Creates a scheduler that owns the checkpoint for the duration of the run
    pub fn new(
        processor: P,
        checkpoint: CheckpointStore,
        sku_list: SkuList,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            processor: Arc::new(processor),
            checkpoint,
            sku_list,
            config,
        }
    }

    pub fn checkpoint(&self) -> &CheckpointStore {
        &self.checkpoint
    }

    /// Processes every SKU in `sku_ids` until done or `shutdown` resolves
    ///
    /// After `shutdown` resolves no new SKU is started; in-flight SKUs finish.
    /// The checkpoint is saved and the list compacted before returning, on
    /// every path. A panicking worker is reported as an error, after the flush.
    pub async fn run<F>(&mut self, sku_ids: &[SkuId], shutdown: F) -> Result<BatchSummary, AltError>
    where
        F: Future<Output = ()>,
    {
        let mut summary = BatchSummary {
            total: sku_ids.len(),
            ..Default::default()
        };

        let result = self.drive(sku_ids, shutdown, &mut summary).await;

        if let Err(e) = &result {
            critical!("Fatal Error: {}", e);
        }

        self.persist();
        tracing::info!(
            "--- PROCESS COMPLETED ({}/{} SKUs processed) ---",
            summary.completed,
            summary.total
        );

        result.map(|()| summary)
    }

    async fn drive<F>(
        &mut self,
        sku_ids: &[SkuId],
        shutdown: F,
        summary: &mut BatchSummary,
    ) -> Result<(), AltError>
    where
        F: Future<Output = ()>,
    {
        let mut tasks: JoinSet<(SkuId, ItemOutcome)> = JoinSet::new();
        let mut dispatched: HashSet<SkuId> = HashSet::new();
        let mut pending = sku_ids.iter().copied();
        let mut stopping = false;
        let mut fatal: Option<AltError> = None;

        tokio::pin!(shutdown);

        loop {
            while !stopping && tasks.len() < self.config.max_workers {
                let Some(sku_id) = pending.next() else {
                    break;
                };

                if self.checkpoint.is_processed(sku_id) {
                    tracing::info!("SKU {} already processed (checkpoint)", sku_id);
                    self.record(sku_id, ItemOutcome::AlreadyProcessed, summary);
                    continue;
                }

                if !dispatched.insert(sku_id) {
                    tracing::info!("SKU {} repeated in list, skipping", sku_id);
                    self.record(sku_id, ItemOutcome::Duplicate, summary);
                    continue;
                }

                let processor = Arc::clone(&self.processor);
                tasks.spawn(async move { (sku_id, processor.process_sku(sku_id).await) });
            }

            if tasks.is_empty() {
                break;
            }

            tokio::select! {
                biased;

                _ = &mut shutdown, if !stopping => {
                    tracing::warn!("Process interrupted by user. Saving checkpoint...");
                    summary.interrupted = true;
                    stopping = true;
                }
                joined = tasks.join_next() => match joined {
                    Some(Ok((sku_id, outcome))) => {
                        self.record(sku_id, outcome, summary);
                        if outcome.auth_expired() && self.config.halt_on_auth_expired && !stopping {
                            critical!("Credential expired; no new SKUs will be started");
                            summary.halted = true;
                            stopping = true;
                        }
                    }
                    Some(Err(e)) => {
                        critical!("Worker task failed: {}", e);
                        summary.completed += 1;
                        summary.unresolved += 1;
                        fatal.get_or_insert(AltError::Task(e.to_string()));
                        stopping = true;
                    }
                    None => {}
                },
            }
        }

        match fatal {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Folds one outcome into the checkpoint and summary
    fn record(&mut self, sku_id: SkuId, outcome: ItemOutcome, summary: &mut BatchSummary) {
        summary.completed += 1;

        match outcome {
            ItemOutcome::AlreadyProcessed => summary.already_processed += 1,
            ItemOutcome::Duplicate => summary.duplicates += 1,
            ItemOutcome::Updated { updated, .. } => {
                summary.updated += 1;
                summary.images_updated += updated as usize;
            }
            _ => {}
        }

        if outcome.should_checkpoint() {
            if self.checkpoint.mark_processed(sku_id) {
                summary.checkpointed += 1;
            }
        } else if outcome.is_unresolved() {
            tracing::debug!("SKU {} unresolved: {}", sku_id, outcome);
            summary.unresolved += 1;
        }

        if summary.completed % self.config.checkpoint_interval == 0 {
            self.persist();
            tracing::info!(
                "Checkpoint saved ({}/{} SKUs processed)",
                summary.completed,
                summary.total
            );
        }
    }

    /// Saves the checkpoint and compacts the list, logging failures
    fn persist(&self) {
        if let Err(e) = self.checkpoint.save() {
            tracing::error!("Error saving checkpoint: {}", e);
        }
        if let Err(e) = self.sku_list.compact(self.checkpoint.processed()) {
            tracing::error!("Error updating SKU file: {}", e);
        }
    }
}
