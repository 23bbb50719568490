use crate::storage::{write_atomic, StorageResult};
use crate::SkuId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// On-disk layout of the checkpoint file
#[derive(Debug, Default, Serialize, Deserialize)]
struct CheckpointFile {
    #[serde(default)]
    processed_skus: Vec<SkuId>,
}

/// Durable set of SKU IDs that reached a terminal outcome
///
/// The store has a single owner (the scheduler), so marking and saving are
/// never interleaved with another writer.
#[derive(Debug)]
pub struct CheckpointStore {
    path: PathBuf,
    processed: BTreeSet<SkuId>,
}

impl CheckpointStore {
    /// Loads the checkpoint at `path`
    ///
    /// A missing or unreadable file yields an empty checkpoint.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let processed = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<CheckpointFile>(&content) {
                Ok(file) => file.processed_skus.into_iter().collect(),
                Err(e) => {
                    tracing::warn!(
                        "Checkpoint {} is corrupt ({}), starting empty",
                        path.display(),
                        e
                    );
                    BTreeSet::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => {
                tracing::warn!(
                    "Checkpoint {} unreadable ({}), starting empty",
                    path.display(),
                    e
                );
                BTreeSet::new()
            }
        };

        tracing::debug!(
            "Loaded checkpoint {} with {} SKUs",
            path.display(),
            processed.len()
        );

        Self { path, processed }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_processed(&self, sku_id: SkuId) -> bool {
        self.processed.contains(&sku_id)
    }

    /// Records a SKU; returns false if it was already present
    pub fn mark_processed(&mut self, sku_id: SkuId) -> bool {
        self.processed.insert(sku_id)
    }

    pub fn processed(&self) -> &BTreeSet<SkuId> {
        &self.processed
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }

    /// Writes the full set to disk, replacing the previous file
    pub fn save(&self) -> StorageResult<()> {
        let file = CheckpointFile {
            processed_skus: self.processed.iter().copied().collect(),
        };
        let content = serde_json::to_string(&file)?;
        write_atomic(&self.path, &content)
    }

    /// Empties the checkpoint and persists the empty state
    pub fn clear(&mut self) -> StorageResult<()> {
        self.processed.clear();
        self.save()
    }
}
