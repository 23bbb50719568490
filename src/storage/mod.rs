//! Storage module for persisting run progress
//!
//! This module handles the two files shared across runs:
//! - The checkpoint of SKUs that reached a terminal outcome
//! - The input list of SKU IDs, compacted as SKUs complete

mod checkpoint;
mod sku_list;
mod traits;

pub use checkpoint::CheckpointStore;
pub use sku_list::{parse_line, ListLine, SkuList};
pub use traits::{StorageError, StorageResult};

use std::path::Path;

/// Replaces the file at `path` with `content` via a sibling temp file and rename
///
/// A crash mid-write leaves either the old file or the new one, never a torn file.
pub(crate) fn write_atomic(path: &Path, content: &str) -> StorageResult<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "state".to_string());
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    std::fs::write(&tmp_path, content).map_err(|e| StorageError::io(&tmp_path, e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| StorageError::io(path, e))?;
    Ok(())
}
