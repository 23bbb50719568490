use crate::storage::{write_atomic, StorageError, StorageResult};
use crate::SkuId;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Classification of a single line of the SKU list file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListLine {
    /// Blank line or `#` comment
    Passthrough,
    /// A valid SKU ID
    Sku(SkuId),
    /// Anything else
    Invalid,
}

/// Classifies one line of the list file
pub fn parse_line(line: &str) -> ListLine {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return ListLine::Passthrough;
    }
    match trimmed.parse::<SkuId>() {
        Ok(id) => ListLine::Sku(id),
        Err(_) => ListLine::Invalid,
    }
}

/// The operator-supplied file of SKU IDs, one per line
#[derive(Debug, Clone)]
pub struct SkuList {
    path: PathBuf,
}

impl SkuList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the SKU IDs in file order
    ///
    /// Invalid lines are logged and dropped; duplicates are kept.
    pub fn load(&self) -> StorageResult<Vec<SkuId>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::ListNotFound(self.path.clone()))
            }
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        let mut ids = Vec::new();
        for (index, line) in content.lines().enumerate() {
            match parse_line(line) {
                ListLine::Sku(id) => ids.push(id),
                ListLine::Passthrough => {}
                ListLine::Invalid => {
                    tracing::warn!("Invalid SKU ID on line {}: {}", index + 1, line.trim());
                }
            }
        }

        tracing::info!("Loaded {} SKU IDs from {}", ids.len(), self.path.display());
        Ok(ids)
    }

    /// Rewrites the file without the SKUs in `processed`
    ///
    /// Comments, blank lines, invalid lines and pending IDs are kept verbatim
    /// and in order. The file is untouched when nothing would be removed.
    /// Returns the number of lines removed.
    pub fn compact(&self, processed: &BTreeSet<SkuId>) -> StorageResult<usize> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        let mut remaining = String::with_capacity(content.len());
        let mut removed = 0;

        for line in content.split_inclusive('\n') {
            match parse_line(line) {
                ListLine::Sku(id) if processed.contains(&id) => removed += 1,
                _ => remaining.push_str(line),
            }
        }

        if removed > 0 {
            write_atomic(&self.path, &remaining)?;
            tracing::info!(
                "Removed {} processed SKUs from {}",
                removed,
                self.path.display()
            );
        } else {
            tracing::debug!("No SKUs removed from {}", self.path.display());
        }

        Ok(removed)
    }
}
