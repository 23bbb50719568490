//! Catalog-Alt: resumable bulk alt-text updater for catalog images
//!
//! This crate walks a list of SKU IDs, fetches each SKU's product details and
//! images from the remote catalog API, and rewrites image labels that do not
//! match the normalized product name. Progress is checkpointed so an
//! interrupted run can be resumed without repeating finished SKUs.

pub mod alt_text;
pub mod catalog;
pub mod client;
pub mod config;
pub mod engine;
pub mod logging;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Catalog-Alt operations
#[derive(Debug, Error)]
pub enum AltError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker task failed: {0}")]
    Task(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Credential missing: set the {0} environment variable")]
    MissingCredential(String),
}

/// Result type alias for Catalog-Alt operations
pub type Result<T> = std::result::Result<T, AltError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Identifier of a stock-keeping unit in the remote catalog
pub type SkuId = i64;

// Re-export commonly used types
pub use config::Config;
pub use engine::{run_batch, BatchSummary};
pub use state::ItemOutcome;
