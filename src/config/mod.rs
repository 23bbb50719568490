//! Configuration module for the alt-text updater
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and reading the session credential from the environment.
//!
//! # Example
//!
//! ```no_run
//! use catalog_alt::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Checkpoint every {} items", config.engine.checkpoint_interval);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{AltTextConfig, ApiConfig, Config, EngineConfig, FilesConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, load_credential};
