use crate::config::types::{AltTextConfig, ApiConfig, Config, EngineConfig, FilesConfig};
use crate::ConfigError;
use url::Url;

/// Largest backoff base accepted, in seconds
const MAX_BACKOFF_FACTOR: f64 = 60.0;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_engine_config(&config.engine)?;
    validate_files_config(&config.files)?;
    validate_alt_text_config(&config.alt_text)?;
    Ok(())
}

/// Validates remote API configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    if config.account_name.is_empty() {
        return Err(ConfigError::Validation(
            "account_name cannot be empty".to_string(),
        ));
    }

    if !config
        .account_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "account_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.account_name
        )));
    }

    let base_url = config.resolved_base_url();
    let url = Url::parse(&base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", base_url, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            base_url
        )));
    }

    if config.auth_header.is_empty() {
        return Err(ConfigError::Validation(
            "auth_header cannot be empty".to_string(),
        ));
    }

    if config.credential_env.is_empty() {
        return Err(ConfigError::Validation(
            "credential_env cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates engine tunables
fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.max_workers < 1 || config.max_workers > 64 {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and 64, got {}",
            config.max_workers
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if !config.backoff_factor.is_finite() || config.backoff_factor < 0.0 {
        return Err(ConfigError::Validation(format!(
            "backoff_factor must be a non-negative number, got {}",
            config.backoff_factor
        )));
    }

    if config.backoff_factor > MAX_BACKOFF_FACTOR {
        return Err(ConfigError::Validation(format!(
            "backoff_factor must be <= {}, got {}",
            MAX_BACKOFF_FACTOR, config.backoff_factor
        )));
    }

    if config.checkpoint_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "checkpoint_interval must be >= 1, got {}",
            config.checkpoint_interval
        )));
    }

    if config.default_retry_after_secs > config.max_throttle_wait_secs {
        return Err(ConfigError::Validation(format!(
            "default_retry_after_secs ({}) cannot exceed max_throttle_wait_secs ({})",
            config.default_retry_after_secs, config.max_throttle_wait_secs
        )));
    }

    Ok(())
}

/// Validates file paths
fn validate_files_config(config: &FilesConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("sku_list", &config.sku_list),
        ("checkpoint", &config.checkpoint),
        ("log", &config.log),
        ("error_log", &config.error_log),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    if config.log == config.error_log {
        return Err(ConfigError::Validation(
            "log and error_log must be different files".to_string(),
        ));
    }

    Ok(())
}

fn validate_alt_text_config(config: &AltTextConfig) -> Result<(), ConfigError> {
    if config.fallback.trim().is_empty() {
        return Err(ConfigError::Validation(
            "alt-text fallback cannot be empty".to_string(),
        ));
    }

    Ok(())
}
