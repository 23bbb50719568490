use crate::config::types::{ApiConfig, Config};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Marker left in sample environments where the credential was never filled in
const CREDENTIAL_PLACEHOLDER: &str = "paste your";

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use catalog_alt::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Workers: {}", config.engine.max_workers);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so runs against different tunables can be told apart.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Reads the session credential from the environment variable named in the config
pub fn load_credential(api: &ApiConfig) -> Result<String, ConfigError> {
    let value = std::env::var(&api.credential_env)
        .map_err(|_| ConfigError::MissingCredential(api.credential_env.clone()))?;
    check_credential(&api.credential_env, &value)?;
    Ok(value)
}

fn check_credential(var: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.to_lowercase().contains(CREDENTIAL_PLACEHOLDER) {
        return Err(ConfigError::MissingCredential(var.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[api]
account-name = "store"

[engine]
max-workers = 5
rate-limit-delay-ms = 250
halt-on-auth-expired = true

[files]
sku-list = "./skus.txt"

[alt-text]
fallback = "produto"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.api.account_name, "store");
        assert_eq!(config.api.auth_header, "VtexIdclientAutCookie");
        assert_eq!(config.engine.max_workers, 5);
        assert_eq!(config.engine.rate_limit_delay_ms, 250);
        assert!(config.engine.halt_on_auth_expired);
        assert_eq!(config.engine.checkpoint_interval, 10);
        assert_eq!(config.files.sku_list, "./skus.txt");
        assert_eq!(config.files.checkpoint, "checkpoint.json");
        assert_eq!(config.alt_text.fallback, "produto");
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let file = create_temp_config("[api]\naccount-name = \"store\"\n");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.engine.max_workers, 3);
        assert_eq!(config.engine.request_timeout_secs, 30);
        assert_eq!(config.engine.max_retries, 3);
        assert_eq!(config.engine.rate_limit_delay_ms, 300);
        assert_eq!(config.files.error_log, "error_log.txt");
        assert_eq!(
            config.api.resolved_base_url(),
            "https://store.vtexcommercestable.com.br/api/catalog/pvt"
        );
    }

    #[test]
    fn test_base_url_override_trims_slash() {
        let file = create_temp_config(
            "[api]\naccount-name = \"store\"\nbase-url = \"http://localhost:9000/api/\"\n",
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.api.resolved_base_url(), "http://localhost:9000/api");
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config(
            "[api]\naccount-name = \"store\"\n\n[engine]\nmax-workers = 0\n",
        );
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_check_credential() {
        assert!(check_credential("VTEX_COOKIE", "eyJhbGciOi.token").is_ok());
        assert!(check_credential("VTEX_COOKIE", "").is_err());
        assert!(check_credential("VTEX_COOKIE", "   ").is_err());
        assert!(matches!(
            check_credential("VTEX_COOKIE", "paste your VTEX cookie here").unwrap_err(),
            ConfigError::MissingCredential(_)
        ));
    }
}
