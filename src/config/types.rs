use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the alt-text updater
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(rename = "alt-text", default)]
    pub alt_text: AltTextConfig,
}

/// Remote catalog API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Store account name, used to derive the default base URL
    #[serde(rename = "account-name")]
    pub account_name: String,

    /// Explicit base URL, overriding the one derived from the account name
    #[serde(rename = "base-url", default)]
    pub base_url: Option<String>,

    /// Header carrying the session credential
    #[serde(rename = "auth-header", default = "default_auth_header")]
    pub auth_header: String,

    /// Environment variable holding the session credential
    #[serde(rename = "credential-env", default = "default_credential_env")]
    pub credential_env: String,
}

impl ApiConfig {
    /// Returns the catalog base URL without a trailing slash
    pub fn resolved_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "https://{}.vtexcommercestable.com.br/api/catalog/pvt",
                self.account_name
            ),
        }
    }
}

/// Batch engine tunables
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of items processed at the same time
    #[serde(rename = "max-workers", default = "default_max_workers")]
    pub max_workers: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Automatic retries for transient server statuses
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base of the exponential backoff between transient retries (seconds)
    #[serde(rename = "backoff-factor", default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// Minimum spacing between any two outbound requests (milliseconds)
    #[serde(rename = "rate-limit-delay-ms", default = "default_rate_limit_delay")]
    pub rate_limit_delay_ms: u64,

    /// Completions between checkpoint flushes
    #[serde(rename = "checkpoint-interval", default = "default_checkpoint_interval")]
    pub checkpoint_interval: u32,

    /// Re-issues allowed for a single call after HTTP 429
    #[serde(rename = "max-throttle-retries", default = "default_max_throttle_retries")]
    pub max_throttle_retries: u32,

    /// Total time a single call may spend sleeping on HTTP 429 (seconds)
    #[serde(rename = "max-throttle-wait-secs", default = "default_max_throttle_wait")]
    pub max_throttle_wait_secs: u64,

    /// Wait used when a 429 response carries no usable Retry-After (seconds)
    #[serde(rename = "default-retry-after-secs", default = "default_retry_after")]
    pub default_retry_after_secs: u64,

    /// Stop dispatching new items once the credential is reported expired
    #[serde(rename = "halt-on-auth-expired", default)]
    pub halt_on_auth_expired: bool,
}

impl EngineConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }

    pub fn max_throttle_wait(&self) -> Duration {
        Duration::from_secs(self.max_throttle_wait_secs)
    }

    pub fn default_retry_after(&self) -> Duration {
        Duration::from_secs(self.default_retry_after_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            request_timeout_secs: default_request_timeout(),
            max_retries: default_max_retries(),
            backoff_factor: default_backoff_factor(),
            rate_limit_delay_ms: default_rate_limit_delay(),
            checkpoint_interval: default_checkpoint_interval(),
            max_throttle_retries: default_max_throttle_retries(),
            max_throttle_wait_secs: default_max_throttle_wait(),
            default_retry_after_secs: default_retry_after(),
            halt_on_auth_expired: false,
        }
    }
}

/// Paths of the files the engine reads and writes
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Input list of SKU IDs, one per line
    #[serde(rename = "sku-list", default = "default_sku_list")]
    pub sku_list: String,

    /// Checkpoint JSON file
    #[serde(default = "default_checkpoint")]
    pub checkpoint: String,

    /// Execution log (all levels)
    #[serde(default = "default_log")]
    pub log: String,

    /// Error log (ERROR and CRITICAL only)
    #[serde(rename = "error-log", default = "default_error_log")]
    pub error_log: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            sku_list: default_sku_list(),
            checkpoint: default_checkpoint(),
            log: default_log(),
            error_log: default_error_log(),
        }
    }
}

/// Alt text generation settings
#[derive(Debug, Clone, Deserialize)]
pub struct AltTextConfig {
    /// Text used when the product name normalizes to nothing
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

impl Default for AltTextConfig {
    fn default() -> Self {
        Self {
            fallback: default_fallback(),
        }
    }
}

fn default_auth_header() -> String {
    "VtexIdclientAutCookie".to_string()
}

fn default_credential_env() -> String {
    "VTEX_COOKIE".to_string()
}

fn default_max_workers() -> u32 {
    3
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_factor() -> f64 {
    1.0
}

fn default_rate_limit_delay() -> u64 {
    300
}

fn default_checkpoint_interval() -> u32 {
    10
}

fn default_max_throttle_retries() -> u32 {
    5
}

fn default_max_throttle_wait() -> u64 {
    600
}

fn default_retry_after() -> u64 {
    60
}

fn default_sku_list() -> String {
    "sku_ids.txt".to_string()
}

fn default_checkpoint() -> String {
    "checkpoint.json".to_string()
}

fn default_log() -> String {
    "execution_log.txt".to_string()
}

fn default_error_log() -> String {
    "error_log.txt".to_string()
}

fn default_fallback() -> String {
    "produto farmacêutico".to_string()
}
