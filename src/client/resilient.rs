//! HTTP calls against the catalog API with pacing, retry, and throttle handling
//!
//! This module handles:
//! - Building the HTTP client with the session credential header
//! - Passing every request through the shared rate limiter
//! - Retrying transient server statuses with exponential backoff
//! - Honoring server-requested waits on HTTP 429, up to a bounded budget
//! - Classifying network failures as "no response" outcomes

use crate::client::RateLimiter;
use crate::config::EngineConfig;
use crate::{AltError, ConfigError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;

/// Server statuses retried transparently with exponential backoff
const TRANSIENT_STATUSES: [u16; 4] = [500, 502, 503, 504];

/// Result of a single logical API call
#[derive(Debug)]
pub enum CallOutcome {
    /// The server answered; any status, including 4xx/5xx
    Response {
        /// Final HTTP status code
        status: StatusCode,
        /// Response body
        body: String,
    },

    /// No usable response arrived (timeout, refused connection, broken body)
    NoResponse {
        /// What kind of network failure occurred
        kind: NoResponseKind,
        /// Error description
        error: String,
    },

    /// The server kept answering 429 past the configured throttle budget
    RateLimited {
        /// Number of 429 responses received
        attempts: u32,
        /// Total time spent sleeping on server-requested waits
        waited: Duration,
    },
}

/// Classification of network-level failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoResponseKind {
    Timeout,
    Connect,
    Other,
}

impl CallOutcome {
    /// Returns the status code if the server answered
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Response { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Retry and throttle tunables for the resilient client
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries for transient 5xx statuses
    pub max_retries: u32,
    /// Backoff base in seconds; attempt `n` sleeps `factor * 2^(n-1)`
    pub backoff_factor: f64,
    /// Re-issues allowed after HTTP 429
    pub max_throttle_retries: u32,
    /// Total sleep budget for HTTP 429 on one call
    pub max_throttle_wait: Duration,
    /// Wait used when Retry-After is missing or unparseable
    pub default_retry_after: Duration,
}

impl From<&EngineConfig> for ClientSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            timeout: config.request_timeout(),
            max_retries: config.max_retries,
            backoff_factor: config.backoff_factor,
            max_throttle_retries: config.max_throttle_retries,
            max_throttle_wait: config.max_throttle_wait(),
            default_retry_after: config.default_retry_after(),
        }
    }
}

impl ClientSettings {
    /// Computes the sleep before transient retry number `attempt` (1-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16) as i32;
        let secs = self.backoff_factor * 2f64.powi(exponent);
        Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
    }
}

/// Builds an HTTP client that authenticates every request
///
/// # Arguments
///
/// * `auth_header` - Name of the header carrying the session credential
/// * `credential` - The credential value
/// * `timeout` - Per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(AltError)` - Invalid header or failed to build client
pub fn build_http_client(
    auth_header: &str,
    credential: &str,
    timeout: Duration,
) -> Result<Client, AltError> {
    let name = HeaderName::from_bytes(auth_header.as_bytes()).map_err(|e| {
        ConfigError::Validation(format!("Invalid auth header '{}': {}", auth_header, e))
    })?;
    let mut value = HeaderValue::from_str(credential)
        .map_err(|e| ConfigError::Validation(format!("Invalid credential value: {}", e)))?;
    value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(name, value);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client = Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// HTTP client wrapper shared by all workers
#[derive(Debug, Clone)]
pub struct ResilientClient {
    http: Client,
    limiter: Arc<RateLimiter>,
    settings: ClientSettings,
}

impl ResilientClient {
    /// Creates a resilient client from its collaborators
    pub fn new(http: Client, limiter: Arc<RateLimiter>, settings: ClientSettings) -> Self {
        Self {
            http,
            limiter,
            settings,
        }
    }

    /// Executes one logical call, retrying beneath the call boundary
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 500/502/503/504 | Retry up to `max_retries`, exponential backoff |
    /// | HTTP 429 | Sleep Retry-After (or default), re-issue, bounded |
    /// | Timeout | Return `NoResponse(Timeout)` |
    /// | Connection failure | Return `NoResponse(Connect)` |
    /// | Any other status | Return `Response` |
    ///
    /// Every attempt, including re-issues, first waits on the rate limiter.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> CallOutcome {
        let mut transient_attempts = 0u32;
        let mut throttled = 0u32;
        let mut throttle_waited = Duration::ZERO;

        loop {
            self.limiter.wait().await;

            let mut request = self.http.request(method.clone(), url);
            if let Some(payload) = body {
                request = request.json(payload);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => return classify_network_error(&method, url, e),
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                throttled += 1;
                let wait = retry_after(response.headers().get(RETRY_AFTER))
                    .unwrap_or(self.settings.default_retry_after);

                let over_budget = throttle_waited
                    .checked_add(wait)
                    .map_or(true, |total| total > self.settings.max_throttle_wait);

                if throttled > self.settings.max_throttle_retries || over_budget {
                    tracing::error!(
                        "Rate limit persisted on {} {} after {} attempts ({}s waited)",
                        method,
                        url,
                        throttled,
                        throttle_waited.as_secs()
                    );
                    return CallOutcome::RateLimited {
                        attempts: throttled,
                        waited: throttle_waited,
                    };
                }

                tracing::warn!("Rate limit hit. Waiting {}s...", wait.as_secs_f64());
                tokio::time::sleep(wait).await;
                throttle_waited += wait;
                continue;
            }

            if TRANSIENT_STATUSES.contains(&status.as_u16())
                && transient_attempts < self.settings.max_retries
            {
                transient_attempts += 1;
                let delay = self.settings.backoff_delay(transient_attempts);
                tracing::debug!(
                    "Transient status {} on {} {}, retry {}/{} in {:?}",
                    status.as_u16(),
                    method,
                    url,
                    transient_attempts,
                    self.settings.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            return match response.text().await {
                Ok(body) => CallOutcome::Response { status, body },
                Err(e) => {
                    tracing::error!("Failed to read response body from {} {}: {}", method, url, e);
                    CallOutcome::NoResponse {
                        kind: NoResponseKind::Other,
                        error: e.to_string(),
                    }
                }
            };
        }
    }
}

fn classify_network_error(method: &Method, url: &str, error: reqwest::Error) -> CallOutcome {
    if error.is_timeout() {
        tracing::error!("Timeout on {} {}", method, url);
        CallOutcome::NoResponse {
            kind: NoResponseKind::Timeout,
            error: "Request timeout".to_string(),
        }
    } else if error.is_connect() {
        tracing::error!("Connection error: {}", error);
        CallOutcome::NoResponse {
            kind: NoResponseKind::Connect,
            error: error.to_string(),
        }
    } else {
        tracing::error!("Unexpected error on {} {}: {}", method, url, error);
        CallOutcome::NoResponse {
            kind: NoResponseKind::Other,
            error: error.to_string(),
        }
    }
}

/// Parses a Retry-After header given in whole seconds
fn retry_after(value: Option<&HeaderValue>) -> Option<Duration> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
