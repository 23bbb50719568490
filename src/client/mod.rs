//! Outbound HTTP plumbing for the catalog API
//!
//! This module contains:
//! - The global rate limiter that paces every request
//! - The resilient client that retries transient failures and throttling

mod rate_limiter;
mod resilient;

pub use rate_limiter::RateLimiter;
pub use resilient::{build_http_client, CallOutcome, ClientSettings, NoResponseKind, ResilientClient};

use crate::config::Config;
use crate::AltError;
use std::sync::Arc;

/// Builds the shared client for a run from configuration and credential
///
/// The rate limiter is created here once and shared by every clone of the
/// returned client.
pub fn client_from_config(config: &Config, credential: &str) -> Result<ResilientClient, AltError> {
    let settings = ClientSettings::from(&config.engine);
    let http = build_http_client(&config.api.auth_header, credential, settings.timeout)?;
    let limiter = Arc::new(RateLimiter::new(config.engine.rate_limit_delay()));
    Ok(ResilientClient::new(http, limiter, settings))
}
