//! Scanning client configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scanning client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Detection endpoint URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Maximum number of in-flight sends
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Value sent as `X-API-Key`
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-attempt timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Total attempts per file, first one included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff base; the delay before attempt `n` is `base^n` seconds
    #[serde(default = "default_backoff_base")]
    pub backoff_base: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            concurrency: default_concurrency(),
            api_key: None,
            request_timeout_secs: default_request_timeout(),
            max_attempts: default_max_attempts(),
            backoff_base: default_backoff_base(),
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
