//! Rate limiting configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Token bucket limiter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Tokens added to every bucket per second
    #[serde(default = "default_rate_per_second")]
    pub rate_per_second: f64,
    /// Maximum tokens a bucket can hold
    #[serde(default = "default_burst_capacity")]
    pub burst_capacity: u32,
    /// Required `X-API-Key` value; `None` leaves the endpoint open
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            rate_per_second: default_rate_per_second(),
            burst_capacity: default_burst_capacity(),
            api_key: None,
        }
    }
}

impl LimiterConfig {
    /// Create a limiter configuration without an API key
    pub fn new(rate_per_second: f64, burst_capacity: u32) -> Self {
        Self {
            rate_per_second,
            burst_capacity,
            api_key: None,
        }
    }

    /// Require the given API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Whether requests must present an API key
    pub fn requires_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}
