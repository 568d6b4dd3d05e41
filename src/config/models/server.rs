//! Server configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Include internal error details in 5xx responses
    #[serde(default)]
    pub expose_error_details: bool,
    /// External inference endpoint
    #[serde(default)]
    pub inference_url: Option<String>,
    /// Bearer token for the inference endpoint
    #[serde(default)]
    pub inference_token: Option<String>,
    /// Inference request timeout in seconds
    #[serde(default = "default_inference_timeout")]
    pub inference_timeout_secs: u64,
    /// Concurrent inference calls the backend tolerates
    #[serde(default = "default_inference_concurrency")]
    pub inference_concurrency: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            expose_error_details: false,
            inference_url: None,
            inference_token: None,
            inference_timeout_secs: default_inference_timeout(),
            inference_concurrency: default_inference_concurrency(),
        }
    }
}

impl ServerConfig {
    /// Socket address string to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_secs(self.inference_timeout_secs)
    }
}
