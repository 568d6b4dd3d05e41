//! Configuration validation
//!
//! Strict checks used at start-up. Live reloads go through the lenient
//! loader instead.

use super::Config;
use super::models::{ClientConfig, LimiterConfig, ServerConfig};

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl Validate for LimiterConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.rate_per_second.is_finite() || self.rate_per_second <= 0.0 {
            return Err(format!(
                "rate_per_second must be positive, got {}",
                self.rate_per_second
            ));
        }
        if self.burst_capacity == 0 {
            return Err("burst_capacity must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_upload_bytes == 0 {
            return Err("max_upload_bytes must be greater than 0".to_string());
        }
        if self.inference_concurrency == 0 {
            return Err("inference_concurrency must be at least 1".to_string());
        }
        if let Some(url) = &self.inference_url {
            validate_http_url(url).map_err(|e| format!("inference_url: {}", e))?;
        }
        Ok(())
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<(), String> {
        validate_http_url(&self.api_url).map_err(|e| format!("api_url: {}", e))?;
        if self.concurrency == 0 {
            return Err("concurrency must be at least 1".to_string());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if !self.backoff_base.is_finite() || self.backoff_base < 0.0 {
            return Err(format!(
                "backoff_base must be non-negative, got {}",
                self.backoff_base
            ));
        }
        Ok(())
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), String> {
        self.limiter.validate()?;
        self.server.validate()?;
        self.client.validate()?;
        Ok(())
    }
}

/// Accept only absolute http(s) URLs
pub fn validate_http_url(raw: &str) -> Result<(), String> {
    let parsed = url::Url::parse(raw).map_err(|e| format!("invalid URL '{}': {}", raw, e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(format!("unsupported scheme '{}'", scheme)),
    }
}
