//! Configuration data models
//!
//! This module defines all configuration structures used by the server and
//! the scanning client.

pub mod client;
pub mod rate_limit;
pub mod server;

// Re-export all configuration types
pub use client::*;
pub use rate_limit::*;
pub use server::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    8000
}

/// Default upload ceiling in bytes
pub fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024 // 20MB
}

/// Default inference timeout in seconds
pub fn default_inference_timeout() -> u64 {
    60
}

/// Default number of concurrent inference calls
pub fn default_inference_concurrency() -> usize {
    1
}

pub fn default_rate_per_second() -> f64 {
    5.0
}

pub fn default_burst_capacity() -> u32 {
    10
}

pub fn default_api_url() -> String {
    "http://localhost:8000/v1/detect".to_string()
}

pub fn default_concurrency() -> usize {
    4
}

/// Default per-attempt timeout in seconds
pub fn default_request_timeout() -> u64 {
    30
}

pub fn default_max_attempts() -> u32 {
    3
}

pub fn default_backoff_base() -> f64 {
    0.6
}
