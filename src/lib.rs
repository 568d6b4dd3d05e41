//! # PixelPuritan
//!
//! A rate-limited NSFW image classification gateway and the client that
//! feeds it.
//!
//! ## Components
//!
//! - **Server** ([`server`]): `POST /v1/detect` guarded by a per-client
//!   token bucket and an optional API key, with Prometheus metrics on
//!   `/metrics`. Classification itself is delegated to a [`Classifier`].
//! - **Client** ([`client`]): scans files or directory trees with bounded
//!   concurrency, retries transient failures and writes an `errors.csv`
//!   report for files that could not be classified.
//! - **Splitter** ([`splitter`]): moves the loose files of a directory into
//!   numbered batch folders.
//!
//! ## Running the server
//!
//! ```rust,no_run
//! use pixelpuritan::server::run_server;
//!
//! #[actix_web::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads PIXELPURITAN_* variables, including PIXELPURITAN_INFERENCE_URL
//!     run_server().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Scanning a directory
//!
//! ```rust,no_run
//! use pixelpuritan::client::{BatchSummary, BoundedScanner, RetryingHttpClient, discover};
//! use pixelpuritan::Config;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env();
//!     let client = Arc::new(RetryingHttpClient::from_config(&config.client)?);
//!     let scanner = BoundedScanner::new(client, &config.client.api_url, config.client.concurrency);
//!
//!     let results = scanner.scan(discover("photos".as_ref())?).await;
//!     println!("{:?}", BatchSummary::from_results(&results));
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod client;
pub mod config;
pub mod core;
pub mod server;
pub mod splitter;
pub mod utils;

// Re-export main types
pub use config::{Config, ConfigProvider, ConfigSnapshot};
pub use core::classifier::{Classifier, Detection, HttpClassifier, Prediction, Verdict};
pub use core::rate_limiter::{RateLimitResult, TokenBucketLimiter};
pub use utils::error::{PuritanError, Result};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Seconds since the Unix epoch
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
    /// Rust version
    pub rust_version: &'static str,
    /// Cargo profile
    pub profile: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: env!("BUILD_TIME"),
            git_hash: env!("GIT_HASH"),
            rust_version: env!("RUST_VERSION"),
            profile: env!("BUILD_PROFILE"),
        }
    }
}

/// Build
pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
