//! Configuration management for PixelPuritan
//!
//! Configuration is read from the environment through a [`ConfigProvider`],
//! which hands out immutable, versioned [`ConfigSnapshot`]s. The server
//! fetches a fresh snapshot at the start of every request so that limit and
//! API key changes take effect without a restart.

pub mod loader;
pub mod models;
pub mod provider;
pub mod validation;

pub use loader::{ConfigIssue, EnvVars, env_lookup};
pub use models::*;
pub use provider::{ConfigLookup, ConfigProvider, ConfigSnapshot};
pub use validation::Validate;

use crate::utils::error::{PuritanError, Result};
use serde::{Deserialize, Serialize};

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Admission control settings
    #[serde(default)]
    pub limiter: LimiterConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Scanning client settings
    #[serde(default)]
    pub client: ClientConfig,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    /// Validate the whole configuration, failing on the first problem
    pub fn validated(self) -> Result<Self> {
        self.validate().map_err(PuritanError::Config)?;
        Ok(self)
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    /// Get limiter configuration
    pub fn limiter(&self) -> &LimiterConfig {
        &self.limiter
    }

    /// Get client configuration
    pub fn client(&self) -> &ClientConfig {
        &self.client
    }
}
