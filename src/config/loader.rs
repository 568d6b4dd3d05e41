//! Configuration loading utilities
//!
//! This module maps `PIXELPURITAN_*` environment variables onto [`Config`].
//! Loading is lenient: a value that does not parse or validate is replaced by
//! its default and reported as a [`ConfigIssue`].

use super::Config;
use super::models::*;
use std::str::FromStr;
use tracing::warn;

/// Environment variable names
pub struct EnvVars;

impl EnvVars {
    pub const RATE_LIMIT_RPS: &'static str = "PIXELPURITAN_RATE_LIMIT_RPS";
    pub const RATE_LIMIT_BURST: &'static str = "PIXELPURITAN_RATE_LIMIT_BURST";
    pub const API_KEY: &'static str = "PIXELPURITAN_API_KEY";
    pub const API_URL: &'static str = "PIXELPURITAN_API_URL";
    pub const CONCURRENCY: &'static str = "PIXELPURITAN_CONCURRENCY";
    pub const HOST: &'static str = "PIXELPURITAN_HOST";
    pub const PORT: &'static str = "PIXELPURITAN_PORT";
    pub const EXPOSE_ERRORS: &'static str = "PIXELPURITAN_EXPOSE_ERRORS";
    pub const INFERENCE_URL: &'static str = "PIXELPURITAN_INFERENCE_URL";
    pub const INFERENCE_TOKEN: &'static str = "PIXELPURITAN_INFERENCE_TOKEN";
    pub const INFERENCE_TIMEOUT: &'static str = "PIXELPURITAN_INFERENCE_TIMEOUT";
    pub const INFERENCE_CONCURRENCY: &'static str = "PIXELPURITAN_INFERENCE_CONCURRENCY";
}

/// Lookup backed by the process environment
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// A configuration value that was ignored in favour of its default
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigIssue {
    pub key: &'static str,
    pub raw: String,
    pub fallback: String,
    /// The value parsed but failed its range check
    pub out_of_range: bool,
}

impl ConfigIssue {
    /// Log the issue at warn level
    pub fn report(&self) {
        let reason = if self.out_of_range {
            "Out of range config value"
        } else {
            "Unparseable config value"
        };
        warn!(key = self.key, raw = %self.raw, fallback = %self.fallback, "{}", reason);
    }
}

impl Config {
    /// Build a configuration from an arbitrary key lookup, logging every
    /// ignored value
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let (config, issues) = Self::load(lookup);
        issues.iter().for_each(ConfigIssue::report);
        config
    }

    /// Build a configuration and return the ignored values instead of
    /// logging them
    pub fn load<F>(lookup: F) -> (Self, Vec<ConfigIssue>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut issues = Vec::new();
        let lookup = &lookup;

        let limiter = LimiterConfig {
            rate_per_second: parse_checked(
                lookup,
                EnvVars::RATE_LIMIT_RPS,
                default_rate_per_second(),
                |v: &f64| v.is_finite() && *v > 0.0,
                &mut issues,
            ),
            burst_capacity: parse_checked(
                lookup,
                EnvVars::RATE_LIMIT_BURST,
                default_burst_capacity(),
                |v: &u32| *v >= 1,
                &mut issues,
            ),
            api_key: non_empty(lookup, EnvVars::API_KEY),
        };

        let server = ServerConfig {
            host: non_empty(lookup, EnvVars::HOST).unwrap_or_else(default_host),
            port: parse_checked(lookup, EnvVars::PORT, default_port(), |_| true, &mut issues),
            max_upload_bytes: default_max_upload_bytes(),
            expose_error_details: parse_flag(lookup, EnvVars::EXPOSE_ERRORS),
            inference_url: non_empty(lookup, EnvVars::INFERENCE_URL),
            inference_token: non_empty(lookup, EnvVars::INFERENCE_TOKEN),
            inference_timeout_secs: parse_checked(
                lookup,
                EnvVars::INFERENCE_TIMEOUT,
                default_inference_timeout(),
                |v: &u64| *v >= 1,
                &mut issues,
            ),
            inference_concurrency: parse_checked(
                lookup,
                EnvVars::INFERENCE_CONCURRENCY,
                default_inference_concurrency(),
                |v: &usize| *v >= 1,
                &mut issues,
            ),
        };

        let client = ClientConfig {
            api_url: non_empty(lookup, EnvVars::API_URL).unwrap_or_else(default_api_url),
            concurrency: parse_checked(
                lookup,
                EnvVars::CONCURRENCY,
                default_concurrency(),
                |v: &usize| *v >= 1,
                &mut issues,
            ),
            api_key: non_empty(lookup, EnvVars::API_KEY),
            ..ClientConfig::default()
        };

        let config = Self {
            limiter,
            server,
            client,
        };
        (config, issues)
    }
}

/// Trimmed value, with empty strings treated as unset
fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_checked<F, T, C>(
    lookup: &F,
    key: &'static str,
    default: T,
    check: C,
    issues: &mut Vec<ConfigIssue>,
) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
    C: Fn(&T) -> bool,
{
    let Some(raw) = non_empty(lookup, key) else {
        return default;
    };

    let out_of_range = match raw.parse::<T>() {
        Ok(value) if check(&value) => return value,
        Ok(_) => true,
        Err(_) => false,
    };
    issues.push(ConfigIssue {
        key,
        raw,
        fallback: format!("{:?}", default),
        out_of_range,
    });
    default
}

fn parse_flag<F>(lookup: &F, key: &str) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    matches!(
        non_empty(lookup, key).map(|v| v.to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}
