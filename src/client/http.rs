//! Single-file send with per-attempt timeout and retry

use super::types::{HttpReply, RetryState, SendError};
use crate::config::ClientConfig;
use crate::utils::error::{PuritanError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Header carrying the client credential
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Something that can deliver one file to the detect endpoint
#[async_trait]
pub trait DetectTransport: Send + Sync {
    async fn send(
        &self,
        endpoint: &str,
        file_bytes: Bytes,
        file_name: &str,
    ) -> std::result::Result<HttpReply, SendError>;
}

/// Retry settings for [`RetryingHttpClient`]
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before attempt `n` is `backoff_base^n` seconds
    pub backoff_base: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
        }
    }

    /// A policy that never retries
    pub fn single_attempt() -> Self {
        Self::new(1, 0.0)
    }

    /// Sleep before 1-indexed attempt `attempt`; zero for the first attempt.
    ///
    /// With a base below 1 the delays shrink as attempts increase.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        if attempt < 2 {
            return Duration::ZERO;
        }
        let secs = self.backoff_base.powi(attempt as i32);
        if secs.is_finite() && secs > 0.0 {
            Duration::from_secs_f64(secs)
        } else {
            Duration::ZERO
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            crate::config::default_max_attempts(),
            crate::config::default_backoff_base(),
        )
    }
}

/// HTTP client posting multipart uploads with timeout and retry.
///
/// 2xx replies return immediately. 5xx, 429, connection failures and
/// timeouts are retried until the attempt ceiling; any other status is
/// returned at once.
#[derive(Debug, Clone)]
pub struct RetryingHttpClient {
    client: Client,
    api_key: Option<String>,
    timeout: Duration,
    policy: RetryPolicy,
}

impl RetryingHttpClient {
    pub fn new(timeout: Duration, policy: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pixelpuritan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PuritanError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: None,
            timeout,
            policy,
        })
    }

    /// Build from client settings
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = Self::new(
            config.request_timeout(),
            RetryPolicy::new(config.max_attempts, config.backoff_base),
        )?;
        Ok(match &config.api_key {
            Some(key) => client.with_api_key(key.clone()),
            None => client,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check that the service is reachable at all.
    ///
    /// Any HTTP answer counts as reachable; only connection failures and
    /// timeouts are errors.
    pub async fn probe(&self, endpoint: &str) -> std::result::Result<(), SendError> {
        let request = self.client.get(endpoint).send();
        match timeout(self.timeout, request).await {
            Ok(Ok(response)) => {
                debug!(endpoint, status = response.status().as_u16(), "Service reachable");
                Ok(())
            }
            Ok(Err(e)) => Err(SendError::from(e)),
            Err(_) => Err(SendError::Network(format!(
                "no answer within {:?}",
                self.timeout
            ))),
        }
    }

    async fn attempt(
        &self,
        endpoint: &str,
        file_bytes: Bytes,
        file_name: &str,
    ) -> std::result::Result<HttpReply, SendError> {
        let length = file_bytes.len() as u64;
        let part = Part::stream_with_length(file_bytes, length).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let mut request = self.client.post(endpoint).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let exchange = async {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>(HttpReply { status, body })
        };

        match timeout(self.timeout, exchange).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(SendError::Network(format!(
                "request timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

#[async_trait]
impl DetectTransport for RetryingHttpClient {
    async fn send(
        &self,
        endpoint: &str,
        file_bytes: Bytes,
        file_name: &str,
    ) -> std::result::Result<HttpReply, SendError> {
        let mut state = RetryState::new();

        loop {
            if state.attempt > 1 {
                sleep(self.policy.backoff_delay(state.attempt)).await;
            }

            let error = match self.attempt(endpoint, file_bytes.clone(), file_name).await {
                Ok(reply) if reply.is_success() => return Ok(reply),
                Ok(reply) => SendError::Status {
                    status: reply.status,
                    body: reply.body,
                },
                Err(e) => e,
            };

            if !error.is_transient() {
                debug!(file_name, error = %error, "Permanent failure, not retrying");
                return Err(error);
            }

            warn!(
                file_name,
                attempt = state.attempt,
                max_attempts = self.policy.max_attempts,
                error = %error,
                "Transient failure"
            );
            if !state.fail(error, self.policy.max_attempts) {
                break;
            }
        }

        Err(state
            .last_error
            .unwrap_or_else(|| SendError::Network("no attempt was made".to_string())))
    }
}
