//! Classifier backed by an external inference service

use super::decode::encode_png;
use super::types::Prediction;
use super::Classifier;
use crate::config::ServerConfig;
use crate::utils::error::{PuritanError, Result};
use async_trait::async_trait;
use image::RgbImage;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

/// Sends PNG-encoded images to an inference endpoint that answers with
/// `[{"label": "...", "score": 0.0}]`.
pub struct HttpClassifier {
    client: Client,
    endpoint: String,
    token: Option<String>,
    concurrency: usize,
}

impl HttpClassifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pixelpuritan/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: None,
            concurrency: 1,
        })
    }

    /// Build from server settings; requires `inference_url`
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let endpoint = config.inference_url.clone().ok_or_else(|| {
            PuritanError::config("PIXELPURITAN_INFERENCE_URL must point at an inference endpoint")
        })?;

        let mut classifier = Self::new(endpoint, config.inference_timeout())?
            .with_concurrency(config.inference_concurrency);
        if let Some(token) = &config.inference_token {
            classifier = classifier.with_token(token.clone());
        }
        Ok(classifier)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, image: &RgbImage) -> Result<Vec<Prediction>> {
        let body = encode_png(image)?;
        debug!(endpoint = %self.endpoint, bytes = body.len(), "Sending image to inference backend");

        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "image/png")
            .body(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PuritanError::inference(format!("inference request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PuritanError::inference(format!(
                "inference backend returned {}: {}",
                status, text
            )));
        }

        response
            .json::<Vec<Prediction>>()
            .await
            .map_err(|e| PuritanError::inference(format!("malformed inference response: {}", e)))
    }

    fn max_concurrency(&self) -> usize {
        self.concurrency
    }

    fn name(&self) -> &str {
        "http"
    }
}
