//! Server builder and run_server function

use crate::config::{ConfigProvider, Validate};
use crate::core::classifier::{Classifier, HttpClassifier};
use crate::server::server::HttpServer;
use crate::server::state::AppState;
use crate::utils::error::{PuritanError, Result};
use std::sync::Arc;
use tracing::info;

/// Server builder for easier configuration
#[derive(Default)]
pub struct ServerBuilder {
    config: Option<Arc<ConfigProvider>>,
    classifier: Option<Arc<dyn Classifier>>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration provider
    pub fn with_config(mut self, config: Arc<ConfigProvider>) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a specific classifier instead of the configured inference endpoint
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Build the HTTP server.
    ///
    /// The start-up configuration is validated strictly; later snapshots
    /// fall back to defaults for values that fail to parse.
    pub fn build(self) -> Result<HttpServer> {
        let provider = self
            .config
            .ok_or_else(|| PuritanError::config("Configuration is required"))?;

        let snapshot = provider.snapshot();
        snapshot.config.validate().map_err(PuritanError::Config)?;

        let classifier = match self.classifier {
            Some(classifier) => classifier,
            None => Arc::new(HttpClassifier::from_config(&snapshot.config.server)?),
        };
        info!(
            classifier = classifier.name(),
            max_concurrency = classifier.max_concurrency(),
            "Classifier ready"
        );

        let state = AppState::new(provider, classifier)?;
        Ok(HttpServer::new(snapshot.config.server.clone(), state))
    }
}

/// Run the server with configuration from the environment
pub async fn run_server() -> Result<()> {
    info!("Starting PixelPuritan server v{}", crate::VERSION);

    let provider = Arc::new(ConfigProvider::from_env());
    let server = ServerBuilder::new().with_config(provider).build()?;

    let limiter = server.state().limiter.config();
    info!(
        rate_per_second = limiter.rate_per_second,
        burst_capacity = limiter.burst_capacity,
        api_key_required = limiter.requires_api_key(),
        "Admission control configured"
    );
    info!("API endpoints:");
    info!("   POST /v1/detect - Classify an uploaded image");
    info!("   GET  /metrics   - Prometheus metrics");
    info!("   GET  /health    - Health check");

    server.start().await
}
