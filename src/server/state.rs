//! Application state shared across HTTP handlers

use crate::config::ConfigProvider;
use crate::core::classifier::Classifier;
use crate::core::observability::MetricsCollector;
use crate::core::rate_limiter::TokenBucketLimiter;
use crate::server::pipeline::RequestPipeline;
use crate::utils::error::Result;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// Every field is reference counted, so cloning the state for each actix
/// worker shares one limiter, one metrics registry and one inference gate.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Live configuration source
    pub config: Arc<ConfigProvider>,
    /// Per-client token buckets
    pub limiter: Arc<TokenBucketLimiter>,
    /// Prometheus registry
    pub metrics: MetricsCollector,
    /// Detect request pipeline
    pub pipeline: Arc<RequestPipeline>,
}

impl AppState {
    /// Create the state around a configuration provider and a classifier
    pub fn new(config: Arc<ConfigProvider>, classifier: Arc<dyn Classifier>) -> Result<Self> {
        let snapshot = config.snapshot();
        let limiter = Arc::new(TokenBucketLimiter::new(snapshot.config.limiter.clone()));
        limiter.apply(snapshot.version, &snapshot.config.limiter);

        let metrics = MetricsCollector::new()?;
        let pipeline = Arc::new(RequestPipeline::new(
            Arc::clone(&config),
            Arc::clone(&limiter),
            metrics.clone(),
            classifier,
        ));

        Ok(Self {
            config,
            limiter,
            metrics,
            pipeline,
        })
    }
}
