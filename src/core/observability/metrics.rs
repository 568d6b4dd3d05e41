//! Metrics collection and export

use crate::utils::error::Result;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::time::Duration;

/// Inference latency histogram buckets, in seconds
pub const INFERENCE_LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Metrics collector and exporter
#[derive(Clone)]
pub struct MetricsCollector {
    registry: Registry,
    /// Detection requests by response status
    requests_total: IntCounterVec,
    /// Time spent inside the classifier
    inference_latency: Histogram,
    /// Number of client keys tracked by the rate limiter
    limiter_keys: IntGauge,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new(
                "pixelpuritan_requests_total",
                "Total number of detection requests by response status",
            ),
            &["status"],
        )?;
        let inference_latency = Histogram::with_opts(
            HistogramOpts::new(
                "pixelpuritan_inference_latency_seconds",
                "Latency of classifier invocations",
            )
            .buckets(INFERENCE_LATENCY_BUCKETS.to_vec()),
        )?;
        let limiter_keys = IntGauge::new(
            "pixelpuritan_rate_limiter_keys",
            "Client keys currently tracked by the rate limiter",
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(inference_latency.clone()))?;
        registry.register(Box::new(limiter_keys.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            inference_latency,
            limiter_keys,
        })
    }

    /// Count one finished detection request
    pub fn record_status(&self, status: u16) {
        self.requests_total
            .with_label_values(&[status.to_string().as_str()])
            .inc();
    }

    /// Record one classifier invocation
    pub fn record_inference(&self, latency: Duration) {
        self.inference_latency.observe(latency.as_secs_f64());
    }

    pub fn set_limiter_keys(&self, keys: usize) {
        self.limiter_keys.set(keys as i64);
    }

    /// Requests counted so far for one status
    pub fn status_count(&self, status: u16) -> u64 {
        self.requests_total
            .with_label_values(&[status.to_string().as_str()])
            .get()
    }

    /// Classifier invocations observed so far
    pub fn inference_count(&self) -> u64 {
        self.inference_latency.get_sample_count()
    }

    /// Content type of [`MetricsCollector::export_prometheus`]
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Export metrics to Prometheus format
    pub fn export_prometheus(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl std::fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsCollector")
            .field("inference_count", &self.inference_count())
            .finish()
    }
}
