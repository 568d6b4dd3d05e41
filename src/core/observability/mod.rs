//! Request and inference metrics
//!
//! Counters and histograms are kept in a private Prometheus registry and
//! rendered in the text exposition format for `GET /metrics`.

mod metrics;


pub use metrics::{INFERENCE_LATENCY_BUCKETS, MetricsCollector};
