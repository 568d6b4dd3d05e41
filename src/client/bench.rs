//! Load generator for the detect endpoint

use super::http::DetectTransport;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Latency and throughput of one benchmark run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BenchReport {
    pub ok: usize,
    pub failed: usize,
    /// Latency of each successful request
    pub latencies: Vec<Duration>,
    pub elapsed: Duration,
}

impl BenchReport {
    pub fn total(&self) -> usize {
        self.ok + self.failed
    }

    pub fn average(&self) -> Option<Duration> {
        if self.latencies.is_empty() {
            return None;
        }
        let sum: Duration = self.latencies.iter().sum();
        Some(sum / self.latencies.len() as u32)
    }

    pub fn min(&self) -> Option<Duration> {
        self.latencies.iter().min().copied()
    }

    pub fn max(&self) -> Option<Duration> {
        self.latencies.iter().max().copied()
    }

    /// Successful requests per second over the whole run
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.ok as f64 / secs
        } else {
            0.0
        }
    }
}

/// Send `image` `rounds` times with at most `concurrency` requests in flight
pub async fn run_bench<T: DetectTransport>(
    transport: Arc<T>,
    endpoint: &str,
    image: Bytes,
    file_name: &str,
    rounds: usize,
    concurrency: usize,
) -> BenchReport {
    let started = Instant::now();

    let outcomes: Vec<Option<Duration>> = stream::iter(0..rounds)
        .map(|round| {
            let transport = Arc::clone(&transport);
            let image = image.clone();
            async move {
                let sent = Instant::now();
                match transport.send(endpoint, image, file_name).await {
                    Ok(reply) if reply.is_success() => Some(sent.elapsed()),
                    Ok(reply) => {
                        debug!(round, status = reply.status, "Bench request failed");
                        None
                    }
                    Err(e) => {
                        debug!(round, error = %e, "Bench request failed");
                        None
                    }
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut report = BenchReport {
        elapsed: started.elapsed(),
        ..BenchReport::default()
    };
    for outcome in outcomes {
        match outcome {
            Some(latency) => {
                report.ok += 1;
                report.latencies.push(latency);
            }
            None => report.failed += 1,
        }
    }
    report
}
