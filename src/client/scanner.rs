//! Bounded-concurrency batch scanning

use super::http::DetectTransport;
use super::types::{HttpReply, ScanResult};
use crate::core::classifier::Detection;
use bytes::Bytes;
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;
use tracing::debug;

type ProgressCallback = Box<dyn Fn(&ScanResult, usize) + Send + Sync>;

/// Completed-file counter, optionally reporting each completion
#[derive(Default)]
pub struct ScanProgress {
    completed: AtomicUsize,
    callback: Option<ProgressCallback>,
}

impl ScanProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `callback` with each result and the number completed so far
    pub fn with_callback(callback: impl Fn(&ScanResult, usize) + Send + Sync + 'static) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            callback: Some(Box::new(callback)),
        }
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    fn record(&self, result: &ScanResult) {
        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(callback) = &self.callback {
            callback(result, done);
        }
    }
}

impl std::fmt::Debug for ScanProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanProgress")
            .field("completed", &self.completed())
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Fans file scans out under a fixed concurrency cap.
///
/// A slot is acquired before a file is read and held until its send loop
/// finishes, retries included. Results come back in completion order and
/// there is exactly one per input file.
pub struct BoundedScanner<T> {
    transport: Arc<T>,
    endpoint: String,
    gate: Semaphore,
    concurrency: usize,
    progress: ScanProgress,
}

impl<T: DetectTransport> BoundedScanner<T> {
    pub fn new(transport: Arc<T>, endpoint: impl Into<String>, concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            transport,
            endpoint: endpoint.into(),
            gate: Semaphore::new(concurrency),
            concurrency,
            progress: ScanProgress::new(),
        }
    }

    pub fn with_progress(mut self, progress: ScanProgress) -> Self {
        self.progress = progress;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn progress(&self) -> &ScanProgress {
        &self.progress
    }

    /// Scan every file, returning results in completion order
    pub async fn scan(&self, files: Vec<PathBuf>) -> Vec<ScanResult> {
        let mut results = Vec::with_capacity(files.len());
        let mut pending: FuturesUnordered<_> =
            files.into_iter().map(|path| self.scan_one(path)).collect();

        while let Some(result) = pending.next().await {
            self.progress.record(&result);
            results.push(result);
        }

        results
    }

    async fn scan_one(&self, path: PathBuf) -> ScanResult {
        let _permit = match self.gate.acquire().await {
            Ok(permit) => permit,
            Err(_) => return ScanResult::failure(path, "scanner shut down"),
        };

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) => return ScanResult::failure(path, format!("io: {}", e)),
        };

        let file_name = display_name(&path);
        debug!(path = %path.display(), bytes = bytes.len(), "Sending file");

        match self.transport.send(&self.endpoint, bytes, &file_name).await {
            Ok(reply) => interpret(path, reply),
            Err(e) => ScanResult::failure(path, e.to_string()),
        }
    }
}

impl<T> std::fmt::Debug for BoundedScanner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedScanner")
            .field("endpoint", &self.endpoint)
            .field("concurrency", &self.concurrency)
            .field("progress", &self.progress)
            .finish()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn interpret(path: PathBuf, reply: HttpReply) -> ScanResult {
    match serde_json::from_str::<Detection>(&reply.body) {
        Ok(detection) => ScanResult::success(
            path,
            detection.is_nsfw,
            detection.confidence_percentage,
        ),
        Err(e) => ScanResult::failure(path, format!("invalid response: {}", e)),
    }
}
