//! Types shared by the scanning client

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure of one send to the detect endpoint
#[derive(Debug, Error)]
pub enum SendError {
    /// The server answered with a non-success status
    #[error("HTTP {status}")]
    Status { status: u16, body: String },

    /// Connection failure or per-attempt timeout
    #[error("network/timeout: {0}")]
    Network(String),

    /// The file could not be read
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// A 2xx response whose body is not a detection
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl SendError {
    /// 5xx, 429, connection failures and timeouts are worth retrying
    pub fn is_transient(&self) -> bool {
        match self {
            SendError::Status { status, .. } => *status >= 500 || *status == 429,
            SendError::Network(_) => true,
            SendError::Io(_) | SendError::InvalidResponse(_) => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SendError {
    fn from(error: reqwest::Error) -> Self {
        SendError::Network(error.to_string())
    }
}

/// Raw reply to one send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Attempt bookkeeping for one file's send loop
#[derive(Debug)]
pub struct RetryState {
    /// 1-indexed current attempt, never above the attempt ceiling
    pub attempt: u32,
    pub last_error: Option<SendError>,
}

impl RetryState {
    pub fn new() -> Self {
        Self {
            attempt: 1,
            last_error: None,
        }
    }

    /// Record a transient failure of the current attempt and move to the
    /// next one. Returns `false`, leaving `attempt` unchanged, once
    /// `max_attempts` have been made.
    pub fn fail(&mut self, error: SendError, max_attempts: u32) -> bool {
        self.last_error = Some(error);
        if self.attempt >= max_attempts {
            return false;
        }
        self.attempt += 1;
        true
    }
}

impl Default for RetryState {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome class of one scanned file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Safe,
    Nsfw,
    Error,
}

/// Result of scanning one file.
///
/// Either the verdict pair or `error` is populated, never both.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub source_path: PathBuf,
    pub is_nsfw: Option<bool>,
    pub confidence: Option<f64>,
    pub error: Option<String>,
}

impl ScanResult {
    pub fn success(source_path: impl Into<PathBuf>, is_nsfw: bool, confidence: f64) -> Self {
        Self {
            source_path: source_path.into(),
            is_nsfw: Some(is_nsfw),
            confidence: Some(confidence),
            error: None,
        }
    }

    pub fn failure(source_path: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            is_nsfw: None,
            confidence: None,
            error: Some(error.into()),
        }
    }

    pub fn outcome(&self) -> Outcome {
        match (self.is_nsfw, &self.error) {
            (Some(true), None) => Outcome::Nsfw,
            (Some(false), None) => Outcome::Safe,
            _ => Outcome::Error,
        }
    }

    pub fn path(&self) -> &Path {
        &self.source_path
    }
}
