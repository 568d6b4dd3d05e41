//! Error handling for PixelPuritan
//!
//! This module defines the error type shared by the server pipeline, the
//! scanning client and the binaries.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Result type alias for PixelPuritan
pub type Result<T> = std::result::Result<T, PuritanError>;

/// Message returned in place of internal error details in hardened mode
pub const GENERIC_INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Main error type for PixelPuritan
#[derive(Error, Debug)]
pub enum PuritanError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Metrics registry errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Rate limiting errors
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Missing or invalid API key
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request errors
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Upload exceeds the payload ceiling
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Image could not be decoded or verified
    #[error("Image decode error: {0}")]
    Decode(String),

    /// The external classifier failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),

    /// HTTP server lifecycle errors
    #[error("Server error: {0}")]
    Server(String),
}

impl PuritanError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn rate_limit<S: Into<String>>(message: S) -> Self {
        Self::RateLimit(message.into())
    }

    pub fn unauthorized<S: Into<String>>(message: S) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn payload_too_large<S: Into<String>>(message: S) -> Self {
        Self::PayloadTooLarge(message.into())
    }

    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::Decode(message.into())
    }

    pub fn inference<S: Into<String>>(message: S) -> Self {
        Self::Inference(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    pub fn server<S: Into<String>>(message: S) -> Self {
        Self::Server(message.into())
    }

    /// Stable machine-readable code used in error bodies
    pub fn error_code(&self) -> &'static str {
        match self {
            PuritanError::Config(_) => "CONFIG_ERROR",
            PuritanError::RateLimit(_) => "RATE_LIMIT_EXCEEDED",
            PuritanError::Unauthorized(_) => "UNAUTHORIZED",
            PuritanError::BadRequest(_) => "BAD_REQUEST",
            PuritanError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            PuritanError::Decode(_) => "DECODE_ERROR",
            PuritanError::Inference(_) => "INFERENCE_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Admission errors are answered with a specific status and never retried
    /// by the server.
    pub fn is_admission(&self) -> bool {
        matches!(
            self,
            PuritanError::RateLimit(_)
                | PuritanError::Unauthorized(_)
                | PuritanError::BadRequest(_)
                | PuritanError::PayloadTooLarge(_)
        )
    }

    /// Build the JSON error response, optionally hiding internal details.
    pub fn to_response(&self, request_id: Option<&str>, expose_details: bool) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() && !expose_details {
            GENERIC_INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message,
                timestamp: chrono::Utc::now().timestamp(),
                request_id: request_id.map(str::to_string),
            },
        };

        HttpResponse::build(status).json(body)
    }
}

impl ResponseError for PuritanError {
    fn status_code(&self) -> StatusCode {
        match self {
            PuritanError::RateLimit(_) => StatusCode::TOO_MANY_REQUESTS,
            PuritanError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            PuritanError::BadRequest(_) => StatusCode::BAD_REQUEST,
            PuritanError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.to_response(None, false)
    }
}

/// Standard error response format
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub timestamp: i64,
    pub request_id: Option<String>,
}
