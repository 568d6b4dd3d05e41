//! Admission and classification pipeline for `POST /v1/detect`
//!
//! Each request passes through a fixed sequence of checks:
//!
//! 1. resolve the client key (peer IP)
//! 2. rate-limit gate
//! 3. API key check, when one is configured
//! 4. upload extraction with the payload ceiling
//! 5. decode and validation
//! 6. classifier invocation under the inference gate
//! 7. verdict extraction
//!
//! A rejection at any step short-circuits the rest. The multipart body is
//! read lazily, so rate-limited and unauthorized requests never have their
//! upload consumed.

use crate::config::{ConfigProvider, ConfigSnapshot};
use crate::core::classifier::{Classifier, Detection, Verdict, decode_image};
use crate::core::observability::MetricsCollector;
use crate::core::rate_limiter::TokenBucketLimiter;
use crate::server::middleware::request_id;
use crate::utils::error::{PuritanError, Result};
use actix_multipart::Multipart;
use actix_web::http::header::{HeaderValue, RETRY_AFTER};
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use futures::{FutureExt, StreamExt};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Header carrying the client credential
pub const API_KEY_HEADER: &str = "x-api-key";

/// Multipart field holding the uploaded image
pub const FILE_FIELD: &str = "file";

/// Key used when the peer address is unavailable
pub const UNKNOWN_CLIENT: &str = "unknown";

/// A request that failed admission
#[derive(Debug)]
pub struct Rejection {
    pub error: PuritanError,
    /// Seconds until the client's bucket holds a token again
    pub retry_after_secs: Option<u64>,
}

impl From<PuritanError> for Rejection {
    fn from(error: PuritanError) -> Self {
        Self {
            error,
            retry_after_secs: None,
        }
    }
}

/// An extracted upload
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Orders validation, auth, rate limiting and inference around one request
pub struct RequestPipeline {
    config: Arc<ConfigProvider>,
    limiter: Arc<TokenBucketLimiter>,
    metrics: MetricsCollector,
    classifier: Arc<dyn Classifier>,
    inference_gate: Semaphore,
}

impl RequestPipeline {
    pub fn new(
        config: Arc<ConfigProvider>,
        limiter: Arc<TokenBucketLimiter>,
        metrics: MetricsCollector,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        let permits = classifier.max_concurrency().max(1);
        Self {
            config,
            limiter,
            metrics,
            classifier,
            inference_gate: Semaphore::new(permits),
        }
    }

    /// Rate-limit and authenticate a client.
    ///
    /// Fetches the configuration snapshot for this request and pushes any
    /// new limiter settings into the limiter before consuming a token.
    pub fn admit(
        &self,
        client_key: &str,
        api_key: Option<&str>,
        now: Instant,
    ) -> std::result::Result<Arc<ConfigSnapshot>, Rejection> {
        let snapshot = self.config.snapshot();
        let limiter_config = &snapshot.config.limiter;
        self.limiter.apply(snapshot.version, limiter_config);

        let decision = self.limiter.acquire(client_key, now);
        if !decision.allowed {
            return Err(Rejection {
                error: PuritanError::rate_limit(format!(
                    "client {} exceeded {} requests per second",
                    client_key, limiter_config.rate_per_second
                )),
                retry_after_secs: decision.retry_after_secs,
            });
        }

        if let Some(expected) = limiter_config.api_key.as_deref() {
            if api_key != Some(expected) {
                return Err(PuritanError::unauthorized("Invalid or missing API key").into());
            }
        }

        Ok(snapshot)
    }

    /// Pull the `file` field out of a multipart body, enforcing `max_bytes`.
    ///
    /// Reading stops as soon as the ceiling is crossed, before anything is
    /// decoded.
    pub async fn read_upload(&self, mut payload: Multipart, max_bytes: usize) -> Result<Upload> {
        let mut upload: Option<Upload> = None;

        while let Some(item) = payload.next().await {
            let mut field = item
                .map_err(|e| PuritanError::bad_request(format!("Invalid multipart data: {}", e)))?;

            if field.name() != Some(FILE_FIELD) || upload.is_some() {
                while field.next().await.is_some() {}
                continue;
            }

            let file_name = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .unwrap_or_default()
                .to_string();

            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk
                    .map_err(|e| PuritanError::bad_request(format!("Error reading file: {}", e)))?;
                if bytes.len() + chunk.len() > max_bytes {
                    return Err(PuritanError::payload_too_large(format!(
                        "upload exceeds the {} byte limit",
                        max_bytes
                    )));
                }
                bytes.extend_from_slice(&chunk);
            }

            upload = Some(Upload { file_name, bytes });
        }

        match upload {
            Some(upload) if !upload.bytes.is_empty() => Ok(upload),
            _ => Err(PuritanError::bad_request("No file provided")),
        }
    }

    /// Decode, classify and turn the predictions into a detection
    pub async fn classify(&self, upload: Upload) -> Result<Detection> {
        let Upload { file_name, bytes } = upload;

        let image = tokio::task::spawn_blocking(move || decode_image(&bytes))
            .await
            .map_err(|e| PuritanError::internal(format!("decode task failed: {}", e)))??;

        let _permit = self
            .inference_gate
            .acquire()
            .await
            .map_err(|_| PuritanError::internal("inference gate closed"))?;

        let started = Instant::now();
        let predictions = AssertUnwindSafe(self.classifier.classify(&image))
            .catch_unwind()
            .await;
        self.metrics.record_inference(started.elapsed());

        let predictions = predictions.map_err(|panic| {
            PuritanError::internal(format!(
                "classifier {} panicked: {}",
                self.classifier.name(),
                panic_message(panic.as_ref())
            ))
        })??;
        let verdict = Verdict::from_predictions(&predictions);
        Ok(Detection::new(file_name, verdict))
    }

    /// Run the whole pipeline for one request and build the response.
    ///
    /// The status counter is incremented exactly once for every outcome.
    pub async fn handle(&self, req: &HttpRequest, payload: Multipart) -> HttpResponse {
        let started = Instant::now();
        let request_id = request_id(req).unwrap_or_else(crate::utils::generate_request_id);
        let client = client_key(req);
        let api_key = req
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok());

        let snapshot = match self.admit(&client, api_key, Instant::now()) {
            Ok(snapshot) => snapshot,
            Err(rejection) => return self.reject(rejection, &request_id, &client),
        };

        let server = &snapshot.config.server;
        let outcome = match self.read_upload(payload, server.max_upload_bytes).await {
            Ok(upload) => self.classify(upload).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(detection) => {
                self.metrics.record_status(200);
                info!(
                    request_id = %request_id,
                    client = %client,
                    file_name = %detection.file_name,
                    is_nsfw = detection.is_nsfw,
                    confidence = detection.confidence_percentage,
                    latency_ms = started.elapsed().as_millis() as u64,
                    "Image classified"
                );
                HttpResponse::Ok().json(detection)
            }
            Err(e) => {
                let status = e.status_code();
                self.metrics.record_status(status.as_u16());
                if status.is_server_error() {
                    error!(request_id = %request_id, client = %client, error = %e, "Detection failed");
                } else {
                    warn!(request_id = %request_id, client = %client, error = %e, "Upload rejected");
                }
                e.to_response(Some(&request_id), server.expose_error_details)
            }
        }
    }

    fn reject(&self, rejection: Rejection, request_id: &str, client: &str) -> HttpResponse {
        let status = rejection.error.status_code();
        self.metrics.record_status(status.as_u16());
        warn!(
            request_id = %request_id,
            client = %client,
            status = status.as_u16(),
            "Request rejected: {}",
            rejection.error
        );

        let mut response = rejection.error.to_response(Some(request_id), false);
        if let Some(secs) = rejection.retry_after_secs {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub fn limiter(&self) -> &TokenBucketLimiter {
        &self.limiter
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("classifier", &self.classifier.name())
            .field("inference_permits", &self.inference_gate.available_permits())
            .field("limiter", &self.limiter)
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Rate-limit key for a request: the peer IP address
pub fn client_key(req: &HttpRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
