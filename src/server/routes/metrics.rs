//! Prometheus scrape endpoint

use crate::server::state::AppState;
use actix_web::{HttpResponse, web};
use tracing::{debug, error};

/// `GET /metrics` in the Prometheus text exposition format
pub async fn metrics(state: web::Data<AppState>) -> HttpResponse {
    debug!("Metrics requested");

    state.metrics.set_limiter_keys(state.limiter.tracked_keys());

    match state.metrics.export_prometheus() {
        Ok(body) => HttpResponse::Ok()
            .content_type(state.metrics.content_type())
            .body(body),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            HttpResponse::InternalServerError().finish()
        }
    }
}
