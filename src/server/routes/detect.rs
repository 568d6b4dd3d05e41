//! Image detection endpoint

use crate::server::state::AppState;
use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, web};

/// `POST /v1/detect`
///
/// Accepts `multipart/form-data` with a `file` field and answers with
/// `{"file_name", "is_nsfw", "confidence_percentage"}`.
pub async fn detect(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: Multipart,
) -> HttpResponse {
    state.pipeline.handle(&req, payload).await
}
