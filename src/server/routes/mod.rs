//! HTTP route modules

pub mod detect;
pub mod health;
pub mod metrics;

use actix_web::web;

/// Register every PixelPuritan route
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/metrics", web::get().to(metrics::metrics))
        .service(web::scope("/v1").route("/detect", web::post().to(detect::detect)));
}
