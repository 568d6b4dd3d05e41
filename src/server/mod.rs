//! HTTP server implementation
//!
//! This module provides the detect endpoint, its admission pipeline and the
//! scrape and health routes.

pub mod middleware;
pub mod routes;

pub mod builder;
pub mod pipeline;
pub mod server;
pub mod state;


pub use builder::{ServerBuilder, run_server};
pub use pipeline::{Rejection, RequestPipeline, Upload};
pub use server::HttpServer;
pub use state::AppState;
