//! HTTP middleware implementations
//!
//! Request tracing is handled by `tracing-actix-web`; this module only adds
//! the per-request identifier that the detect pipeline logs and echoes back.

mod request_id;


pub use request_id::{
    REQUEST_ID_HEADER, RequestId, RequestIdMiddleware, RequestIdMiddlewareService, request_id,
};
