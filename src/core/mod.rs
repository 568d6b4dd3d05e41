//! Core functionality for PixelPuritan
//!
//! Admission control, the classifier boundary and request metrics. Nothing in
//! here knows about HTTP routing; the server module wires these together.

pub mod classifier;
pub mod observability;
pub mod rate_limiter;
