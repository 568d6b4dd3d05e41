//! Logging utilities
//!
//! This module wires `tracing-subscriber` for the server and the CLI tools.

pub mod logging;

pub use logging::*;
