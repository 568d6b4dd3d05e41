//! Common test utilities for pixelpuritan
//!
//! - Image fixtures and data factories
//! - A classifier whose score is read from the image itself
//! - An in-process detect server bound to an ephemeral port

pub mod fixtures;
pub mod server;

pub use fixtures::{ImageTree, png_bytes, red_png};
pub use server::{PixelClassifier, TestServer};
