//! Image classification boundary
//!
//! Model inference is an external collaborator. The server only sees the
//! [`Classifier`] trait, which turns a decoded RGB image into a list of
//! `(label, score)` pairs, and derives a [`Verdict`] from that list.

mod decode;
mod http;
mod types;

pub use decode::{decode_image, encode_png};
pub use http::HttpClassifier;
pub use types::{Detection, Prediction, UNSAFE_LABEL, UNSAFE_THRESHOLD, Verdict};

use crate::utils::error::Result;
use async_trait::async_trait;
use image::RgbImage;

/// External image classifier
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify one canonical RGB image
    async fn classify(&self, image: &RgbImage) -> Result<Vec<Prediction>>;

    /// How many calls may run at the same time.
    ///
    /// Classifiers are not assumed to be thread-safe, so the default allows a
    /// single in-flight call.
    fn max_concurrency(&self) -> usize {
        1
    }

    /// Name used in logs
    fn name(&self) -> &str {
        "classifier"
    }
}
