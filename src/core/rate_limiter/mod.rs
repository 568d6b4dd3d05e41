//! Rate Limiting Implementation
//!
//! Per-client token bucket admission control with lazy refill

mod limiter;
mod types;


// Re-export public types
pub use limiter::TokenBucketLimiter;
pub use types::{Bucket, RateLimitResult};
