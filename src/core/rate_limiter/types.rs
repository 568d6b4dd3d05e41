//! Rate limiter types and data structures

use std::time::Instant;

/// Rate limit result
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Burst capacity in effect
    pub limit: u32,
    /// Whole tokens left after this decision
    pub remaining: u32,
    /// Retry after (in seconds, only set when not allowed)
    pub retry_after_secs: Option<u64>,
}

/// Token bucket state for one client key.
///
/// `0 <= tokens <= burst_capacity` holds at every observation point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    /// Tokens currently available
    pub tokens: f64,
    /// Time of the last refill computation
    pub last_refill: Instant,
}

impl Bucket {
    /// A bucket seen for the first time starts full
    pub fn full(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_refill: now,
        }
    }

    /// Add the tokens earned since the last refill, capped at `capacity`.
    ///
    /// A `now` earlier than `last_refill` earns nothing and does not move the
    /// refill point backwards.
    pub fn refill(&mut self, now: Instant, rate_per_second: f64, capacity: f64) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        self.tokens = (self.tokens + elapsed.as_secs_f64() * rate_per_second).min(capacity);
        if now > self.last_refill {
            self.last_refill = now;
        }
    }

    /// Take one token if available
    pub fn try_take(&mut self) -> bool {
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
