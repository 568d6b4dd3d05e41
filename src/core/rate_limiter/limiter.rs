//! Core rate limiter implementation

use super::types::{Bucket, RateLimitResult};
use crate::config::LimiterConfig;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::time::Instant;
use tracing::{debug, info};

/// Token bucket rate limiter keyed by client identity.
///
/// Each key owns one [`Bucket`]. Buckets are refilled lazily on access, so
/// there is no background task. A key's bucket is only mutated while its map
/// entry is locked; requests for other keys lock other shards. Buckets are
/// never evicted.
pub struct TokenBucketLimiter {
    /// Active settings and the configuration version they came from
    settings: RwLock<(u64, LimiterConfig)>,
    /// Bucket per client key
    buckets: DashMap<String, Bucket>,
}

impl TokenBucketLimiter {
    /// Create a new rate limiter
    pub fn new(config: LimiterConfig) -> Self {
        Self {
            settings: RwLock::new((0, config)),
            buckets: DashMap::new(),
        }
    }

    /// Admit or deny one request for `key` at `now`
    pub fn allow(&self, key: &str, now: Instant) -> bool {
        self.acquire(key, now).allowed
    }

    /// Atomically refill the bucket for `key` and try to take one token
    pub fn acquire(&self, key: &str, now: Instant) -> RateLimitResult {
        let (rate, burst) = {
            let settings = self.settings.read();
            (settings.1.rate_per_second, settings.1.burst_capacity)
        };
        let capacity = f64::from(burst);

        // Avoid String allocation if key already exists
        let mut entry = if let Some(e) = self.buckets.get_mut(key) {
            e
        } else {
            self.buckets
                .entry(key.to_string())
                .or_insert_with(|| Bucket::full(capacity, now))
        };
        let bucket = entry.value_mut();

        bucket.refill(now, rate, capacity);
        let allowed = bucket.try_take();
        let tokens = bucket.tokens;
        drop(entry);

        let retry_after_secs = if allowed {
            None
        } else {
            debug!(key, tokens, "Rate limit exceeded");
            Some((((1.0 - tokens) / rate).ceil() as u64).max(1))
        };

        RateLimitResult {
            allowed,
            limit: burst,
            remaining: tokens.max(0.0) as u32,
            retry_after_secs,
        }
    }

    /// Adopt the limiter settings of a configuration snapshot.
    ///
    /// Settings only change when `version` differs from the one last applied.
    /// Existing buckets keep their tokens; a lower capacity takes effect at
    /// their next refill.
    pub fn apply(&self, version: u64, config: &LimiterConfig) {
        if self.settings.read().0 == version {
            return;
        }

        let mut settings = self.settings.write();
        if settings.0 != version {
            if settings.1.rate_per_second != config.rate_per_second
                || settings.1.burst_capacity != config.burst_capacity
            {
                info!(
                    version,
                    rate_per_second = config.rate_per_second,
                    burst_capacity = config.burst_capacity,
                    "Rate limiter reconfigured"
                );
            }
            *settings = (version, config.clone());
        }
    }

    /// Current limiter settings
    pub fn config(&self) -> LimiterConfig {
        self.settings.read().1.clone()
    }

    /// Number of keys with a bucket
    pub fn tracked_keys(&self) -> usize {
        self.buckets.len()
    }

    /// Snapshot of one key's bucket
    pub fn bucket(&self, key: &str) -> Option<Bucket> {
        self.buckets.get(key).map(|b| *b.value())
    }
}

impl std::fmt::Debug for TokenBucketLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBucketLimiter")
            .field("config", &self.config())
            .field("tracked_keys", &self.tracked_keys())
            .finish()
    }
}
