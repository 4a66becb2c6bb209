//! Concurrent per-client bucket registry.
//!
//! Maps client keys to their [`TokenBucketCore`]. Buckets are created lazily on
//! first sight of a key and shared afterwards; the map is sharded so lookups
//! and inserts for unrelated keys do not block each other.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::clock::{Clock, MonotonicClock};
use crate::config::BucketConfig;
use crate::cores::{TokenBucketCore, TokenBucketCoreConfig};
use crate::error::{ConfigResult, VerboseAcquireResult};
use crate::types::{ticks_from_duration, Uint};

/// Owns one token bucket per client key.
///
/// Construct one registry at startup and share it (usually as
/// `Arc<BucketRegistry>`) with whatever builds the request layer. Entries
/// persist until removed by [`evict_idle`](Self::evict_idle).
///
/// # Example
///
/// ```rust
/// use rate_guard_keyed::config::BucketConfig;
/// use rate_guard_keyed::registry::BucketRegistry;
///
/// let registry = BucketRegistry::new(BucketConfig::default()).unwrap();
///
/// let admitted = (0..11).filter(|_| registry.allow_request("10.0.0.1")).count();
/// assert_eq!(admitted, 10);
///
/// // Another client has its own bucket
/// assert!(registry.allow_request("10.0.0.2"));
/// ```
#[derive(Debug)]
pub struct BucketRegistry<C: Clock = MonotonicClock> {
    buckets: DashMap<String, Arc<TokenBucketCore>>,
    config: BucketConfig,
    bucket_config: TokenBucketCoreConfig,
    clock: C,
}

impl BucketRegistry {
    /// Creates an empty registry on the monotonic wall clock.
    pub fn new(config: BucketConfig) -> ConfigResult<Self> {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl Default for BucketRegistry {
    fn default() -> Self {
        let config = BucketConfig::default();
        Self {
            buckets: DashMap::new(),
            bucket_config: TokenBucketCoreConfig::from(&config),
            config,
            clock: MonotonicClock::new(),
        }
    }
}

impl<C: Clock> BucketRegistry<C> {
    /// Creates an empty registry reading time from `clock`.
    pub fn with_clock(config: BucketConfig, clock: C) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            buckets: DashMap::new(),
            bucket_config: TokenBucketCoreConfig::from(&config),
            config,
            clock,
        })
    }

    /// Returns the bucket for `key`, creating a full one if the key is new.
    ///
    /// Concurrent callers racing on a new key all receive the same instance:
    /// creation happens inside the map's insert-if-absent entry, never as a
    /// separate check followed by an insert.
    pub fn get_token_bucket(&self, key: &str) -> Arc<TokenBucketCore> {
        if let Some(bucket) = self.buckets.get(key) {
            return Arc::clone(bucket.value());
        }

        let bucket = self.buckets.entry(key.to_owned()).or_insert_with(|| {
            let now = self.clock.now();
            debug!(key, capacity = self.bucket_config.capacity, "Creating bucket");
            Arc::new(self.bucket_config.build_at(now))
        });
        Arc::clone(bucket.value())
    }

    /// Admission decision for one request from `key`.
    #[inline]
    pub fn allow_request(&self, key: &str) -> bool {
        self.check(key).is_ok()
    }

    /// Admission decision for one request from `key`, with remaining tokens
    /// on success or the retry delay on denial.
    pub fn check(&self, key: &str) -> VerboseAcquireResult {
        let bucket = self.get_token_bucket(key);
        let result = bucket.try_acquire_verbose_at(self.clock.now());
        if let Err(denied) = &result {
            trace!(key, retry_after = ?denied.retry_after(), "Request denied");
        }
        result
    }

    /// Removes buckets idle for at least `idle_ttl` that no caller is using.
    ///
    /// `idle_ttl` is raised to one full refill (`capacity × refill_interval`)
    /// when shorter, so a bucket is only dropped once it would be full again.
    ///
    /// A bucket counts as in use while any handle from
    /// [`get_token_bucket`](Self::get_token_bucket) is alive; the count is read
    /// under the shard's write lock, so no new handle can appear mid-check.
    /// Returns the number of buckets removed.
    pub fn evict_idle(&self, idle_ttl: Duration) -> usize {
        let now = self.clock.now();
        let full_refill = self
            .bucket_config
            .refill_interval
            .saturating_mul(self.bucket_config.capacity);
        let ttl: Uint = ticks_from_duration(idle_ttl).max(full_refill);
        let mut evicted = 0;

        self.buckets.retain(|_, bucket| {
            let idle = now.saturating_sub(bucket.last_updated());
            let keep = idle < ttl || Arc::strong_count(bucket) > 1;
            if !keep {
                evicted += 1;
            }
            keep
        });

        evicted
    }

    /// Number of client keys currently tracked.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.buckets.contains_key(key)
    }

    pub fn config(&self) -> &BucketConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
