use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::BucketConfig;
use crate::error::{RateLimitExceeded, VerboseAcquireResult};
use crate::types::Uint;

/// How a bucket treats progress toward the next token that falls short of a
/// whole refill interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefillPolicy {
    /// Every check moves `last_updated` to the current tick, so any partial
    /// interval is dropped. Long-run throughput under bursty access sits
    /// slightly below the nominal rate.
    #[default]
    Truncate,
    /// `last_updated` advances in whole intervals only, so partial progress
    /// carries over to the next check. Resets to the current tick once the
    /// bucket is full.
    Carry,
}

/// Single-client token bucket with lazy refill.
///
/// The bucket starts full. Each admission check first credits one token per
/// whole `refill_interval` elapsed since the last check (never beyond
/// `capacity`), then consumes one token if any is left.
///
/// All state lives behind one mutex owned by this bucket, so concurrent checks
/// on the same bucket are serialized while checks on different buckets never
/// contend. Checks block on the lock rather than failing; the critical section
/// is a handful of integer operations.
///
/// # Example
///
/// ```rust
/// use rate_guard_keyed::cores::TokenBucketCore;
///
/// // 10 tokens, one token per 1_000 ticks, created at tick 0
/// let bucket = TokenBucketCore::new(10, 1_000, 0);
///
/// for _ in 0..10 {
///     assert!(bucket.allow_request_at(0));
/// }
/// assert!(!bucket.allow_request_at(0));
///
/// // One interval later a single token is back
/// assert!(bucket.allow_request_at(1_000));
/// assert!(!bucket.allow_request_at(1_000));
/// ```
#[derive(Debug)]
pub struct TokenBucketCore {
    /// Maximum number of tokens the bucket can hold
    capacity: Uint,
    /// Number of ticks needed to accrue one token
    refill_interval: Uint,
    refill_policy: RefillPolicy,
    /// Internal state protected by mutex for thread safety
    state: Mutex<TokenBucketCoreState>,
}

#[derive(Debug)]
struct TokenBucketCoreState {
    /// Current number of tokens available in the bucket
    available: Uint,
    /// Tick of the last refill computation
    last_updated: Uint,
}

impl TokenBucketCore {
    /// Creates a full bucket whose refill clock starts at `tick`, using
    /// [`RefillPolicy::Truncate`].
    ///
    /// # Panics
    ///
    /// Panics if `capacity` or `refill_interval` is zero.
    pub fn new(capacity: Uint, refill_interval: Uint, tick: Uint) -> Self {
        Self::with_policy(capacity, refill_interval, RefillPolicy::Truncate, tick)
    }

    /// Creates a full bucket with an explicit refill policy.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` or `refill_interval` is zero.
    pub fn with_policy(
        capacity: Uint,
        refill_interval: Uint,
        refill_policy: RefillPolicy,
        tick: Uint,
    ) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        assert!(refill_interval > 0, "refill_interval must be greater than 0");

        TokenBucketCore {
            capacity,
            refill_interval,
            refill_policy,
            state: Mutex::new(TokenBucketCoreState {
                available: capacity,
                last_updated: tick,
            }),
        }
    }

    /// Decides whether one request is admitted at `tick`.
    ///
    /// Returns `true` and consumes a token if one is available after refill,
    /// `false` otherwise. A `tick` earlier than the last check counts as zero
    /// elapsed time.
    #[inline]
    pub fn allow_request_at(&self, tick: Uint) -> bool {
        self.try_acquire_verbose_at(tick).is_ok()
    }

    /// Same decision as [`allow_request_at`](Self::allow_request_at), with
    /// details for the caller.
    ///
    /// # Returns
    /// * `Ok(remaining)` – admitted; `remaining` tokens are left afterwards
    /// * `Err(RateLimitExceeded)` – denied; carries the ticks until the next
    ///   token accrues
    ///
    /// # Example
    /// ```
    /// use rate_guard_keyed::cores::TokenBucketCore;
    ///
    /// let bucket = TokenBucketCore::new(1, 100, 0);
    /// assert_eq!(bucket.try_acquire_verbose_at(0), Ok(0));
    ///
    /// let denied = bucket.try_acquire_verbose_at(0).unwrap_err();
    /// assert_eq!(denied.retry_after_ticks, 100);
    /// ```
    pub fn try_acquire_verbose_at(&self, tick: Uint) -> VerboseAcquireResult {
        let mut state = self.state.lock();
        self.refill(&mut state, tick);

        if state.available > 0 {
            state.available -= 1;
            Ok(state.available)
        } else {
            let next_token_at = state.last_updated.saturating_add(self.refill_interval);
            Err(RateLimitExceeded {
                capacity: self.capacity,
                retry_after_ticks: next_token_at.saturating_sub(tick),
            })
        }
    }

    /// Credits whole elapsed intervals and moves `last_updated` forward.
    #[inline(always)]
    fn refill(&self, state: &mut TokenBucketCoreState, tick: Uint) {
        // An earlier tick is treated as no time passing; last_updated never moves back.
        if tick <= state.last_updated {
            return;
        }

        let elapsed = tick - state.last_updated;
        let intervals = elapsed / self.refill_interval;
        let refilled = state.available.saturating_add(intervals);

        state.last_updated = match self.refill_policy {
            RefillPolicy::Truncate => tick,
            RefillPolicy::Carry if refilled >= self.capacity => tick,
            RefillPolicy::Carry => state.last_updated + intervals * self.refill_interval,
        };
        state.available = refilled.min(self.capacity);
    }

    /// Tokens currently held, without applying any refill.
    #[inline]
    pub fn current_capacity(&self) -> Uint {
        self.state.lock().available
    }

    /// Tick of the last refill computation.
    #[inline]
    pub fn last_updated(&self) -> Uint {
        self.state.lock().last_updated
    }

    #[inline]
    pub fn capacity(&self) -> Uint {
        self.capacity
    }

    #[inline]
    pub fn refill_interval(&self) -> Uint {
        self.refill_interval
    }

    #[inline]
    pub fn refill_policy(&self) -> RefillPolicy {
        self.refill_policy
    }
}

/// Configuration structure for creating a `TokenBucketCore`, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBucketCoreConfig {
    /// Maximum number of tokens the bucket can hold.
    pub capacity: Uint,
    /// Number of ticks needed to accrue one token.
    pub refill_interval: Uint,
    pub refill_policy: RefillPolicy,
}

impl TokenBucketCoreConfig {
    pub fn new(capacity: Uint, refill_interval: Uint) -> Self {
        Self {
            capacity,
            refill_interval,
            refill_policy: RefillPolicy::default(),
        }
    }

    /// Builds a full bucket whose refill clock starts at `tick`.
    ///
    /// # Panics
    /// Panics if `capacity` or `refill_interval` is zero. Validated
    /// configuration ([`BucketConfig::validate`])
    /// never produces such values.
    #[inline]
    pub fn build_at(&self, tick: Uint) -> TokenBucketCore {
        TokenBucketCore::with_policy(self.capacity, self.refill_interval, self.refill_policy, tick)
    }
}

impl From<&BucketConfig> for TokenBucketCoreConfig {
    fn from(config: &BucketConfig) -> Self {
        Self {
            capacity: config.capacity,
            refill_interval: config.refill_interval_ticks(),
            refill_policy: config.refill_policy,
        }
    }
}
