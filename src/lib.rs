//! Per-client request admission control built on token buckets.
//!
//! Each client key (typically the peer IP address as a string) gets its own
//! token bucket. A request is admitted when the client's bucket holds a token,
//! and rejected otherwise. The HTTP layer stays outside this crate: it extracts
//! the key, asks the registry for a decision, and answers 200 or 429.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use rate_guard_keyed::BucketRegistry;
//!
//! // 10 tokens per client, one token refilled per second
//! let registry: Arc<BucketRegistry> = Arc::new(BucketRegistry::default());
//!
//! if registry.allow_request("10.0.0.1") {
//!     println!("200 OK");
//! } else {
//!     println!("429 Too Many Requests");
//! }
//! ```
//!
//! # Components
//!
//! ## [Token Bucket](cores::TokenBucketCore)
//! One client's counter. Starts full at `capacity` tokens, regains one token per
//! whole `refill_interval`, and spends one token per admitted request:
//! ```rust
//! # use rate_guard_keyed::cores::TokenBucketCore;
//! let bucket = TokenBucketCore::new(10, 1_000_000_000, 0); // 10 tokens, 1 per second
//! assert!(bucket.allow_request_at(0));
//! ```
//!
//! ## [Registry](registry::BucketRegistry)
//! Concurrent key → bucket map. Creates a bucket on first sight of a key and
//! returns the same bucket afterwards, even under racing callers.
//!
//! ## [Sweeper](sweeper::spawn_sweeper)
//! Optional tokio task that evicts buckets idle for at least a full refill
//! (`capacity × refill_interval`), bounding memory under high client
//! cardinality. Shorter idle TTLs are rejected when the sweeper starts.
//!
//! # Core Concepts
//!
//! ## Time Representation
//! Buckets work on abstract ticks ([`Uint`]). The registry maps wall-clock time
//! onto ticks through a [`Clock`](clock::Clock); one tick is one nanosecond.
//! [`ManualClock`](clock::ManualClock) drives time by hand in tests.
//!
//! ## Error Handling
//! Admission never fails: [`BucketRegistry::allow_request`] returns a plain
//! `bool`, and [`BucketRegistry::check`] returns [`RateLimitExceeded`] with a
//! retry delay on denial. Configuration problems surface as [`ConfigError`]
//! when the registry is built.
//!
//! ## Thread Safety
//! The registry is a sharded concurrent map; each bucket has its own mutex.
//! Requests from different clients never contend on a shared lock.

pub mod clock;
pub mod config;
pub mod cores;
pub mod error;
pub mod registry;
pub mod sweeper;
pub mod types;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{load_config, parse_config, BucketConfig, EvictionConfig, LimiterConfig};
pub use cores::{RefillPolicy, TokenBucketCore};
pub use error::{ConfigError, ConfigResult, RateLimitExceeded, VerboseAcquireResult};
pub use registry::BucketRegistry;
pub use sweeper::{spawn_sweeper, Sweeper};
pub use types::Uint;
