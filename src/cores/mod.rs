//! Per-client bucket state machine.
//!
//! A core is the thread-safe, single-key building block; the
//! [`BucketRegistry`](crate::registry::BucketRegistry) owns one core per
//! client key.
//!
//! - **[`TokenBucketCore`]** - bursts up to capacity, one token per refill interval
//!
//! # Thread Safety
//!
//! Each core guards its counters with its own mutex. Checks on one core are
//! serialized; checks on different cores never share a lock.

pub mod token_bucket_core;
pub use token_bucket_core::RefillPolicy;
pub use token_bucket_core::TokenBucketCore;
pub use token_bucket_core::TokenBucketCoreConfig;
