//! error.rs
//! Defines the configuration error and the verbose denial returned by admission checks.

use std::time::Duration;

use thiserror::Error;

use crate::types::{duration_from_ticks, Uint};

/// Error raised while loading or validating limiter configuration.
///
/// Admission checks themselves never fail; this is a startup-time error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("capacity must be greater than 0")]
    ZeroCapacity,

    #[error("refill_interval must be greater than 0")]
    ZeroRefillInterval,

    #[error("sweep_interval must be greater than 0")]
    ZeroSweepInterval,

    /// Durations are stored in the config format as whole milliseconds.
    #[error("{field} {value:?} is not a whole number of milliseconds")]
    SubMillisecondPrecision {
        field: &'static str,
        value: Duration,
    },

    /// Idle TTL must be at least `capacity × refill_interval`.
    #[error("idle_ttl {idle_ttl:?} is shorter than a full refill ({full_refill:?})")]
    IdleTtlTooShort {
        idle_ttl: Duration,
        full_refill: Duration,
    },
}

/// Result type for configuration loading and validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Verbose denial: the bucket had no token for this request.
///
/// Carries enough information for a collaborator to set a `Retry-After`
/// header on its 429 response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Rate limit exceeded: capacity {capacity}, retry after {retry_after_ticks} tick(s).")]
pub struct RateLimitExceeded {
    /// Burst capacity of the bucket that denied the request.
    pub capacity: Uint,
    /// Ticks until the next token becomes available.
    pub retry_after_ticks: Uint,
}

impl RateLimitExceeded {
    /// Wait until the next token, as a wall-clock duration.
    pub fn retry_after(&self) -> Duration {
        duration_from_ticks(self.retry_after_ticks)
    }
}

/// Result type for verbose admission checks.
///
/// `Ok` carries the tokens left in the bucket after the request was admitted.
pub type VerboseAcquireResult = Result<Uint, RateLimitExceeded>;
