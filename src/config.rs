//! Limiter configuration.
//!
//! Supports TOML configuration with:
//! - Bucket shape (capacity, refill interval, refill policy)
//! - Optional idle-bucket eviction
//! - Validation with clear error messages
//!
//! Durations are written as whole milliseconds (`*_ms` keys); validation
//! rejects finer values so a config always serializes back unchanged.
//!
//! Every field has a default, so an empty document yields a limiter with
//! 10 tokens per client refilled at one token per second and no eviction.
//!
//! ```rust
//! use std::time::Duration;
//! use rate_guard_keyed::config::parse_config;
//!
//! let config = parse_config(r#"
//!     [bucket]
//!     capacity = 20
//!     refill_interval_ms = 500
//!
//!     [eviction]
//!     idle_ttl_ms = 600000
//!     sweep_interval_ms = 60000
//! "#).unwrap();
//!
//! assert_eq!(config.bucket.capacity, 20);
//! assert_eq!(config.bucket.refill_interval, Duration::from_millis(500));
//! assert!(config.eviction.is_some());
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cores::RefillPolicy;
use crate::error::{ConfigError, ConfigResult};
use crate::types::{duration_from_ticks, ticks_from_duration, Uint};

/// Default maximum tokens per client.
pub const DEFAULT_CAPACITY: Uint = 10;

/// Default time to accrue one token.
pub const DEFAULT_REFILL_INTERVAL: Duration = Duration::from_secs(1);

/// Shape of every bucket the registry creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BucketConfig {
    /// Maximum number of tokens a bucket can hold (burst size).
    pub capacity: Uint,
    /// Time needed to accrue one token, in whole milliseconds.
    #[serde(rename = "refill_interval_ms", with = "millis")]
    pub refill_interval: Duration,
    /// How partial progress toward the next token is treated.
    pub refill_policy: RefillPolicy,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            refill_interval: DEFAULT_REFILL_INTERVAL,
            refill_policy: RefillPolicy::default(),
        }
    }
}

impl BucketConfig {
    /// Creates a configuration with the default refill policy.
    pub fn new(capacity: Uint, refill_interval: Duration) -> Self {
        Self {
            capacity,
            refill_interval,
            refill_policy: RefillPolicy::default(),
        }
    }

    pub fn with_refill_policy(mut self, refill_policy: RefillPolicy) -> Self {
        self.refill_policy = refill_policy;
        self
    }

    /// Refill interval expressed in clock ticks.
    #[inline]
    pub fn refill_interval_ticks(&self) -> Uint {
        ticks_from_duration(self.refill_interval)
    }

    /// Time for an empty bucket to fill up again.
    pub fn full_refill(&self) -> Duration {
        duration_from_ticks(self.refill_interval_ticks().saturating_mul(self.capacity))
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.refill_interval_ticks() == 0 {
            return Err(ConfigError::ZeroRefillInterval);
        }
        whole_millis("refill_interval", self.refill_interval)
    }
}

/// Default idle time after which a bucket may be evicted.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(600);

/// Default period of the background eviction sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Idle-bucket eviction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvictionConfig {
    /// A bucket untouched for at least this long is eligible for removal.
    #[serde(rename = "idle_ttl_ms", with = "millis")]
    pub idle_ttl: Duration,
    /// How often the sweeper scans the registry.
    #[serde(rename = "sweep_interval_ms", with = "millis")]
    pub sweep_interval: Duration,
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self {
            idle_ttl: DEFAULT_IDLE_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl EvictionConfig {
    pub fn new(idle_ttl: Duration, sweep_interval: Duration) -> Self {
        Self {
            idle_ttl,
            sweep_interval,
        }
    }

    /// Checks the settings against the bucket shape they will sweep.
    ///
    /// The idle TTL must cover a full refill so that an evicted bucket is
    /// indistinguishable from the full bucket that replaces it.
    pub fn validate(&self, bucket: &BucketConfig) -> ConfigResult<()> {
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::ZeroSweepInterval);
        }
        whole_millis("idle_ttl", self.idle_ttl)?;
        whole_millis("sweep_interval", self.sweep_interval)?;
        let full_refill = bucket.full_refill();
        if self.idle_ttl < full_refill {
            return Err(ConfigError::IdleTtlTooShort {
                idle_ttl: self.idle_ttl,
                full_refill,
            });
        }
        Ok(())
    }
}

/// Top-level limiter configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimiterConfig {
    pub bucket: BucketConfig,
    /// Eviction is disabled when absent.
    pub eviction: Option<EvictionConfig>,
}

impl LimiterConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        self.bucket.validate()?;
        if let Some(eviction) = &self.eviction {
            eviction.validate(&self.bucket)?;
        }
        Ok(())
    }
}

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<LimiterConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<LimiterConfig> {
    let config: LimiterConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Rejects durations the millisecond-based config format cannot represent.
fn whole_millis(field: &'static str, value: Duration) -> ConfigResult<()> {
    if value.subsec_nanos() % 1_000_000 != 0 {
        return Err(ConfigError::SubMillisecondPrecision { field, value });
    }
    Ok(())
}

/// (De)serializes a [`Duration`] as whole milliseconds.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = LimiterConfig::default();
        assert_eq!(config.bucket.capacity, 10);
        assert_eq!(config.bucket.refill_interval, Duration::from_secs(1));
        assert_eq!(config.bucket.refill_policy, RefillPolicy::Truncate);
        assert!(config.eviction.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn full_refill_is_capacity_intervals() {
        let bucket = BucketConfig::new(10, Duration::from_millis(250));
        assert_eq!(bucket.full_refill(), Duration::from_millis(2500));
    }

    #[test]
    fn zero_refill_interval_is_rejected() {
        let bucket = BucketConfig::new(10, Duration::ZERO);
        assert!(matches!(bucket.validate(), Err(ConfigError::ZeroRefillInterval)));
    }
}
