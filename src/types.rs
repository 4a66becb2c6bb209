//! Unsigned integer type alias for bucket capacities and clock ticks.
//!
//! This module defines `Uint` as the integer type used for all token counts
//! and time ticks. One tick is one nanosecond of the registry's [`Clock`].
//! The actual type is determined at compile time via feature flags.
//!
//! # Features
//! - `tick-u64` (default): uses [`u64`] as `Uint`
//! - `tick-u128`: uses [`u128`] as `Uint`
//!   (Both features cannot be enabled at the same time.)
//! - If neither feature is enabled, `u64` is used as the default type.
//!
//! [`Clock`]: crate::clock::Clock

use std::time::Duration;

/// Alias for the unsigned integer type used for capacities and ticks.
///
/// The type is selected at compile time using feature flags:
/// - **`tick-u64`** (default): uses [`u64`]
/// - **`tick-u128`**: uses [`u128`]
///
/// > **Note:** Enabling both `tick-u64` and `tick-u128` at the same time
///   will result in a compile error. If neither is enabled, [`u64`] is used.
#[cfg(all(feature = "tick-u64", feature = "tick-u128"))]
compile_error!("You cannot enable both `tick-u64` and `tick-u128` features at the same time");

#[cfg(all(feature = "tick-u64", not(feature = "tick-u128")))]
pub type Uint = u64;

#[cfg(all(feature = "tick-u128", not(feature = "tick-u64")))]
pub type Uint = u128;

#[cfg(not(any(feature = "tick-u64", feature = "tick-u128")))]
pub type Uint = u64;

/// Converts a wall-clock duration into ticks, saturating at `Uint::MAX`.
#[inline]
pub fn ticks_from_duration(duration: Duration) -> Uint {
    Uint::try_from(duration.as_nanos()).unwrap_or(Uint::MAX)
}

/// Converts ticks back into a wall-clock duration, saturating at `u64::MAX` nanoseconds.
#[inline]
pub fn duration_from_ticks(ticks: Uint) -> Duration {
    Duration::from_nanos(u64::try_from(ticks).unwrap_or(u64::MAX))
}
