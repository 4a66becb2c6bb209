//! Time sources for the bucket registry.
//!
//! Buckets work on abstract ticks (see [`Uint`]); a [`Clock`] maps wall-clock
//! time onto ticks. One tick is one nanosecond since the clock's origin.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::types::{ticks_from_duration, Uint};

/// A source of monotonically non-decreasing ticks.
pub trait Clock: Send + Sync {
    /// Current tick, in nanoseconds since this clock's origin.
    fn now(&self) -> Uint;
}

/// Wall-clock time source backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Uint {
        ticks_from_duration(self.origin.elapsed())
    }
}

/// Manually driven clock for tests and simulations.
///
/// Clones share the same underlying time, so a test can hand one clone to a
/// registry and advance another.
///
/// ```rust
/// use std::time::Duration;
/// use rate_guard_keyed::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// handle.advance(Duration::from_millis(1500));
/// assert_eq!(clock.now(), 1_500_000_000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Uint>>,
}

impl ManualClock {
    /// Creates a clock starting at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = now.saturating_add(ticks_from_duration(by));
    }

    /// Jumps to an absolute tick. Moving backwards is allowed; buckets treat
    /// an earlier tick as zero elapsed time.
    pub fn set(&self, tick: Uint) {
        *self.now.lock() = tick;
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Uint {
        *self.now.lock()
    }
}
