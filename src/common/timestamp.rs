//! Timestamp units and the time source used during evaluation.
//!
//! Event timestamps and `AFTER` durations share one unit: `i64` microseconds
//! (timestamps are measured from the Unix epoch). Keeping a single unit means
//! a threshold can be shifted by a duration with one saturating addition.

use chrono::Utc;

/// Microseconds since the Unix epoch.
pub type Timestamp = i64;

/// Microseconds per millisecond.
pub const MICROS_PER_MILLI: i64 = 1_000;

/// Microseconds per second.
pub const MICROS_PER_SECOND: i64 = 1_000_000;

/// Microseconds per minute (`60 * 1_000_000`).
pub const MICROS_PER_MINUTE: i64 = 60_000_000;

/// Microseconds per hour (`60 * 60 * 1_000_000`).
pub const MICROS_PER_HOUR: i64 = 3_600_000_000;

/// Microseconds per day (`24 * 60 * 60 * 1_000_000`).
pub const MICROS_PER_DAY: i64 = 86_400_000_000;

/// Returns true if `ts` is at or past `threshold`.
///
/// A `None` threshold is the "no constraint" minimum, which every timestamp
/// clears.
#[must_use]
#[inline]
pub fn at_or_after(ts: Timestamp, threshold: Option<Timestamp>) -> bool {
    threshold.is_none_or(|t| ts >= t)
}

/// Source of the current instant.
///
/// The matcher consults the clock only when an event name does not occur at
/// all, to decide whether enough real time has passed for the absence to
/// count. Implementations must read the instant on every call.
pub trait Clock {
    /// Returns the current instant in microseconds since the Unix epoch.
    fn now_us(&self) -> Timestamp;
}

/// Wall-clock time via [`chrono::Utc::now`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_us(&self) -> Timestamp {
        Utc::now().timestamp_micros()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now_us(&self) -> Timestamp {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_us(&self) -> Timestamp {
        (**self).now_us()
    }
}
