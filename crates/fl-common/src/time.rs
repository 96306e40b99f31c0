// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Time utilities for the FieldLink framework
//!
//! This module provides time-related types for embedded systems: a monotonic
//! tick counter, millisecond durations, and the bounded-wait timeout used by
//! every blocking operation in the framework.

use core::ops::{Add, Sub};

use crate::constants::TICK_RATE_HZ;

/// System tick counter (platform-specific resolution)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ticks(u64);

impl Ticks {
    /// Tick zero (boot)
    pub const ZERO: Ticks = Ticks(0);

    /// Create from raw tick count
    #[must_use]
    pub const fn new(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Get the raw tick count
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Calculate elapsed ticks since this timestamp
    #[must_use]
    pub const fn elapsed(&self, now: Self) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// Check if duration has elapsed since this timestamp
    #[must_use]
    pub const fn has_elapsed(&self, now: Self, duration: u64) -> bool {
        self.elapsed(now) >= duration
    }
}

impl From<u64> for Ticks {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Ticks> for u64 {
    fn from(value: Ticks) -> Self {
        value.0
    }
}

impl Add<u64> for Ticks {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0.saturating_add(rhs))
    }
}

impl Sub<Ticks> for Ticks {
    type Output = u64;

    fn sub(self, rhs: Ticks) -> Self::Output {
        self.0.saturating_sub(rhs.0)
    }
}

/// Duration in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Millis(u32);

impl Millis {
    /// Create from milliseconds
    #[must_use]
    pub const fn new(ms: u32) -> Self {
        Self(ms)
    }

    /// Create from seconds
    #[must_use]
    pub const fn from_secs(secs: u32) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// Get the raw millisecond count
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Convert to system ticks at the configured tick rate
    #[must_use]
    pub const fn as_ticks(&self) -> u32 {
        ((self.0 as u64 * TICK_RATE_HZ as u64) / 1000) as u32
    }
}

impl From<u32> for Millis {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Bounded wait specification for blocking operations
///
/// The framework's blocking primitives (queue push/pop, pool allocation)
/// accept a `Timeout` rather than a raw tick count so that the no-wait and
/// wait-forever cases are explicit at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Timeout {
    /// Fail immediately if the operation cannot complete
    NoWait,
    /// Wait up to the given number of system ticks
    Ticks(u32),
    /// Wait until the operation completes
    Forever,
}

impl Timeout {
    /// Create a timeout from a millisecond duration
    #[must_use]
    pub const fn from_millis(ms: u32) -> Self {
        Self::Ticks(Millis::new(ms).as_ticks())
    }

    /// Check whether this timeout forbids waiting
    #[must_use]
    pub const fn is_no_wait(&self) -> bool {
        matches!(self, Self::NoWait)
    }

    /// Compute the absolute deadline for a wait starting at `now`
    ///
    /// Returns `None` for `Forever` (no deadline) and `Some(now)` for
    /// `NoWait` (already expired).
    #[must_use]
    pub const fn deadline(&self, now: Ticks) -> Option<Ticks> {
        match self {
            Self::NoWait => Some(now),
            Self::Ticks(n) => Some(Ticks::new(now.as_u64().saturating_add(*n as u64))),
            Self::Forever => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_elapsed() {
        let start = Ticks::new(100);
        let now = Ticks::new(350);
        assert_eq!(start.elapsed(now), 250);
        assert!(start.has_elapsed(now, 250));
        assert!(!start.has_elapsed(now, 251));
    }

    #[test]
    fn test_ticks_saturating() {
        let later = Ticks::new(10);
        let earlier = Ticks::new(50);
        // Clock can never appear to run backwards
        assert_eq!(earlier.elapsed(later), 0);
        assert_eq!(later - earlier, 0);
    }

    #[test]
    fn test_millis_to_ticks() {
        // 1 kHz tick rate: 1 ms == 1 tick
        assert_eq!(Millis::new(250).as_ticks(), 250);
        assert_eq!(Millis::from_secs(2).as_u32(), 2000);
    }

    #[test]
    fn test_timeout_deadline() {
        let now = Ticks::new(1000);
        assert_eq!(Timeout::NoWait.deadline(now), Some(now));
        assert_eq!(Timeout::Ticks(50).deadline(now), Some(Ticks::new(1050)));
        assert_eq!(Timeout::Forever.deadline(now), None);
    }
}
