//! Farm clock and day tracking.
//!
//! The tick counter is the single source of truth for time. The day index
//! and day boundaries are derived from it and never stored independently.

use agroswarm_world::is_day_boundary;

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Monotonic tick counter with a fixed day length.
///
/// A zero day length is accepted; such a clock stays on day 0 and never
/// reports a day boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FarmClock {
    /// Ticks elapsed. Starts at 0 and is incremented at the start of
    /// each tick.
    tick: u64,

    /// Ticks per simulated day.
    ticks_per_day: u64,
}

impl FarmClock {
    /// A clock at tick 0.
    pub const fn new(ticks_per_day: u64) -> Self {
        Self {
            tick: 0,
            ticks_per_day,
        }
    }

    /// A clock at an arbitrary tick (useful for tests and restoring runs).
    pub const fn from_parts(tick: u64, ticks_per_day: u64) -> Self {
        Self {
            tick,
            ticks_per_day,
        }
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Return the configured day length.
    pub const fn ticks_per_day(&self) -> u64 {
        self.ticks_per_day
    }

    /// Day index: `tick / ticks_per_day`.
    pub fn day(&self) -> u64 {
        self.tick.checked_div(self.ticks_per_day).unwrap_or(0)
    }

    /// Whether the current tick is a positive multiple of the day length.
    pub fn is_day_boundary(&self) -> bool {
        is_day_boundary(self.tick, self.ticks_per_day)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_at_tick_zero() {
        let clock = FarmClock::new(120);
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.day(), 0);
        assert!(!clock.is_day_boundary());
    }

    #[test]
    fn clock_advances() {
        let mut clock = FarmClock::new(120);
        assert_eq!(clock.advance().unwrap(), 1);
        assert_eq!(clock.advance().unwrap(), 2);
        assert_eq!(clock.tick(), 2);
    }

    #[test]
    fn day_rolls_over_at_boundary() {
        let mut clock = FarmClock::from_parts(119, 120);
        assert_eq!(clock.day(), 0);
        clock.advance().unwrap();
        assert_eq!(clock.day(), 1);
        assert!(clock.is_day_boundary());
        clock.advance().unwrap();
        assert!(!clock.is_day_boundary());
        assert_eq!(clock.day(), 1);
    }

    #[test]
    fn zero_day_length_stays_on_day_zero() {
        let mut clock = FarmClock::new(0);
        for _ in 0..10 {
            clock.advance().unwrap();
            assert!(!clock.is_day_boundary());
        }
        assert_eq!(clock.day(), 0);
    }

    #[test]
    fn overflow_is_an_error() {
        let mut clock = FarmClock::from_parts(u64::MAX, 120);
        assert_eq!(clock.advance(), Err(ClockError::TickOverflow));
    }
}
