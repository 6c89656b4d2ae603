//! Time management for the cooperative loop
//!
//! Microcontroller tick counters are 32 bits wide and wrap roughly every
//! 49.7 days when counting milliseconds. Every interval check in the agent
//! compares *elapsed* time, computed with wrapping subtraction, so the loop
//! keeps its cadence across the overflow:
//!
//! ```text
//! mark = 0xFFFF_FF00, now = 0x0000_0010
//! now - mark (wrapping) = 0x110 = 272 ms
//! ```
//!
//! ```rust
//! use wiretemp_core::time::{elapsed, IntervalTimer};
//!
//! assert_eq!(elapsed(0x10, 0xFFFF_FF00), 0x110);
//!
//! let mut timer = IntervalTimer::new(1000);
//! assert!(timer.is_due(0));          // never fired
//! timer.mark(0);
//! assert!(!timer.is_due(999));
//! assert!(timer.is_due(1000));
//! ```

/// Milliseconds since boot, wrapping at `u32::MAX`
pub type Timestamp = u32;

/// Duration in milliseconds
pub type Millis = u32;

/// Elapsed milliseconds from `mark` to `now`, correct across one wraparound
#[inline]
pub const fn elapsed(now: Timestamp, mark: Timestamp) -> Millis {
    now.wrapping_sub(mark)
}

/// Source of the loop's notion of "now"
pub trait Clock {
    /// Current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

/// Gate for a periodic action
///
/// Holds the action's interval and the timestamp of its last run. A timer that
/// has never fired is due immediately, so the first poll, connect attempt and
/// publish happen on the first eligible tick instead of one full interval
/// after boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntervalTimer {
    interval: Millis,
    last: Option<Timestamp>,
}

impl IntervalTimer {
    /// Create a timer that has never fired
    pub const fn new(interval: Millis) -> Self {
        Self { interval, last: None }
    }

    /// Configured interval
    pub const fn interval(&self) -> Millis {
        self.interval
    }

    /// Timestamp of the last run, if any
    pub const fn last(&self) -> Option<Timestamp> {
        self.last
    }

    /// Milliseconds since the last run
    pub fn since_last(&self, now: Timestamp) -> Option<Millis> {
        self.last.map(|last| elapsed(now, last))
    }

    /// True when the action should run at `now`
    pub fn is_due(&self, now: Timestamp) -> bool {
        match self.last {
            None => true,
            Some(last) => elapsed(now, last) >= self.interval,
        }
    }

    /// Record that the action ran at `now`
    pub fn mark(&mut self, now: Timestamp) {
        self.last = Some(now);
    }

    /// If due, mark and return true
    pub fn fire(&mut self, now: Timestamp) -> bool {
        if self.is_due(now) {
            self.mark(now);
            true
        } else {
            false
        }
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedClock {
    timestamp: Timestamp,
}

impl FixedClock {
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Advance, wrapping like a hardware counter
    pub fn advance(&mut self, ms: Millis) {
        self.timestamp = self.timestamp.wrapping_add(ms);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}

/// Monotonic host clock (requires std)
///
/// Truncates the elapsed time since construction to 32 bits, which gives the
/// same wrapping behaviour as an embedded millisecond counter.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemClock {
    pub fn new() -> Self {
        Self { start: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        self.start.elapsed().as_millis() as Timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let mut clock = FixedClock::new(1000);
        assert_eq!(clock.now(), 1000);

        clock.advance(500);
        assert_eq!(clock.now(), 1500);
    }

    #[test]
    fn fixed_clock_wraps() {
        let mut clock = FixedClock::new(u32::MAX - 9);
        clock.advance(20);
        assert_eq!(clock.now(), 10);
    }

    #[test]
    fn elapsed_across_wraparound() {
        // "now" numerically smaller than the mark after overflow
        let mark = u32::MAX - 99;
        let now = 400;
        assert!(now < mark);
        assert_eq!(elapsed(now, mark), 500);
    }

    #[test]
    fn timer_due_across_wraparound() {
        let mut timer = IntervalTimer::new(5000);
        timer.mark(u32::MAX - 1000);

        assert!(!timer.is_due(1000)); // 2001 ms elapsed
        assert!(timer.is_due(4000)); // 5001 ms elapsed
    }

    #[test]
    fn fire_marks_only_when_due() {
        let mut timer = IntervalTimer::new(100);
        assert!(timer.fire(10));
        assert!(!timer.fire(50));
        assert_eq!(timer.last(), Some(10));
        assert!(timer.fire(110));
        assert_eq!(timer.since_last(150), Some(40));
    }
}
