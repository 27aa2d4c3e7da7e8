//! Millisecond clock derived from the conversion-complete interrupt.
//!
//! There is no dedicated timer: every conversion counts as one tick, and each
//! [`TICKS_PER_CLOCK_STEP`] ticks (~83 ms of ~83 µs conversions) advance the
//! clock by [`SAMPLE_TIME_MS`]. The result is kept as two 16-bit halves so the
//! interrupt handler never needs 32-bit arithmetic.
//!
//! The clock does not correct for drift and wraps silently after 2^32 ms.

use crate::consts::{SAMPLE_TIME_MS, TICKS_PER_CLOCK_STEP};

/// Milliseconds since boot, split into 16-bit halves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Timestamp {
    /// Upper 16 bits.
    pub high: u16,
    /// Lower 16 bits.
    pub low: u16,
}

impl Timestamp {
    /// Builds a timestamp from its halves.
    pub const fn new(high: u16, low: u16) -> Self {
        Self { high, low }
    }

    /// Reassembles the full 32-bit millisecond count.
    pub fn as_millis(&self) -> u32 {
        (u32::from(self.high) << 16) | u32::from(self.low)
    }

    /// Big-endian bytes: high half first, each half high byte first.
    pub fn to_be_bytes(&self) -> [u8; 4] {
        self.as_millis().to_be_bytes()
    }
}

impl From<u32> for Timestamp {
    fn from(millis: u32) -> Self {
        Self {
            high: (millis >> 16) as u16,
            low: millis as u16,
        }
    }
}

/// Free-running millisecond clock advanced once per conversion.
#[derive(Debug, Clone, Default)]
pub struct MillisClock {
    ticks: u16,
    now: Timestamp,
}

impl MillisClock {
    /// Creates a clock at time zero with an empty tick counter.
    pub const fn new() -> Self {
        Self {
            ticks: 0,
            now: Timestamp::new(0, 0),
        }
    }

    /// Records one conversion tick.
    ///
    /// Every [`TICKS_PER_CLOCK_STEP`] ticks the low half advances by
    /// [`SAMPLE_TIME_MS`], carrying into the high half when it overflows.
    pub fn tick(&mut self) {
        self.ticks += 1;
        if self.ticks == TICKS_PER_CLOCK_STEP {
            let (low, carry) = self.now.low.overflowing_add(SAMPLE_TIME_MS);
            if carry {
                self.now.high = self.now.high.wrapping_add(1);
            }
            self.now.low = low;
            self.ticks = 0;
        }
    }

    /// Whether the tick counter sits exactly on a step boundary.
    pub fn at_step_boundary(&self) -> bool {
        self.ticks == 0
    }

    /// Current time.
    pub fn now(&self) -> Timestamp {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_halves() {
        let ts = Timestamp::new(0x0001, 0x0002);
        assert_eq!(ts.as_millis(), 0x0001_0002);
        assert_eq!(ts.to_be_bytes(), [0x00, 0x01, 0x00, 0x02]);
        assert_eq!(Timestamp::from(0x0001_0002), ts);
    }

    #[test]
    fn test_clock_steps_every_thousand_ticks() {
        let mut clock = MillisClock::new();
        for _ in 0..(TICKS_PER_CLOCK_STEP - 1) {
            clock.tick();
            assert!(!clock.at_step_boundary());
        }
        assert_eq!(clock.now().as_millis(), 0);
        clock.tick();
        assert!(clock.at_step_boundary());
        assert_eq!(clock.now().as_millis(), u32::from(SAMPLE_TIME_MS));
    }

    #[test]
    fn test_clock_carries_into_high_half() {
        let mut clock = MillisClock::new();
        clock.now = Timestamp::new(0, 0xFFF0);
        for _ in 0..TICKS_PER_CLOCK_STEP {
            clock.tick();
        }
        assert_eq!(clock.now(), Timestamp::new(1, 0xFFF0u16.wrapping_add(83)));
        assert_eq!(clock.now().as_millis(), 0xFFF0 + 83);
    }

    #[test]
    fn test_clock_never_decreases() {
        let mut clock = MillisClock::new();
        let mut last = clock.now().as_millis();
        for _ in 0..(TICKS_PER_CLOCK_STEP as u32 * 5) {
            clock.tick();
            let now = clock.now().as_millis();
            assert!(now >= last);
            last = now;
        }
        assert_eq!(last, 5 * 83);
    }
}
