//! Cycle counter driving a locker wall's door phase
//!
//! The counter starts at 1 and is incremented before every tick, so the
//! first published cycle is 2 and cycle 1 is never reported. Phase selection
//! happens on the incremented value; only afterwards does a value above
//! `2 * change_at` wrap back to 1. The tick that overflows therefore still
//! reports the falling pattern.

use crate::types::DoorPhase;
#[cfg(doc)]
use crate::types::MAX_CHANGE_AT;

/// Result of advancing a [`CycleCounter`] by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleStep {
    /// Cycle value the phase was selected for
    pub cycle: u32,
    /// Phase reported for this tick
    pub phase: DoorPhase,
    /// Whether the counter wrapped back to 1 after this tick
    pub wrapped: bool,
}

/// Per-device cycle state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleCounter {
    value: u32,
    change_at: u32,
}

impl CycleCounter {
    /// Create a counter at its initial value of 1.
    ///
    /// `change_at` must not exceed [`MAX_CHANGE_AT`]; validated configs never do.
    pub fn new(change_at: u32) -> Self {
        Self { value: 1, change_at }
    }

    /// Current counter value, within `[1, 2 * change_at]` between ticks
    pub fn current(&self) -> u32 {
        self.value
    }

    /// Phase threshold
    pub fn change_at(&self) -> u32 {
        self.change_at
    }

    /// Largest value the counter holds between ticks
    pub fn upper_bound(&self) -> u32 {
        self.change_at.saturating_mul(2)
    }

    /// Advance by one tick
    pub fn advance(&mut self) -> CycleStep {
        self.value = self.value.saturating_add(1);
        let cycle = self.value;
        let phase = DoorPhase::for_cycle(cycle, self.change_at);

        let wrapped = cycle > self.upper_bound();
        if wrapped {
            self.value = 1;
        }

        CycleStep { cycle, phase, wrapped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_reports_cycle_two() {
        let mut counter = CycleCounter::new(15);
        assert_eq!(counter.current(), 1);

        let step = counter.advance();
        assert_eq!(step.cycle, 2);
        assert_eq!(step.phase, DoorPhase::Falling);
        assert!(!step.wrapped);
    }

    #[test]
    fn test_overflow_tick_is_falling_then_wraps() {
        let mut counter = CycleCounter::new(2);
        let steps: Vec<CycleStep> = (0..4).map(|_| counter.advance()).collect();

        let cycles: Vec<u32> = steps.iter().map(|s| s.cycle).collect();
        assert_eq!(cycles, vec![2, 3, 4, 5]);
        assert_eq!(steps[2].phase, DoorPhase::Rising);
        assert_eq!(steps[3].phase, DoorPhase::Falling);
        assert!(steps[3].wrapped);
        assert_eq!(counter.current(), 1);

        // next period starts over at 2
        assert_eq!(counter.advance().cycle, 2);
    }

    #[test]
    fn test_change_at_one() {
        let mut counter = CycleCounter::new(1);
        let first = counter.advance();
        assert_eq!((first.cycle, first.phase, first.wrapped), (2, DoorPhase::Rising, false));
        let second = counter.advance();
        assert_eq!((second.cycle, second.phase, second.wrapped), (3, DoorPhase::Falling, true));
        assert_eq!(counter.advance().cycle, 2);
    }

    #[test]
    fn test_counter_stays_in_bounds() {
        for change_at in 1..=20 {
            let mut counter = CycleCounter::new(change_at);
            for _ in 0..200 {
                counter.advance();
                assert!(counter.current() >= 1);
                assert!(counter.current() <= counter.upper_bound());
            }
        }
    }
}
