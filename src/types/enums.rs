//! Enumeration types for the locker wall simulator
//!
//! This module contains the door states reported by a locker wall and the two
//! phases a simulated wall alternates between.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of doors reported in every status message
pub const DOORS_PER_WALL: usize = 16;

/// State of a single locker door as reported on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorState {
    /// Door is closed (`CL`)
    Closed,
    /// Door is open (`OE`)
    Open,
}

impl DoorState {
    /// Wire token for this state
    pub fn token(&self) -> &'static str {
        match self {
            DoorState::Closed => "CL",
            DoorState::Open => "OE",
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for DoorState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CL" => Ok(DoorState::Closed),
            "OE" => Ok(DoorState::Open),
            _ => Err(format!("Unknown door state: {}", s)),
        }
    }
}

/// Door pattern a locker wall reports for one tick
///
/// Both phases cover all sixteen doors. `Rising` reports `OE,CL` eight times,
/// `Falling` reports `CL,OE` eight times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorPhase {
    /// Even doors open, odd doors closed
    Rising,
    /// Even doors closed, odd doors open
    Falling,
}

impl DoorPhase {
    /// Select the phase for a cycle value.
    ///
    /// `Rising` when `change_at <= cycle <= 2 * change_at`, `Falling` otherwise.
    pub fn for_cycle(cycle: u32, change_at: u32) -> Self {
        let upper = change_at.saturating_mul(2);
        if change_at <= cycle && cycle <= upper {
            DoorPhase::Rising
        } else {
            DoorPhase::Falling
        }
    }

    /// The two-door sequence repeated across the wall
    fn pair(&self) -> [DoorState; 2] {
        match self {
            DoorPhase::Rising => [DoorState::Open, DoorState::Closed],
            DoorPhase::Falling => [DoorState::Closed, DoorState::Open],
        }
    }

    /// States of all sixteen doors, in wire order
    pub fn states(&self) -> [DoorState; DOORS_PER_WALL] {
        let pair = self.pair();
        std::array::from_fn(|door| pair[door % 2])
    }

    /// Comma-separated wire form of the sixteen door states
    pub fn tokens(&self) -> String {
        self.states().iter().map(DoorState::token).collect::<Vec<_>>().join(",")
    }

    /// Recognize a phase from a full set of door states
    pub fn from_states(states: &[DoorState]) -> Option<Self> {
        if states.len() != DOORS_PER_WALL {
            return None;
        }
        [DoorPhase::Rising, DoorPhase::Falling]
            .into_iter()
            .find(|phase| phase.states().as_slice() == states)
    }
}

impl fmt::Display for DoorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoorPhase::Rising => write!(f, "Rising"),
            DoorPhase::Falling => write!(f, "Falling"),
        }
    }
}

impl FromStr for DoorPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rising" => Ok(DoorPhase::Rising),
            "falling" => Ok(DoorPhase::Falling),
            _ => Err(format!("Unknown door phase: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_door_state_tokens() {
        assert_eq!(DoorState::Closed.to_string(), "CL");
        assert_eq!(DoorState::Open.to_string(), "OE");
        assert_eq!("oe".parse::<DoorState>().unwrap(), DoorState::Open);
        assert!("XX".parse::<DoorState>().is_err());
    }

    #[test]
    fn test_phase_tokens() {
        assert_eq!(
            DoorPhase::Rising.tokens(),
            "OE,CL,OE,CL,OE,CL,OE,CL,OE,CL,OE,CL,OE,CL,OE,CL"
        );
        assert_eq!(
            DoorPhase::Falling.tokens(),
            "CL,OE,CL,OE,CL,OE,CL,OE,CL,OE,CL,OE,CL,OE,CL,OE"
        );
    }

    #[test]
    fn test_phase_for_cycle_boundaries() {
        assert_eq!(DoorPhase::for_cycle(1, 15), DoorPhase::Falling);
        assert_eq!(DoorPhase::for_cycle(14, 15), DoorPhase::Falling);
        assert_eq!(DoorPhase::for_cycle(15, 15), DoorPhase::Rising);
        assert_eq!(DoorPhase::for_cycle(30, 15), DoorPhase::Rising);
        assert_eq!(DoorPhase::for_cycle(31, 15), DoorPhase::Falling);
    }

    #[test]
    fn test_phase_from_states() {
        let rising = DoorPhase::Rising.states();
        assert_eq!(DoorPhase::from_states(&rising), Some(DoorPhase::Rising));
        assert_eq!(DoorPhase::from_states(&rising[..15]), None);

        let mut mixed = DoorPhase::Falling.states();
        mixed[3] = DoorState::Closed;
        assert_eq!(DoorPhase::from_states(&mixed), None);
    }
}
