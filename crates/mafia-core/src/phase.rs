//! Phases, outcomes, and the phase-completion event payload

use serde::{Deserialize, Serialize};
use std::fmt;

/// The current half-turn of a match
///
/// A match begins in [`TimeOfDay::Day`]; the first executed phase is a Day
/// tally (possibly over an empty accusation map).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    /// Daytime, when accusations are cast
    #[default]
    Day,
    /// Nighttime, when kill votes are cast
    Night,
}

impl TimeOfDay {
    /// The phase that follows this one
    pub fn toggled(self) -> Self {
        match self {
            TimeOfDay::Day => TimeOfDay::Night,
            TimeOfDay::Night => TimeOfDay::Day,
        }
    }

    /// Stable integer form used on the wire (Day = 0, Night = 1)
    pub fn as_wire(self) -> u8 {
        match self {
            TimeOfDay::Day => 0,
            TimeOfDay::Night => 1,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeOfDay::Day => write!(f, "day"),
            TimeOfDay::Night => write!(f, "night"),
        }
    }
}

/// The result of a completed phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseOutcome {
    /// Neither side has won yet
    Continuation,
    /// All Mafia have been eliminated
    CivilianVictory,
    /// The Mafia match or outnumber the remaining civilians
    MafiaVictory,
}

impl PhaseOutcome {
    /// Stable integer form used on the wire
    /// (Continuation = 0, CivilianVictory = 1, MafiaVictory = 2)
    pub fn as_wire(self) -> u8 {
        match self {
            PhaseOutcome::Continuation => 0,
            PhaseOutcome::CivilianVictory => 1,
            PhaseOutcome::MafiaVictory => 2,
        }
    }
}

/// Event payload delivered to phase subscribers when a phase completes
///
/// `phase` names the phase that just finished; by the time a subscriber
/// observes the payload the match has already moved on to the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseExecution {
    /// Host address of the match the phase ran in
    pub host_address: String,
    /// The phase that just completed
    pub phase: TimeOfDay,
    /// Victory state after the tally was applied
    pub outcome: PhaseOutcome,
    /// Players killed during this phase (empty outside Night)
    pub killed_players: Vec<String>,
    /// Players convicted during this phase (empty outside Day)
    pub convicted_players: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_phase_is_day() {
        assert_eq!(TimeOfDay::default(), TimeOfDay::Day);
    }

    #[test]
    fn test_toggle_round_trips() {
        assert_eq!(TimeOfDay::Day.toggled(), TimeOfDay::Night);
        assert_eq!(TimeOfDay::Night.toggled(), TimeOfDay::Day);
        assert_eq!(TimeOfDay::Day.toggled().toggled(), TimeOfDay::Day);
    }

    #[test]
    fn test_wire_values() {
        assert_eq!(TimeOfDay::Day.as_wire(), 0);
        assert_eq!(TimeOfDay::Night.as_wire(), 1);
        assert_eq!(PhaseOutcome::Continuation.as_wire(), 0);
        assert_eq!(PhaseOutcome::CivilianVictory.as_wire(), 1);
        assert_eq!(PhaseOutcome::MafiaVictory.as_wire(), 2);
    }
}
