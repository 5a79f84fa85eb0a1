//! Presentation events — everything the core tells the rendering layer.
//!
//! RULE: The core never renders and never formats text.
//! It emits these events in order; the presentation layer subscribes.

use crate::{
    history::HistoryEntry,
    outcome::Outcome,
    types::RoundNumber,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    Idle,
    Logging,
    Trajectory,
    Impact,
    Reveal,
}

impl RoundState {
    /// The strictly linear successor. Reveal wraps back to Idle.
    pub fn next(self) -> Self {
        match self {
            Self::Idle       => Self::Logging,
            Self::Logging    => Self::Trajectory,
            Self::Trajectory => Self::Impact,
            Self::Impact     => Self::Reveal,
            Self::Reveal     => Self::Idle,
        }
    }
}

/// Every event emitted during a round.
/// Variants are only appended — never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundEvent {
    // ── Sequencer ──────────────────────────────────
    PhaseChanged {
        round: RoundNumber,
        state: RoundState,
    },

    // ── Logging ────────────────────────────────────
    LogCleared,
    LogCharacterAppended {
        ch: char,
    },
    LogHidden,

    // ── Trajectory ─────────────────────────────────
    PositionUpdate {
        x:     f64,
        y:     f64,
        angle: f64,
    },

    // ── Impact ─────────────────────────────────────
    ImpactTriggered {
        x: f64,
        y: f64,
    },
    ObjectVisibility {
        visible: bool,
    },

    // ── Reveal ─────────────────────────────────────
    OutcomeRevealed {
        outcome: Outcome,
        x:       f64,
        y:       f64,
    },
    OutcomeCleared,
    HistoryChanged {
        entries: Vec<HistoryEntry>,
    },
}

impl RoundEvent {
    /// Stable snake_case name, used for log lines and event filtering.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PhaseChanged { .. }         => "phase_changed",
            Self::LogCleared                  => "log_cleared",
            Self::LogCharacterAppended { .. } => "log_character_appended",
            Self::LogHidden                   => "log_hidden",
            Self::PositionUpdate { .. }       => "position_update",
            Self::ImpactTriggered { .. }      => "impact_triggered",
            Self::ObjectVisibility { .. }     => "object_visibility",
            Self::OutcomeRevealed { .. }      => "outcome_revealed",
            Self::OutcomeCleared              => "outcome_cleared",
            Self::HistoryChanged { .. }       => "history_changed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_cycle_linearly() {
        let mut s = RoundState::Idle;
        let mut seen = vec![s];
        for _ in 0..5 {
            s = s.next();
            seen.push(s);
        }
        assert_eq!(
            seen,
            vec![
                RoundState::Idle,
                RoundState::Logging,
                RoundState::Trajectory,
                RoundState::Impact,
                RoundState::Reveal,
                RoundState::Idle,
            ]
        );
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let ev = RoundEvent::PhaseChanged { round: 3, state: RoundState::Impact };
        let json = serde_json::to_string(&ev).unwrap();
        assert_eq!(json, r#"{"type":"phase_changed","round":3,"state":"impact"}"#);
        assert_eq!(ev.kind(), "phase_changed");
    }
}
