//! Game phase.

use gambit_core::{GameStatus, Side};
use serde::Serialize;
use std::fmt;

/// Where the session is in its lifecycle.
///
/// `Check` is `Active` with an annotation: play continues. `Checkmate`,
/// `Stalemate`, `Draw` and `Flagged` are terminal; only a reset leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    /// No game set up yet, or just reset.
    Idle,
    Active,
    Paused,
    Check,
    Checkmate,
    Stalemate,
    Draw,
    /// The given side ran out of time.
    Flagged(Side),
}

impl GamePhase {
    /// Returns true if moves are accepted (`Active` or `Check`).
    #[inline]
    pub const fn is_playing(self) -> bool {
        matches!(self, GamePhase::Active | GamePhase::Check)
    }

    /// Returns true if only a reset can leave this phase.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            GamePhase::Checkmate | GamePhase::Stalemate | GamePhase::Draw | GamePhase::Flagged(_)
        )
    }

    /// Maps the oracle's verdict on a position to a phase.
    pub const fn from_status(status: GameStatus) -> Self {
        match status {
            GameStatus::Active => GamePhase::Active,
            GameStatus::Check => GamePhase::Check,
            GameStatus::Checkmate => GamePhase::Checkmate,
            GameStatus::Stalemate => GamePhase::Stalemate,
            GameStatus::Draw => GamePhase::Draw,
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GamePhase::Idle => f.write_str("idle"),
            GamePhase::Active => f.write_str("active"),
            GamePhase::Paused => f.write_str("paused"),
            GamePhase::Check => f.write_str("check"),
            GamePhase::Checkmate => f.write_str("checkmate"),
            GamePhase::Stalemate => f.write_str("stalemate"),
            GamePhase::Draw => f.write_str("draw"),
            GamePhase::Flagged(side) => write!(f, "flagged ({} out of time)", side),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_classes() {
        assert!(GamePhase::Active.is_playing());
        assert!(GamePhase::Check.is_playing());
        assert!(!GamePhase::Paused.is_playing());
        assert!(!GamePhase::Idle.is_terminal());
        assert!(!GamePhase::Paused.is_terminal());
        assert!(GamePhase::Checkmate.is_terminal());
        assert!(GamePhase::Flagged(Side::Black).is_terminal());
    }

    #[test]
    fn status_mapping() {
        assert_eq!(GamePhase::from_status(GameStatus::Check), GamePhase::Check);
        assert_eq!(GamePhase::from_status(GameStatus::Draw), GamePhase::Draw);
    }
}
