//! Position status as reported by the rules oracle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a position from the point of view of the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Play continues, side to move is not in check.
    Active,
    /// Play continues, side to move is in check.
    Check,
    /// Side to move is in check and has no legal moves.
    Checkmate,
    /// Side to move is not in check and has no legal moves.
    Stalemate,
    /// Drawn by insufficient material or the fifty-move rule.
    Draw,
}

impl GameStatus {
    /// Returns true if no further moves may be played.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            GameStatus::Checkmate | GameStatus::Stalemate | GameStatus::Draw
        )
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameStatus::Active => "active",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
            GameStatus::Draw => "draw",
        };
        f.write_str(s)
    }
}
