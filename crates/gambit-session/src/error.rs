//! Session-level errors.

use crate::{GamePhase, PolicyError};
use gambit_core::{Side, Square};
use gambit_rules::RulesError;
use thiserror::Error;

/// Errors from session operations. All of them leave the session unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The rules oracle rejected the move.
    #[error("illegal move: {from}{to}")]
    IllegalMove { from: Square, to: Square },

    /// The operation is not valid in the current phase.
    #[error("cannot {op} while {phase}")]
    InvalidPhaseTransition { op: &'static str, phase: GamePhase },

    /// A player move arrived while the computer is to move.
    #[error("not your turn: {to_move} is to move")]
    WrongTurn { to_move: Side },

    /// A computer move was requested while the player is to move.
    #[error("not the computer's turn")]
    NotAiTurn,

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Rules(RulesError),
}

impl From<RulesError> for SessionError {
    fn from(err: RulesError) -> Self {
        match err {
            RulesError::IllegalMove { from, to } => SessionError::IllegalMove { from, to },
            other => SessionError::Rules(other),
        }
    }
}
