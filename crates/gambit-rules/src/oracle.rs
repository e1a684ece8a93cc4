//! The rules oracle capability.

use crate::Position;
use gambit_core::{FenError, GameStatus, Move, PieceKind, Side, Square};
use thiserror::Error;

/// Errors reported by a rules oracle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("illegal move: {from}{to}")]
    IllegalMove { from: Square, to: Square },

    #[error("no legal move matches '{0}'")]
    UnknownSan(String),

    #[error("invalid position: {0}")]
    InvalidPosition(String),

    #[error(transparent)]
    Fen(#[from] FenError),
}

/// A legal move annotated with the tags the move selection policy scores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateMove {
    /// Fully annotated move (SAN, moved piece, captured piece).
    pub mv: Move,
    /// The move leaves the opponent in check (mate included).
    pub gives_check: bool,
    /// The move leaves the opponent checkmated.
    pub gives_mate: bool,
}

impl CandidateMove {
    #[inline]
    pub fn is_capture(&self) -> bool {
        self.mv.is_capture()
    }

    #[inline]
    pub fn to(&self) -> Square {
        self.mv.to
    }
}

/// Decides legality, resulting positions and game status.
///
/// The session delegates every chess rule to an implementation of this
/// trait and never infers check or mate on its own.
pub trait RulesOracle {
    /// Returns the standard initial position, or the given layout.
    fn new_position(&self, fen: Option<&str>) -> Result<Position, RulesError>;

    /// Generates the legal moves, optionally only those leaving `from`.
    fn legal_moves(
        &self,
        position: &Position,
        from: Option<Square>,
    ) -> Result<Vec<CandidateMove>, RulesError>;

    /// Applies a move, returning the new position and the annotated move.
    ///
    /// A pawn move onto the last rank without a promotion piece promotes
    /// to a queen.
    fn apply_move(
        &self,
        position: &Position,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<(Position, Move), RulesError>;

    /// Reports the status of the position for the side to move.
    fn status(&self, position: &Position) -> Result<GameStatus, RulesError>;

    /// Returns the side to move.
    fn side_to_move(&self, position: &Position) -> Side {
        position.side_to_move()
    }

    /// Returns the destination squares reachable from `from`.
    fn legal_destinations(
        &self,
        position: &Position,
        from: Square,
    ) -> Result<Vec<Square>, RulesError> {
        let mut squares: Vec<Square> = self
            .legal_moves(position, Some(from))?
            .into_iter()
            .map(|c| c.mv.to)
            .collect();
        squares.sort_by_key(|sq| (sq.file(), sq.rank()));
        squares.dedup();
        Ok(squares)
    }

    /// Looks up the legal move written as `san` (e.g. "Nf3", "exd5", "O-O").
    fn find_san(&self, position: &Position, san: &str) -> Result<Move, RulesError>;
}
