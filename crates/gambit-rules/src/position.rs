//! Opaque position value.

use gambit_core::{FenError, FenFields, Side};
use serde::Serialize;
use std::fmt;

/// A full board state, exchanged as a 6-field FEN string.
///
/// The string is checked for shape on construction; whether it describes a
/// legal position is decided by the oracle that consumes it. Positions are
/// values: applying a move produces a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Position {
    fen: String,
    #[serde(skip)]
    side_to_move: Side,
}

impl Position {
    /// Builds a position from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields = FenFields::parse(fen)?;
        Ok(Position {
            fen: fields.to_fen(),
            side_to_move: fields.side_to_move,
        })
    }

    /// The standard initial layout.
    pub fn startpos() -> Self {
        Position {
            fen: FenFields::STARTPOS.to_string(),
            side_to_move: Side::White,
        }
    }

    /// Returns the FEN string.
    pub fn as_fen(&self) -> &str {
        &self.fen
    }

    /// Returns the side to move recorded in the FEN.
    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_matches_parsed_startpos() {
        let parsed = Position::from_fen(FenFields::STARTPOS).unwrap();
        assert_eq!(parsed, Position::startpos());
        assert_eq!(parsed.side_to_move(), Side::White);
    }

    #[test]
    fn normalises_whitespace() {
        let pos = Position::from_fen("  8/8/8/8/8/8/8/K6k   b - -  3 40 ").unwrap();
        assert_eq!(pos.as_fen(), "8/8/8/8/8/8/8/K6k b - - 3 40");
        assert_eq!(pos.side_to_move(), Side::Black);
    }

    #[test]
    fn rejects_malformed_fen() {
        assert!(Position::from_fen("not a fen").is_err());
    }
}
