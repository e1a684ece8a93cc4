//! Structural validation of FEN (Forsyth-Edwards Notation) strings.
//!
//! Positions travel between the session, the rules oracle and external
//! engines as 6-field FEN strings. This module checks the shape of such a
//! string and exposes its fields. Whether the position is reachable or legal
//! is left to the rules oracle.

use crate::{Side, Square};
use thiserror::Error;

/// Errors that can occur when reading a FEN string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 6 fields, got {0}")]
    FieldCount(usize),

    #[error("invalid piece placement: {0}")]
    Placement(String),

    #[error("invalid side to move: expected 'w' or 'b', got '{0}'")]
    SideToMove(String),

    #[error("invalid castling availability: {0}")]
    Castling(String),

    #[error("invalid en passant target: {0}")]
    EnPassant(String),

    #[error("invalid halfmove clock: {0}")]
    HalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    FullmoveNumber(String),
}

/// The six fields of a FEN string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenFields {
    /// Piece placement, rank 8 first (e.g. "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR").
    pub placement: String,
    pub side_to_move: Side,
    /// Castling availability ("KQkq", "-", ...).
    pub castling: String,
    pub en_passant: Option<Square>,
    /// Half-moves since the last capture or pawn move.
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl FenFields {
    /// The standard starting position.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Splits and validates a FEN string.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        let &[placement, side, castling, ep, halfmove, fullmove] = fields.as_slice() else {
            return Err(FenError::FieldCount(fields.len()));
        };

        check_placement(placement)?;

        let side_to_move = match side {
            "w" => Side::White,
            "b" => Side::Black,
            other => return Err(FenError::SideToMove(other.to_string())),
        };

        if castling != "-"
            && (castling.is_empty() || !castling.chars().all(|c| "KQkq".contains(c)))
        {
            return Err(FenError::Castling(castling.to_string()));
        }

        let en_passant = match ep {
            "-" => None,
            s => {
                let sq = Square::from_algebraic(s)
                    .filter(|sq| sq.rank() == 2 || sq.rank() == 5)
                    .ok_or_else(|| FenError::EnPassant(s.to_string()))?;
                Some(sq)
            }
        };

        let halfmove_clock = halfmove
            .parse::<u32>()
            .map_err(|_| FenError::HalfmoveClock(halfmove.to_string()))?;

        let fullmove_number = fullmove
            .parse::<u32>()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| FenError::FullmoveNumber(fullmove.to_string()))?;

        Ok(FenFields {
            placement: placement.to_string(),
            side_to_move,
            castling: castling.to_string(),
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Joins the fields back into a single FEN string.
    pub fn to_fen(&self) -> String {
        let ep = self
            .en_passant
            .map(|sq| sq.to_algebraic())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{} {} {} {} {} {}",
            self.placement,
            self.side_to_move.fen_char(),
            self.castling,
            ep,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

fn check_placement(placement: &str) -> Result<(), FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::Placement(format!(
            "expected 8 ranks, got {}",
            ranks.len()
        )));
    }

    for (i, rank) in ranks.iter().enumerate() {
        let mut width = 0;
        for c in rank.chars() {
            width += match c {
                '1'..='8' => c as u32 - '0' as u32,
                'p' | 'n' | 'b' | 'r' | 'q' | 'k' | 'P' | 'N' | 'B' | 'R' | 'Q' | 'K' => 1,
                _ => {
                    return Err(FenError::Placement(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        8 - i
                    )))
                }
            };
        }
        if width != 8 {
            return Err(FenError::Placement(format!(
                "rank {} covers {} squares, expected 8",
                8 - i,
                width
            )));
        }
    }

    Ok(())
}
