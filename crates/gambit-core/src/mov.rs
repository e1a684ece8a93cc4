//! Move record.

use crate::{PieceKind, Square};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error returned when coordinate notation cannot be read as a move.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid move notation '{0}': expected e.g. e2e4 or e7e8q")]
pub struct ParseMoveError(pub String);

/// A chess move as seen by the session.
///
/// Moves built from user intent only carry `from`, `to` and an optional
/// promotion. Moves returned by the rules oracle are fully annotated with
/// SAN, the moved piece and any captured piece. Records are never edited
/// after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub san: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured: Option<PieceKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece: Option<PieceKind>,
}

impl Move {
    /// Creates an unannotated move.
    pub const fn new(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            promotion: None,
            san: None,
            captured: None,
            piece: None,
        }
    }

    /// Returns this move with a promotion piece.
    pub fn with_promotion(mut self, promotion: PieceKind) -> Self {
        self.promotion = Some(promotion);
        self
    }

    /// Returns true if the move took a piece.
    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    /// Returns the UCI coordinate notation (e.g., "e2e4", "e7e8q").
    pub fn to_uci(&self) -> String {
        match self.promotion {
            Some(p) => format!("{}{}{}", self.from, self.to, p.to_char()),
            None => format!("{}{}", self.from, self.to),
        }
    }

    /// Parses UCI coordinate notation into an unannotated move.
    ///
    /// Only the shape is checked here; legality is the rules oracle's call.
    pub fn from_uci(s: &str) -> Result<Self, ParseMoveError> {
        let s = s.trim();
        let err = || ParseMoveError(s.to_string());
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return Err(err());
        }
        let from = Square::from_algebraic(&s[0..2]).ok_or_else(err)?;
        let to = Square::from_algebraic(&s[2..4]).ok_or_else(err)?;
        let mut mv = Move::new(from, to);
        if let Some(c) = s[4..].chars().next() {
            let piece = PieceKind::from_char(c)
                .filter(|p| p.is_promotion_target())
                .ok_or_else(err)?;
            mv = mv.with_promotion(piece);
        }
        Ok(mv)
    }

    /// SAN if known, otherwise UCI notation.
    pub fn notation(&self) -> String {
        self.san.clone().unwrap_or_else(|| self.to_uci())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.san {
            Some(san) => f.write_str(san),
            None => f.write_str(&self.to_uci()),
        }
    }
}
