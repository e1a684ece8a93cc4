//! Board square representation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a coordinate is not on the 8×8 board.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid square '{0}': expected a file a-h followed by a rank 1-8")]
pub struct SquareError(pub String);

/// A square on the board, stored as file and rank indices (0-7 each).
///
/// Squares only exist in validated form; parse them from algebraic
/// notation with [`Square::from_algebraic`] or `str::parse`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    pub const D4: Square = Square { file: 3, rank: 3 };
    pub const D5: Square = Square { file: 3, rank: 4 };
    pub const E4: Square = Square { file: 4, rank: 3 };
    pub const E5: Square = Square { file: 4, rank: 4 };

    /// The four centre squares.
    pub const CENTER: [Square; 4] = [Square::D4, Square::D5, Square::E4, Square::E5];

    /// Creates a square from file and rank indices, both 0-7.
    #[inline]
    pub const fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Square { file, rank })
        } else {
            None
        }
    }

    /// Parses a square from algebraic notation (e.g., "e4").
    pub const fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if file < b'a' || file > b'h' || rank < b'1' || rank > b'8' {
            return None;
        }
        Some(Square {
            file: file - b'a',
            rank: rank - b'1',
        })
    }

    /// File index, 0 for the a-file.
    #[inline]
    pub const fn file(self) -> u8 {
        self.file
    }

    /// Rank index, 0 for the first rank.
    #[inline]
    pub const fn rank(self) -> u8 {
        self.rank
    }

    #[inline]
    pub const fn file_char(self) -> char {
        (b'a' + self.file) as char
    }

    #[inline]
    pub const fn rank_char(self) -> char {
        (b'1' + self.rank) as char
    }

    /// Returns true for d4, d5, e4 and e5.
    #[inline]
    pub const fn is_center(self) -> bool {
        (self.file == 3 || self.file == 4) && (self.rank == 3 || self.rank == 4)
    }

    /// Returns the algebraic notation for this square.
    pub fn to_algebraic(self) -> String {
        format!("{}{}", self.file_char(), self.rank_char())
    }
}

impl FromStr for Square {
    type Err = SquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_algebraic(s.trim()).ok_or_else(|| SquareError(s.to_string()))
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({})", self)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl Serialize for Square {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
