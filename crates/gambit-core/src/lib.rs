//! Core value types for a chess game session.
//!
//! This crate provides the plain data the rest of the workspace passes around:
//! - [`Side`] for the two players
//! - [`Square`] for validated board coordinates
//! - [`PieceKind`] for piece roles
//! - [`Move`] for an applied or candidate move record
//! - [`GameStatus`] for the rules oracle's verdict on a position
//! - [`FenFields`] for structural validation of 6-field FEN strings
//!
//! Nothing in here knows the rules of chess. Legality lives behind the
//! rules oracle in `gambit-rules`.

mod fen;
mod mov;
mod piece;
mod side;
mod square;
mod status;

pub use fen::{FenError, FenFields};
pub use mov::{Move, ParseMoveError};
pub use piece::PieceKind;
pub use side::Side;
pub use square::{Square, SquareError};
pub use status::GameStatus;
