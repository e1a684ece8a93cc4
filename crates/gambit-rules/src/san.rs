//! Standard Algebraic Notation (SAN), via `shakmaty::san`.
//!
//! Examples: "e4", "Nf3", "Bxc6", "O-O", "e8=Q", "Nbd2", "R1e1", "Qh4#".

use shakmaty::san::{San, SanPlus};
use shakmaty::{Chess, Move as SMove};

/// Converts a move to SAN, check or mate suffix included, given the
/// position BEFORE the move.
///
/// The move must be legal in `pos`.
pub(crate) fn move_to_san(pos: &Chess, m: &SMove) -> String {
    SanPlus::from_move(pos.clone(), m).to_string()
}

/// Resolves typed SAN to the legal move it names in `pos`.
///
/// Tolerates surrounding whitespace, `!`/`?` annotations and castling
/// written with zeros. Returns `None` when the text is malformed, names
/// no legal move, or is ambiguous.
pub(crate) fn resolve_san(pos: &Chess, san: &str) -> Option<SMove> {
    let cleaned = san
        .trim()
        .trim_end_matches(|c| matches!(c, '!' | '?'))
        .replace('0', "O");
    let parsed: San = cleaned.parse().ok()?;
    parsed.to_move(pos).ok()
}
