//! Rules oracle for the game session.
//!
//! The session never decides on its own whether a move is legal, what the
//! resulting position looks like, or whether the game is over. It asks a
//! [`RulesOracle`]. This crate provides:
//! - [`Position`] - an opaque, validated 6-field FEN position
//! - [`RulesOracle`] - the capability the session consumes
//! - [`CandidateMove`] - a legal move annotated with check and mate tags
//! - [`StandardRules`] - the standard-chess oracle, backed by `shakmaty`
//!
//! # Example
//!
//! ```
//! use gambit_core::{GameStatus, Square};
//! use gambit_rules::{RulesOracle, StandardRules};
//!
//! let rules = StandardRules;
//! let start = rules.new_position(None).unwrap();
//! assert_eq!(rules.legal_moves(&start, None).unwrap().len(), 20);
//!
//! let e2: Square = "e2".parse().unwrap();
//! let e4: Square = "e4".parse().unwrap();
//! let (next, mv) = rules.apply_move(&start, e2, e4, None).unwrap();
//! assert_eq!(mv.san.as_deref(), Some("e4"));
//! assert_eq!(rules.status(&next).unwrap(), GameStatus::Active);
//! ```

mod oracle;
mod position;
mod san;
mod standard;

pub use oracle::{CandidateMove, RulesError, RulesOracle};
pub use position::Position;
pub use standard::StandardRules;
