//! UCI (Universal Chess Interface) codec, seen from the GUI side.
//!
//! The session talks to an optional external engine. This crate formats the
//! commands it sends and parses the lines the engine answers with.
//!
//! # Commands sent
//!
//! - `uci` / `uciok` - Handshake
//! - `isready` / `readyok` - Synchronization
//! - `setoption name <id> [value <x>]` - Configure (e.g. `Skill Level`)
//! - `ucinewgame` - A new game starts
//! - `position fen <fen> [moves <move>...]` - Set position
//! - `go depth <d>` - Start search
//! - `stop` / `quit`
//!
//! # Messages parsed
//!
//! - `id name|author ...`
//! - `info depth <d> score cp <n>|mate <n> pv <moves>`
//! - `bestmove <move> [ponder <move>]`

mod command;
mod info;
mod message;

pub use command::{EngineCommand, GoOptions};
pub use info::{EngineInfo, Score};
pub use message::EngineMessage;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UciError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}
