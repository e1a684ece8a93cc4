//! Chess game session core.
//!
//! This crate holds everything that happens around a game against the
//! computer once the rules are delegated to a [`gambit_rules::RulesOracle`]:
//! - [`Session`] - the phase/turn state machine with clocks and history
//! - [`MovePolicy`] - the skill-tiered heuristic move picker
//! - [`ClockState`] - per-side countdown clocks
//! - [`commentary`] - canned remarks and the chat transcript
//! - [`UciEngine`] / [`EngineSlot`] - optional external engine, never required
//! - [`GameDriver`] - the async task that runs a session on one timeline
//!
//! # Example
//!
//! ```
//! use gambit_core::{Side, Square};
//! use gambit_session::{GamePhase, GameSetup, MovePolicy, Session};
//!
//! let mut session = Session::standard();
//! session.start(GameSetup::default()).unwrap();
//!
//! let e2: Square = "e2".parse().unwrap();
//! let e4: Square = "e4".parse().unwrap();
//! session.apply_player_move(e2, e4, None).unwrap();
//! assert_eq!(session.clock().running, Some(Side::Black));
//!
//! let mut policy = MovePolicy::seeded(7);
//! session.play_ai_move(&mut policy).unwrap();
//! assert_eq!(session.history().len(), 2);
//! assert_eq!(session.phase(), GamePhase::Active);
//! ```

mod clock;
pub mod commentary;
mod config;
mod driver;
mod engine;
mod error;
mod phase;
mod policy;
mod session;
mod setup;

pub use clock::{ClockState, Tick};
pub use commentary::{ChatMessage, MessageKind, MessageTag, Transcript};
pub use config::{ConfigError, EngineConfig, GameConfig};
pub use driver::{DriverClosed, DriverEvent, DriverHandle, GameDriver, Intent};
pub use engine::{EngineAnalysis, EngineError, EngineSlot, UciEngine};
pub use error::SessionError;
pub use phase::GamePhase;
pub use policy::{pick_count, score, MovePolicy, PolicyError};
pub use session::{MoveOutcome, Session, SessionSnapshot};
pub use setup::{AiModel, GameSetup, SkillTier};
