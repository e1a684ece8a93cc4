//! The game session state machine.
//!
//! A [`Session`] owns the position, phase, clocks and move history of one
//! game against the computer. Every chess rule is delegated to a
//! [`RulesOracle`]; phase changes follow the oracle's verdict and are never
//! inferred locally.
//!
//! ```text
//! Idle ──start──▶ Active ⇄ Check ──▶ Checkmate | Stalemate | Draw | Flagged
//!                   ▲ │
//!          toggle   │ ▼ toggle
//!                  Paused
//! ```
//!
//! `reset` returns to `Idle` from anywhere.

use crate::{
    ClockState, GameConfig, GamePhase, GameSetup, MovePolicy, SessionError, SkillTier, Tick,
};
use gambit_core::{GameStatus, Move, PieceKind, Side, Square};
use gambit_rules::{Position, RulesOracle, StandardRules};
use rand::Rng;
use serde::Serialize;

/// What a successful move did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The annotated move as recorded in history.
    pub mv: Move,
    /// The side that played it.
    pub mover: Side,
    /// Oracle status of the resulting position.
    pub status: GameStatus,
    /// Phase after the move.
    pub phase: GamePhase,
}

/// Serializable view of a session for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub fen: String,
    pub phase: GamePhase,
    pub side_to_move: Side,
    pub player_side: Side,
    pub tier: SkillTier,
    pub model: crate::AiModel,
    pub clock: ClockState,
    pub history: Vec<Move>,
    pub hints_used: u32,
}

/// One game against the computer.
pub struct Session<O = StandardRules> {
    rules: O,
    position: Position,
    phase: GamePhase,
    /// Phase to restore when resuming from `Paused`.
    resume_phase: GamePhase,
    clock: ClockState,
    history: Vec<Move>,
    setup: GameSetup,
    hints_used: u32,
    epoch: u64,
    starting_seconds: u32,
    flag_fall_ends_game: bool,
}

impl Session<StandardRules> {
    /// Standard rules with default settings.
    pub fn standard() -> Self {
        Session::new(StandardRules, &GameConfig::default())
    }
}

impl<O: RulesOracle> Session<O> {
    /// Creates an idle session.
    pub fn new(rules: O, config: &GameConfig) -> Self {
        Session {
            rules,
            position: Position::startpos(),
            phase: GamePhase::Idle,
            resume_phase: GamePhase::Active,
            clock: ClockState::new(config.starting_seconds),
            history: Vec::new(),
            setup: GameSetup::default(),
            hints_used: 0,
            epoch: 0,
            starting_seconds: config.starting_seconds,
            flag_fall_ends_game: config.flag_fall_ends_game,
        }
    }

    // --- accessors ---

    pub fn rules(&self) -> &O {
        &self.rules
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn clock(&self) -> &ClockState {
        &self.clock
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn setup(&self) -> GameSetup {
        self.setup
    }

    pub fn player_side(&self) -> Side {
        self.setup.player_side
    }

    pub fn ai_side(&self) -> Side {
        self.setup.player_side.opposite()
    }

    pub fn tier(&self) -> SkillTier {
        self.setup.tier
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    /// Bumped on every state change that invalidates pending computer
    /// thinking: start, reset, pause, resume, and each move.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn side_to_move(&self) -> Side {
        self.rules.side_to_move(&self.position)
    }

    /// True when play continues and the computer is to move.
    pub fn is_ai_turn(&self) -> bool {
        self.phase.is_playing() && self.side_to_move() == self.ai_side()
    }

    /// True when play continues and the player is to move.
    pub fn is_player_turn(&self) -> bool {
        self.phase.is_playing() && self.side_to_move() == self.player_side()
    }

    // --- transitions ---

    /// Sets up a fresh game. Valid from `Idle` or a terminal phase.
    pub fn start(&mut self, setup: GameSetup) -> Result<(), SessionError> {
        if !(self.phase == GamePhase::Idle || self.phase.is_terminal()) {
            return Err(SessionError::InvalidPhaseTransition {
                op: "start a game",
                phase: self.phase,
            });
        }

        let position = self.rules.new_position(None)?;
        self.position = position;
        self.history.clear();
        self.setup = setup;
        self.hints_used = 0;
        self.clock = ClockState::new(self.starting_seconds);
        self.phase = GamePhase::Active;
        self.clock.run_for(self.side_to_move());
        self.epoch += 1;

        tracing::info!(
            player = %setup.player_side,
            tier = %setup.tier,
            model = %setup.model,
            "Game started"
        );
        Ok(())
    }

    /// Applies a move for whichever side is to move.
    ///
    /// The oracle decides legality, the resulting position and its status.
    /// A pawn reaching the last rank without `promotion` becomes a queen.
    /// On error nothing changes.
    pub fn apply_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<MoveOutcome, SessionError> {
        self.require_playing("move")?;

        let mover = self.side_to_move();
        let (position, mv) = self.rules.apply_move(&self.position, from, to, promotion)?;
        let status = self.rules.status(&position)?;

        self.position = position;
        self.history.push(mv.clone());
        self.phase = GamePhase::from_status(status);
        if self.phase.is_terminal() {
            self.clock.stop();
        } else {
            self.clock.run_for(self.side_to_move());
        }
        self.epoch += 1;

        tracing::debug!(side = %mover, mv = %mv, status = %status, "Move applied");
        if self.phase.is_terminal() {
            tracing::info!(phase = %self.phase, "Game over");
        }

        Ok(MoveOutcome {
            mv,
            mover,
            status,
            phase: self.phase,
        })
    }

    /// A move by the human, rejected unless it is their turn.
    pub fn apply_player_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<MoveOutcome, SessionError> {
        self.require_playing("move")?;
        if self.side_to_move() != self.player_side() {
            return Err(SessionError::WrongTurn {
                to_move: self.side_to_move(),
            });
        }
        self.apply_move(from, to, promotion)
    }

    /// A move chosen for the computer elsewhere (e.g. by an engine).
    pub fn apply_ai_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<MoveOutcome, SessionError> {
        self.require_playing("move")?;
        if !self.is_ai_turn() {
            return Err(SessionError::NotAiTurn);
        }
        self.apply_move(from, to, promotion)
    }

    /// Lets the policy choose the computer's move at the session's tier and
    /// plays it.
    pub fn play_ai_move<R: Rng>(
        &mut self,
        policy: &mut MovePolicy<R>,
    ) -> Result<MoveOutcome, SessionError> {
        self.require_playing("move")?;
        if !self.is_ai_turn() {
            return Err(SessionError::NotAiTurn);
        }
        let candidates = self.rules.legal_moves(&self.position, None)?;
        let choice = policy.select(&candidates, self.tier())?;
        self.apply_move(choice.from, choice.to, choice.promotion)
    }

    /// Suggests a move for the player at the strongest tier.
    ///
    /// Position, history and phase are left alone; only the hint counter
    /// moves.
    pub fn hint<R: Rng>(&mut self, policy: &mut MovePolicy<R>) -> Result<Move, SessionError> {
        self.require_playing("suggest a move")?;
        if !self.is_player_turn() {
            return Err(SessionError::WrongTurn {
                to_move: self.side_to_move(),
            });
        }
        let candidates = self.rules.legal_moves(&self.position, None)?;
        let suggestion = policy.hint(&candidates)?;
        self.hints_used += 1;
        tracing::debug!(mv = %suggestion, hints = self.hints_used, "Hint given");
        Ok(suggestion)
    }

    /// Pauses an ongoing game or resumes a paused one. Returns the new
    /// phase.
    pub fn toggle_pause(&mut self) -> Result<GamePhase, SessionError> {
        match self.phase {
            GamePhase::Active | GamePhase::Check => {
                self.resume_phase = self.phase;
                self.phase = GamePhase::Paused;
                self.clock.pause();
            }
            GamePhase::Paused => {
                self.phase = self.resume_phase;
                self.clock.resume();
            }
            phase => {
                return Err(SessionError::InvalidPhaseTransition {
                    op: "pause",
                    phase,
                })
            }
        }
        self.epoch += 1;
        tracing::info!(phase = %self.phase, "Pause toggled");
        Ok(self.phase)
    }

    /// Back to `Idle` with the initial layout and full clocks. Always
    /// succeeds.
    pub fn reset(&mut self) {
        self.position = Position::startpos();
        self.history.clear();
        self.phase = GamePhase::Idle;
        self.resume_phase = GamePhase::Active;
        self.clock = ClockState::new(self.starting_seconds);
        self.hints_used = 0;
        self.epoch += 1;
        tracing::info!("Session reset");
    }

    /// One second of clock time.
    ///
    /// Only the side to move loses time, and only while the game is in
    /// `Active` or `Check` and not paused. When a clock reaches zero and
    /// flag fall is enabled the game ends as [`GamePhase::Flagged`].
    pub fn tick(&mut self) -> Tick {
        if !self.phase.is_playing() {
            return Tick::Stopped;
        }
        let tick = self.clock.tick();
        if let Tick::FlagFell(side) = tick {
            tracing::info!(side = %side, "Flag fell");
            if self.flag_fall_ends_game {
                self.phase = GamePhase::Flagged(side);
                self.clock.stop();
                self.epoch += 1;
            }
        }
        tick
    }

    /// True when [`Self::tick`] would take time off a clock.
    pub fn clock_should_run(&self) -> bool {
        self.phase.is_playing() && self.clock.ticking_side().is_some()
    }

    /// Legal destinations from `from` for the side to move. Empty outside
    /// `Active`/`Check`.
    pub fn legal_destinations(&self, from: Square) -> Result<Vec<Square>, SessionError> {
        if !self.phase.is_playing() {
            return Ok(Vec::new());
        }
        Ok(self.rules.legal_destinations(&self.position, from)?)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            fen: self.position.as_fen().to_string(),
            phase: self.phase,
            side_to_move: self.side_to_move(),
            player_side: self.setup.player_side,
            tier: self.setup.tier,
            model: self.setup.model,
            clock: self.clock,
            history: self.history.clone(),
            hints_used: self.hints_used,
        }
    }

    fn require_playing(&self, op: &'static str) -> Result<(), SessionError> {
        if self.phase.is_playing() {
            Ok(())
        } else {
            Err(SessionError::InvalidPhaseTransition {
                op,
                phase: self.phase,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AiModel;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn started(player: Side) -> Session {
        let mut session = Session::standard();
        session
            .start(GameSetup {
                player_side: player,
                tier: SkillTier::Club,
                model: AiModel::Default,
            })
            .unwrap();
        session
    }

    #[test]
    fn new_session_is_idle() {
        let session = Session::standard();
        assert_eq!(session.phase(), GamePhase::Idle);
        assert_eq!(session.clock().running, None);
        assert!(session.history().is_empty());
    }

    #[test]
    fn start_runs_whites_clock_even_for_black_player() {
        let session = started(Side::Black);
        assert_eq!(session.phase(), GamePhase::Active);
        assert_eq!(session.clock().running, Some(Side::White));
        assert!(session.is_ai_turn());
        assert!(!session.is_player_turn());
    }

    #[test]
    fn start_only_from_idle_or_terminal() {
        let mut session = started(Side::White);
        let err = session.start(GameSetup::default()).unwrap_err();
        assert!(matches!(err, SessionError::InvalidPhaseTransition { .. }));
    }

    #[test]
    fn move_flips_clock_owner() {
        let mut session = started(Side::White);
        let outcome = session.apply_move(sq("e2"), sq("e4"), None).unwrap();
        assert_eq!(outcome.mover, Side::White);
        assert_eq!(outcome.mv.san.as_deref(), Some("e4"));
        assert_eq!(session.clock().running, Some(Side::Black));
        assert_eq!(session.side_to_move(), Side::Black);
    }

    #[test]
    fn player_cannot_move_for_computer() {
        let mut session = started(Side::Black);
        let err = session
            .apply_player_move(sq("e2"), sq("e4"), None)
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::WrongTurn {
                to_move: Side::White
            }
        );
        assert!(session.history().is_empty());
    }

    #[test]
    fn computer_move_through_policy() {
        let mut session = started(Side::Black);
        let mut policy = MovePolicy::seeded(5);
        let outcome = session.play_ai_move(&mut policy).unwrap();
        assert_eq!(outcome.mover, Side::White);
        assert_eq!(session.history().len(), 1);
        assert!(session.is_player_turn());
        assert_eq!(
            session.play_ai_move(&mut policy).unwrap_err(),
            SessionError::NotAiTurn
        );
    }

    #[test]
    fn pause_and_resume_restore_check() {
        let mut session = started(Side::White);
        for (from, to) in [("e2", "e4"), ("f7", "f6"), ("d1", "h5")] {
            session.apply_move(sq(from), sq(to), None).unwrap();
        }
        assert_eq!(session.phase(), GamePhase::Check);

        assert_eq!(session.toggle_pause().unwrap(), GamePhase::Paused);
        assert_eq!(session.clock().running, Some(Side::Black));
        assert!(!session.clock_should_run());
        assert!(matches!(
            session.apply_move(sq("g7"), sq("g6"), None),
            Err(SessionError::InvalidPhaseTransition { .. })
        ));

        assert_eq!(session.toggle_pause().unwrap(), GamePhase::Check);
        assert!(session.clock_should_run());
    }

    #[test]
    fn pause_rejected_when_idle() {
        let mut session = Session::standard();
        assert!(matches!(
            session.toggle_pause(),
            Err(SessionError::InvalidPhaseTransition { op: "pause", .. })
        ));
    }

    #[test]
    fn flag_fall_is_silent_by_default() {
        let config = GameConfig {
            starting_seconds: 2,
            ..GameConfig::default()
        };
        let mut session = Session::new(StandardRules, &config);
        session.start(GameSetup::default()).unwrap();
        session.tick();
        assert_eq!(session.tick(), Tick::FlagFell(Side::White));
        assert_eq!(session.phase(), GamePhase::Active);
        assert_eq!(session.tick(), Tick::Expired(Side::White));
        assert_eq!(session.clock().white, 0);
        assert!(session.apply_move(sq("e2"), sq("e4"), None).is_ok());
    }

    #[test]
    fn flag_fall_can_end_the_game() {
        let config = GameConfig {
            starting_seconds: 1,
            flag_fall_ends_game: true,
            ..GameConfig::default()
        };
        let mut session = Session::new(StandardRules, &config);
        session.start(GameSetup::default()).unwrap();
        assert_eq!(session.tick(), Tick::FlagFell(Side::White));
        assert_eq!(session.phase(), GamePhase::Flagged(Side::White));
        assert_eq!(session.clock().running, None);
        assert_eq!(session.tick(), Tick::Stopped);
        assert!(session.start(GameSetup::default()).is_ok());
    }

    #[test]
    fn destinations_only_while_playing() {
        let mut session = Session::standard();
        assert!(session.legal_destinations(sq("e2")).unwrap().is_empty());
        session.start(GameSetup::default()).unwrap();
        assert_eq!(
            session.legal_destinations(sq("g1")).unwrap(),
            vec![sq("f3"), sq("h3")]
        );
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut session = started(Side::White);
        session.apply_move(sq("d2"), sq("d4"), None).unwrap();
        let snap = session.snapshot();
        assert_eq!(snap.phase, GamePhase::Active);
        assert_eq!(snap.side_to_move, Side::Black);
        assert_eq!(snap.history.len(), 1);
        assert_eq!(
            snap.fen,
            "rnbqkbnr/pppppppp/8/8/3P4/8/PPP1PPPP/RNBQKBNR b KQkq - 0 1"
        );
    }
}
