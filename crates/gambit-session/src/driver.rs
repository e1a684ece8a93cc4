//! The game driver: one tokio task per session.
//!
//! The driver exclusively owns the [`Session`], the move policy and the
//! engine slot. Everything else talks to it through a [`DriverHandle`]
//! (intents in) and an event receiver ([`DriverEvent`]s out), so all
//! mutation happens on a single timeline without locks.
//!
//! Three things wake the driver up:
//! - an [`Intent`] from the presentation layer
//! - the one-second clock tick, armed only while a clock should run
//! - the computer's thinking deadline: an initial delay, then six
//!   reasoning steps, then the move
//! - an external engine search finishing on its own task
//!
//! Engine searches never run on the driver's timeline. The slot is lent to
//! a spawned task and comes back with the result, tagged with the session
//! epoch the search started in; a result from an older epoch is dropped.

use crate::commentary::{
    ai_commentary, player_critique, result_announcement, strategy_answer, ChatMessage,
    MessageTag, Transcript, REASONING_STEPS,
};
use crate::session::{MoveOutcome, Session, SessionSnapshot};
use crate::engine::{EngineAnalysis, EngineError};
use crate::{EngineSlot, GameConfig, GamePhase, GameSetup, MovePolicy, SessionError, Tick};
use gambit_core::{GameStatus, Move, PieceKind, Side, Square};
use gambit_rules::{RulesOracle, StandardRules};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};

const INTENT_BUFFER: usize = 32;
const CLOCK_PERIOD: Duration = Duration::from_secs(1);

/// Requests sent to the driver.
#[derive(Debug)]
pub enum Intent {
    Start(GameSetup),
    Move {
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    },
    TogglePause,
    Reset,
    Hint,
    /// A free-text line for the chat console.
    Chat(String),
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Transcript(oneshot::Sender<Vec<ChatMessage>>),
    Destinations {
        from: Square,
        reply: oneshot::Sender<Vec<Square>>,
    },
    Shutdown,
}

/// Notifications published by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    Started(GameSetup),
    MoveApplied {
        mv: Move,
        mover: Side,
        status: GameStatus,
    },
    PhaseChanged(GamePhase),
    Clock { white: u32, black: u32 },
    /// Display-only status line while the computer thinks.
    Reasoning { step: usize, text: &'static str },
    Chat(ChatMessage),
    Hint(Move),
    /// An intent was refused. The session is unchanged.
    Rejected(SessionError),
    Reset,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("game driver has stopped")]
pub struct DriverClosed;

/// Cloneable sender side of a running driver.
#[derive(Debug, Clone)]
pub struct DriverHandle {
    intents: mpsc::Sender<Intent>,
}

impl DriverHandle {
    pub async fn send(&self, intent: Intent) -> Result<(), DriverClosed> {
        self.intents.send(intent).await.map_err(|_| DriverClosed)
    }

    pub async fn start(&self, setup: GameSetup) -> Result<(), DriverClosed> {
        self.send(Intent::Start(setup)).await
    }

    pub async fn play(
        &self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<(), DriverClosed> {
        self.send(Intent::Move {
            from,
            to,
            promotion,
        })
        .await
    }

    pub async fn toggle_pause(&self) -> Result<(), DriverClosed> {
        self.send(Intent::TogglePause).await
    }

    pub async fn reset(&self) -> Result<(), DriverClosed> {
        self.send(Intent::Reset).await
    }

    pub async fn hint(&self) -> Result<(), DriverClosed> {
        self.send(Intent::Hint).await
    }

    pub async fn chat(&self, line: impl Into<String>) -> Result<(), DriverClosed> {
        self.send(Intent::Chat(line.into())).await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, DriverClosed> {
        let (tx, rx) = oneshot::channel();
        self.send(Intent::Snapshot(tx)).await?;
        rx.await.map_err(|_| DriverClosed)
    }

    pub async fn transcript(&self) -> Result<Vec<ChatMessage>, DriverClosed> {
        let (tx, rx) = oneshot::channel();
        self.send(Intent::Transcript(tx)).await?;
        rx.await.map_err(|_| DriverClosed)
    }

    pub async fn destinations(&self, from: Square) -> Result<Vec<Square>, DriverClosed> {
        let (tx, rx) = oneshot::channel();
        self.send(Intent::Destinations { from, reply: tx }).await?;
        rx.await.map_err(|_| DriverClosed)
    }

    pub async fn shutdown(&self) -> Result<(), DriverClosed> {
        self.send(Intent::Shutdown).await
    }
}

/// Pending computer move.
#[derive(Debug, Clone, Copy)]
struct Thinking {
    /// Session epoch the thinking started in.
    epoch: u64,
    /// Reasoning steps published so far.
    step: usize,
    deadline: Instant,
}

/// Next clock tick and the side it was armed for.
#[derive(Debug, Clone, Copy)]
struct ClockTimer {
    side: Side,
    at: Instant,
}

/// An engine search handed back by its task.
struct SearchDone {
    epoch: u64,
    slot: EngineSlot,
    result: Result<EngineAnalysis, EngineError>,
}

pub struct GameDriver<O = StandardRules> {
    session: Session<O>,
    policy: MovePolicy,
    /// `None` while a search task holds the slot.
    engine: Option<EngineSlot>,
    /// Epoch of the search in flight, if any.
    searching: Option<u64>,
    search_done: mpsc::UnboundedSender<SearchDone>,
    searches: mpsc::UnboundedReceiver<SearchDone>,
    transcript: Transcript,
    /// Commentary picks and thinking durations.
    rng: StdRng,
    initial_delay: Duration,
    think_step: RangeInclusive<u64>,
    intents: mpsc::Receiver<Intent>,
    events: mpsc::UnboundedSender<DriverEvent>,
    thinking: Option<Thinking>,
    clock_timer: Option<ClockTimer>,
}

impl GameDriver<StandardRules> {
    /// Spawns a driver for standard chess configured from `config`.
    pub fn spawn(
        config: &GameConfig,
    ) -> (
        DriverHandle,
        mpsc::UnboundedReceiver<DriverEvent>,
        JoinHandle<()>,
    ) {
        let session = Session::new(StandardRules, config);
        let policy = match config.seed {
            Some(seed) => MovePolicy::seeded(seed),
            None => MovePolicy::new(),
        };
        let engine = EngineSlot::new(config.engine.clone());
        let (driver, handle, events) = GameDriver::new(session, policy, engine, config);
        let task = tokio::spawn(driver.run());
        (handle, events, task)
    }
}

impl<O: RulesOracle> GameDriver<O> {
    pub fn new(
        session: Session<O>,
        policy: MovePolicy,
        engine: EngineSlot,
        config: &GameConfig,
    ) -> (Self, DriverHandle, mpsc::UnboundedReceiver<DriverEvent>) {
        let (intent_tx, intent_rx) = mpsc::channel(INTENT_BUFFER);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (search_tx, search_rx) = mpsc::unbounded_channel();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        let driver = GameDriver {
            session,
            policy,
            engine: Some(engine),
            searching: None,
            search_done: search_tx,
            searches: search_rx,
            transcript: Transcript::new(),
            rng,
            initial_delay: config.initial_delay(),
            think_step: config.think_step_range(),
            intents: intent_rx,
            events: event_tx,
            thinking: None,
            clock_timer: None,
        };
        (
            driver,
            DriverHandle { intents: intent_tx },
            event_rx,
        )
    }

    /// Runs until [`Intent::Shutdown`] or until every handle is dropped.
    pub async fn run(mut self) {
        tracing::info!("Game driver started");
        loop {
            let tick_at = self.clock_timer.map(|t| t.at);
            let think_at = self.thinking.map(|t| t.deadline);

            tokio::select! {
                intent = self.intents.recv() => match intent {
                    Some(Intent::Shutdown) | None => break,
                    Some(intent) => self.handle(intent).await,
                },
                _ = sleep_until(tick_at.unwrap_or_else(Instant::now)), if tick_at.is_some() => {
                    self.on_clock_tick();
                }
                _ = sleep_until(think_at.unwrap_or_else(Instant::now)), if think_at.is_some() => {
                    self.on_think_deadline();
                }
                Some(done) = self.searches.recv() => self.on_search_done(done),
            }

            self.sync_timers();
        }
        if let Some(mut slot) = self.engine.take() {
            slot.close().await;
        }
        tracing::info!("Game driver stopped");
    }

    fn emit(&self, event: DriverEvent) {
        // Nobody listening is fine; the session keeps going.
        let _ = self.events.send(event);
    }

    fn say(&mut self, message: ChatMessage) {
        let message = self.transcript.push(message).clone();
        self.emit(DriverEvent::Chat(message));
    }

    async fn handle(&mut self, intent: Intent) {
        match intent {
            Intent::Start(setup) => self.start(setup).await,
            Intent::Move {
                from,
                to,
                promotion,
            } => self.player_move(from, to, promotion),
            Intent::TogglePause => match self.session.toggle_pause() {
                Ok(phase) => self.emit(DriverEvent::PhaseChanged(phase)),
                Err(e) => self.reject(e),
            },
            Intent::Reset => self.reset(),
            Intent::Hint => self.hint(),
            Intent::Chat(line) => self.chat(line).await,
            Intent::Snapshot(reply) => {
                let _ = reply.send(self.session.snapshot());
            }
            Intent::Transcript(reply) => {
                let _ = reply.send(self.transcript.messages().to_vec());
            }
            Intent::Destinations { from, reply } => {
                let squares = self.session.legal_destinations(from).unwrap_or_default();
                let _ = reply.send(squares);
            }
            Intent::Shutdown => {}
        }
    }

    fn reject(&self, err: SessionError) {
        tracing::debug!("Rejected: {}", err);
        self.emit(DriverEvent::Rejected(err));
    }

    async fn start(&mut self, setup: GameSetup) {
        if let Err(e) = self.session.start(setup) {
            self.reject(e);
            return;
        }
        self.thinking = None;
        if let Some(slot) = self.engine.as_mut() {
            slot.new_game().await;
        }
        self.emit(DriverEvent::Started(setup));
        self.emit(DriverEvent::PhaseChanged(self.session.phase()));
        self.say(ChatMessage::system(format!(
            "New game. You play {} against {} ({}).",
            setup.player_side, setup.model, setup.tier
        )));
    }

    fn reset(&mut self) {
        self.session.reset();
        self.thinking = None;
        self.emit(DriverEvent::Reset);
        self.emit(DriverEvent::PhaseChanged(GamePhase::Idle));
    }

    fn player_move(&mut self, from: Square, to: Square, promotion: Option<PieceKind>) {
        let outcome = match self.session.apply_player_move(from, to, promotion) {
            Ok(outcome) => outcome,
            Err(e) => return self.reject(e),
        };
        self.publish_move(&outcome);

        let san = outcome.mv.san.clone();
        self.say(
            ChatMessage::user(format!("Played {}", outcome.mv)).with_san(san),
        );
        if let Some(critique) = player_critique(&outcome.mv, &mut self.rng) {
            self.say(ChatMessage::agent(MessageTag::Critique, critique));
        }
        if outcome.status == GameStatus::Check {
            self.say(ChatMessage::tip("Check!"));
        }
        self.announce_result(&outcome);
    }

    fn hint(&mut self) {
        if !self.session.is_player_turn() {
            self.say(ChatMessage::tip("Wait for your turn."));
            return;
        }
        match self.session.hint(&mut self.policy) {
            Ok(mv) => {
                self.emit(DriverEvent::Hint(mv.clone()));
                self.say(ChatMessage::tip(format!("Try {}.", mv)));
            }
            Err(e) => self.reject(e),
        }
    }

    async fn chat(&mut self, line: String) {
        let command = line.trim().to_lowercase();
        match command.as_str() {
            "" => {}
            "help" => self.say(ChatMessage::tip(
                "Commands: \"new\", \"hint\". Or ask strategy questions!",
            )),
            "hint" | "suggest" => self.hint(),
            "new" | "reset" => {
                self.reset();
                self.say(ChatMessage::system(
                    "Board reset. Start a new game when ready.",
                ));
            }
            _ => {
                let answer = strategy_answer(&line, self.session.setup().model);
                self.say(ChatMessage::user(line));
                self.say(ChatMessage::agent(MessageTag::Agent, answer));
            }
        }
    }

    fn on_clock_tick(&mut self) {
        let due = self.clock_timer.take().map_or_else(Instant::now, |t| t.at);
        let tick = self.session.tick();
        if tick == Tick::Stopped {
            return;
        }
        let clock = self.session.clock();
        self.emit(DriverEvent::Clock {
            white: clock.white,
            black: clock.black,
        });
        if let (Tick::FlagFell(side), GamePhase::Flagged(_)) = (tick, self.session.phase()) {
            self.thinking = None;
            self.emit(DriverEvent::PhaseChanged(self.session.phase()));
            if let Some(text) =
                result_announcement(self.session.phase(), side, self.session.player_side())
            {
                self.say(ChatMessage::system(text));
            }
        }
        // Next tick is one period after this one was due.
        if let Some(side) = self.session.clock().ticking_side() {
            self.clock_timer = Some(ClockTimer {
                side,
                at: due + CLOCK_PERIOD,
            });
        }
    }

    fn on_think_deadline(&mut self) {
        let Some(mut thinking) = self.thinking.take() else {
            return;
        };
        if thinking.epoch != self.session.epoch() || !self.session.is_ai_turn() {
            tracing::debug!("Dropping stale computer thinking");
            return;
        }

        if thinking.step < REASONING_STEPS.len() {
            let text = REASONING_STEPS[thinking.step];
            thinking.step += 1;
            self.emit(DriverEvent::Reasoning {
                step: thinking.step,
                text,
            });
            let pause = self.rng.gen_range(self.think_step.clone());
            thinking.deadline = Instant::now() + Duration::from_millis(pause);
            self.thinking = Some(thinking);
            return;
        }

        self.computer_move(thinking.epoch);
    }

    /// Lends the engine slot to a search task, or plays the built-in
    /// policy's move straight away when the engine is disabled or still
    /// busy with an abandoned search.
    fn computer_move(&mut self, epoch: u64) {
        match self.engine.take() {
            Some(mut slot) if slot.is_enabled() => {
                let fen = self.session.position().as_fen().to_string();
                let tier = self.session.tier();
                let done = self.search_done.clone();
                self.searching = Some(epoch);
                tracing::debug!(epoch, "Engine search started");
                tokio::spawn(async move {
                    let result = slot.best_move(&fen, tier).await;
                    // The driver is gone when this fails; the slot drops with it.
                    let _ = done.send(SearchDone {
                        epoch,
                        slot,
                        result,
                    });
                });
            }
            slot => {
                self.engine = slot;
                let outcome = self.session.play_ai_move(&mut self.policy);
                self.finish_computer_move(outcome);
            }
        }
    }

    fn on_search_done(&mut self, done: SearchDone) {
        self.engine = Some(done.slot);
        self.searching = None;
        if done.epoch != self.session.epoch() || !self.session.is_ai_turn() {
            tracing::debug!(epoch = done.epoch, "Dropping stale engine search");
            return;
        }
        let outcome = match self.engine_outcome(done.result) {
            Some(outcome) => Ok(outcome),
            None => self.session.play_ai_move(&mut self.policy),
        };
        self.finish_computer_move(outcome);
    }

    fn finish_computer_move(&mut self, outcome: Result<MoveOutcome, SessionError>) {
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Computer failed to move: {}", e);
                return self.reject(e);
            }
        };
        self.publish_move(&outcome);

        let text = ai_commentary(&outcome.mv, outcome.status, &mut self.rng);
        let san = outcome.mv.san.clone();
        self.say(ChatMessage::agent(MessageTag::Agent, text).with_san(san));
        self.announce_result(&outcome);
    }

    /// Applies the engine's answer. `None` means the built-in policy should
    /// pick instead.
    fn engine_outcome(
        &mut self,
        result: Result<EngineAnalysis, EngineError>,
    ) -> Option<MoveOutcome> {
        let analysis = match result {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!("Engine unavailable, using built-in policy: {}", e);
                return None;
            }
        };
        let mv = match Move::from_uci(&analysis.best_move) {
            Ok(mv) => mv,
            Err(e) => {
                tracing::warn!("Engine sent an unreadable move: {}", e);
                return None;
            }
        };
        match self.session.apply_ai_move(mv.from, mv.to, mv.promotion) {
            Ok(outcome) => {
                tracing::debug!(score = ?analysis.score, depth = ?analysis.depth, "Engine move");
                Some(outcome)
            }
            Err(e) => {
                tracing::warn!("Engine move {} rejected: {}", analysis.best_move, e);
                None
            }
        }
    }

    fn publish_move(&self, outcome: &MoveOutcome) {
        self.emit(DriverEvent::MoveApplied {
            mv: outcome.mv.clone(),
            mover: outcome.mover,
            status: outcome.status,
        });
        if outcome.phase != GamePhase::Active {
            self.emit(DriverEvent::PhaseChanged(outcome.phase));
        }
    }

    fn announce_result(&mut self, outcome: &MoveOutcome) {
        if let Some(text) =
            result_announcement(outcome.phase, outcome.mover, self.session.player_side())
        {
            self.say(ChatMessage::system(text));
        }
    }

    /// Arms or disarms the clock tick and the thinking timer to match the
    /// session.
    fn sync_timers(&mut self) {
        match (self.session.clock_should_run(), self.session.clock().ticking_side()) {
            (true, Some(side)) => {
                let rearm = self.clock_timer.map_or(true, |t| t.side != side);
                if rearm {
                    self.clock_timer = Some(ClockTimer {
                        side,
                        at: Instant::now() + CLOCK_PERIOD,
                    });
                }
            }
            _ => self.clock_timer = None,
        }

        if !self.session.is_ai_turn() {
            self.thinking = None;
        } else if self.searching == Some(self.session.epoch()) {
            // The engine is on it.
        } else if self.thinking.map_or(true, |t| t.epoch != self.session.epoch()) {
            tracing::debug!("Computer starts thinking");
            self.thinking = Some(Thinking {
                epoch: self.session.epoch(),
                step: 0,
                deadline: Instant::now() + self.initial_delay,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AiModel, EngineConfig, SkillTier, UciEngine};
    use gambit_uci::EngineCommand;

    fn setup(player_side: Side) -> GameSetup {
        GameSetup {
            player_side,
            tier: SkillTier::Club,
            model: AiModel::Claude,
        }
    }

    fn driver_with(
        engine: EngineSlot,
    ) -> (DriverHandle, mpsc::UnboundedReceiver<DriverEvent>) {
        let config = GameConfig {
            seed: Some(42),
            ..GameConfig::default()
        };
        let session = Session::new(StandardRules, &config);
        let (driver, handle, events) =
            GameDriver::new(session, MovePolicy::seeded(42), engine, &config);
        tokio::spawn(driver.run());
        (handle, events)
    }

    fn spawn_driver() -> (DriverHandle, mpsc::UnboundedReceiver<DriverEvent>) {
        driver_with(EngineSlot::disabled())
    }

    async fn next_move(events: &mut mpsc::UnboundedReceiver<DriverEvent>) -> (Move, Vec<DriverEvent>) {
        let mut seen = Vec::new();
        while let Some(event) = events.recv().await {
            if let DriverEvent::MoveApplied { mv, .. } = &event {
                return (mv.clone(), seen);
            }
            seen.push(event);
        }
        panic!("driver stopped before a move was applied");
    }

    #[tokio::test(start_paused = true)]
    async fn computer_opens_after_reasoning_steps() {
        let (handle, mut events) = spawn_driver();
        let began = Instant::now();
        handle.start(setup(Side::Black)).await.unwrap();

        let (_, before) = next_move(&mut events).await;
        let elapsed = began.elapsed();

        let steps: Vec<usize> = before
            .iter()
            .filter_map(|e| match e {
                DriverEvent::Reasoning { step, .. } => Some(*step),
                _ => None,
            })
            .collect();
        assert_eq!(steps, vec![1, 2, 3, 4, 5, 6]);
        assert!(elapsed >= Duration::from_millis(500 + 6 * 400));
        assert!(elapsed <= Duration::from_millis(500 + 6 * 700 + 50));

        let snap = handle.snapshot().await.unwrap();
        assert_eq!(snap.history.len(), 1);
        assert_eq!(snap.side_to_move, Side::Black);
        assert_eq!(snap.clock.running, Some(Side::Black));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_abandons_thinking() {
        let (handle, mut events) = spawn_driver();
        handle.start(setup(Side::Black)).await.unwrap();
        while let Some(event) = events.recv().await {
            if matches!(event, DriverEvent::Reasoning { step: 2, .. }) {
                break;
            }
        }
        handle.reset().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        let snap = handle.snapshot().await.unwrap();
        assert_eq!(snap.phase, GamePhase::Idle);
        assert!(snap.history.is_empty());
        while let Ok(event) = events.try_recv() {
            assert!(!matches!(event, DriverEvent::MoveApplied { .. }));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_the_clock() {
        let (handle, _events) = spawn_driver();
        handle.start(setup(Side::White)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(handle.snapshot().await.unwrap().clock.white, 599);

        handle.toggle_pause().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        let snap = handle.snapshot().await.unwrap();
        assert_eq!(snap.phase, GamePhase::Paused);
        assert_eq!(snap.clock.white, 599);
        assert_eq!(snap.clock.black, 600);

        handle.toggle_pause().await.unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(handle.snapshot().await.unwrap().clock.white, 598);
    }

    #[tokio::test(start_paused = true)]
    async fn player_move_is_narrated_and_answered() {
        let (handle, mut events) = spawn_driver();
        handle.start(setup(Side::White)).await.unwrap();
        handle
            .play("e2".parse().unwrap(), "e4".parse().unwrap(), None)
            .await
            .unwrap();

        let (mv, _) = next_move(&mut events).await;
        assert_eq!(mv.san.as_deref(), Some("e4"));
        let (reply, _) = next_move(&mut events).await;
        let snap = handle.snapshot().await.unwrap();
        assert_eq!(snap.history.len(), 2);
        assert_eq!(snap.side_to_move, Side::White);

        let transcript = handle.transcript().await.unwrap();
        let played = transcript
            .iter()
            .find(|m| m.content == "Played e4")
            .expect("player move narrated");
        assert_eq!(played.san.as_deref(), Some("e4"));
        assert!(transcript
            .iter()
            .any(|m| m.tag == Some(MessageTag::Agent) && m.san == reply.san));
    }

    #[tokio::test(start_paused = true)]
    async fn illegal_and_out_of_turn_moves_are_rejected() {
        let (handle, mut events) = spawn_driver();
        handle.start(setup(Side::White)).await.unwrap();
        handle
            .play("e2".parse().unwrap(), "e5".parse().unwrap(), None)
            .await
            .unwrap();

        loop {
            match events.recv().await {
                Some(DriverEvent::Rejected(err)) => {
                    assert!(matches!(err, SessionError::IllegalMove { .. }));
                    break;
                }
                Some(_) => continue,
                None => panic!("driver stopped"),
            }
        }
        assert!(handle.snapshot().await.unwrap().history.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn hint_waits_for_the_players_turn() {
        let (handle, _events) = spawn_driver();
        handle.start(setup(Side::Black)).await.unwrap();
        handle.chat("hint").await.unwrap();
        let transcript = handle.transcript().await.unwrap();
        assert_eq!(
            transcript.last().map(|m| m.content.as_str()),
            Some("Wait for your turn.")
        );

        let (handle, mut events) = spawn_driver();
        handle.start(setup(Side::White)).await.unwrap();
        handle.hint().await.unwrap();
        loop {
            match events.recv().await {
                Some(DriverEvent::Hint(mv)) => {
                    assert!(mv.san.is_some());
                    break;
                }
                Some(_) => continue,
                None => panic!("driver stopped"),
            }
        }
        let snap = handle.snapshot().await.unwrap();
        assert!(snap.history.is_empty());
        assert_eq!(snap.hints_used, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn chat_routes_help_and_questions() {
        let (handle, _events) = spawn_driver();
        handle.start(setup(Side::White)).await.unwrap();
        handle.chat("help").await.unwrap();
        handle.chat("How do I castle?").await.unwrap();

        let transcript = handle.transcript().await.unwrap();
        let n = transcript.len();
        assert!(transcript[n - 3].content.starts_with("Commands:"));
        assert_eq!(transcript[n - 2].content, "How do I castle?");
        assert!(transcript[n - 1].content.starts_with("[Claude] Keep your king"));
    }

    /// In-memory engine that answers every search with g1f3 after `think`.
    /// Each `go` it receives is reported on the returned channel.
    fn scripted_engine(think: Duration) -> (EngineSlot, mpsc::UnboundedReceiver<()>) {
        let (cmd_tx, mut cmd_rx) = mpsc::channel::<String>(32);
        let (line_tx, line_rx) = mpsc::channel::<String>(32);
        let (go_tx, go_rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(line) = cmd_rx.recv().await {
                let replies: Vec<&str> = match EngineCommand::parse(&line) {
                    Ok(EngineCommand::Uci) => vec!["uciok"],
                    Ok(EngineCommand::IsReady) => vec!["readyok"],
                    Ok(EngineCommand::Go(_)) => {
                        let _ = go_tx.send(());
                        tokio::time::sleep(think).await;
                        vec!["info depth 3 score cp 30 pv g1f3", "bestmove g1f3"]
                    }
                    _ => vec![],
                };
                for reply in replies {
                    let _ = line_tx.send(reply.to_string()).await;
                }
            }
        });
        let engine = UciEngine::from_channels(cmd_tx, line_rx, Duration::from_secs(10));
        (EngineSlot::with_engine(EngineConfig::default(), engine), go_rx)
    }

    #[tokio::test(start_paused = true)]
    async fn engine_move_is_preferred() {
        let (slot, _searches) = scripted_engine(Duration::ZERO);
        let (handle, mut events) = driver_with(slot);

        handle.start(setup(Side::Black)).await.unwrap();
        let (mv, _) = next_move(&mut events).await;
        assert_eq!(mv.san.as_deref(), Some("Nf3"));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_engine_falls_back_to_policy() {
        let (cmd_tx, mut cmd_rx) = mpsc::channel::<String>(32);
        let (_line_tx, line_rx) = mpsc::channel::<String>(32);
        tokio::spawn(async move { while cmd_rx.recv().await.is_some() {} });
        let engine = UciEngine::from_channels(cmd_tx, line_rx, Duration::from_secs(10));
        let (handle, mut events) =
            driver_with(EngineSlot::with_engine(EngineConfig::default(), engine));

        let began = Instant::now();
        handle.start(setup(Side::Black)).await.unwrap();
        next_move(&mut events).await;
        assert!(began.elapsed() >= Duration::from_secs(10));
        let snap = handle.snapshot().await.unwrap();
        assert_eq!(snap.history.len(), 1);
        assert_eq!(snap.side_to_move, Side::Black);
    }

    #[tokio::test(start_paused = true)]
    async fn engine_search_leaves_the_driver_responsive() {
        let (slot, mut searches) = scripted_engine(Duration::from_secs(8));
        let (handle, mut events) = driver_with(slot);
        let began = Instant::now();
        handle.start(setup(Side::Black)).await.unwrap();

        // Reasoning is over by now and the engine is mid-search.
        tokio::time::sleep(Duration::from_millis(5500)).await;
        assert!(searches.try_recv().is_ok());
        let snap = handle.snapshot().await.unwrap();
        assert!(began.elapsed() < Duration::from_secs(6));
        assert_eq!(snap.clock.white, 595);
        assert!(snap.history.is_empty());

        handle.toggle_pause().await.unwrap();
        assert_eq!(handle.snapshot().await.unwrap().phase, GamePhase::Paused);
        handle.reset().await.unwrap();

        // The answer lands after the reset and must be ignored.
        tokio::time::sleep(Duration::from_secs(10)).await;
        let snap = handle.snapshot().await.unwrap();
        assert_eq!(snap.phase, GamePhase::Idle);
        assert!(snap.history.is_empty());
        while let Ok(event) = events.try_recv() {
            assert!(!matches!(event, DriverEvent::MoveApplied { .. }));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn engine_answer_after_pause_is_discarded() {
        let (slot, mut searches) = scripted_engine(Duration::from_secs(8));
        let (handle, mut events) = driver_with(slot);
        handle.start(setup(Side::Black)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5500)).await;
        assert!(searches.try_recv().is_ok());

        // Pause then resume: the search belongs to an older epoch.
        handle.toggle_pause().await.unwrap();
        handle.toggle_pause().await.unwrap();
        let (mv, _) = next_move(&mut events).await;

        // The engine is still busy with the abandoned search, so the
        // built-in policy moves. The late answer is never applied.
        tokio::time::sleep(Duration::from_secs(5)).await;
        let snap = handle.snapshot().await.unwrap();
        assert_eq!(snap.history.len(), 1);
        assert_eq!(snap.history[0].san, mv.san);
        assert_eq!(snap.side_to_move, Side::Black);
        assert!(searches.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn inverted_think_steps_do_not_stall_the_computer() {
        let config = GameConfig {
            seed: Some(7),
            think_step_min_ms: 600,
            think_step_max_ms: 100,
            ..GameConfig::default()
        };
        let session = Session::new(StandardRules, &config);
        let (driver, handle, mut events) =
            GameDriver::new(session, MovePolicy::seeded(7), EngineSlot::disabled(), &config);
        tokio::spawn(driver.run());

        let began = Instant::now();
        handle.start(setup(Side::Black)).await.unwrap();
        next_move(&mut events).await;
        assert!(began.elapsed() >= Duration::from_millis(500 + 6 * 600));
        assert_eq!(handle.snapshot().await.unwrap().history.len(), 1);
    }
}
