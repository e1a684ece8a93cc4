//! Optional external UCI engine.
//!
//! The engine is never on the critical path: every failure or timeout is
//! reported as an [`EngineError`] and the caller falls back to the built-in
//! move policy. Lines travel over a pair of mpsc channels, so a real child
//! process and an in-memory test engine look the same to [`UciEngine`].

use crate::{EngineConfig, SkillTier};
use gambit_uci::{EngineCommand, EngineInfo, EngineMessage, GoOptions, Score};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Errors that can occur when working with an external engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Engine executable was not found.
    #[error("Engine not found at path: {0}")]
    NotFound(String),
    /// Failed to spawn the engine process.
    #[error("Failed to spawn engine: {0}")]
    Spawn(#[source] std::io::Error),
    /// No engine is configured.
    #[error("Engine unavailable: {0}")]
    Unavailable(String),
    /// The engine did not answer in time.
    #[error("Engine did not send '{waiting_for}' within {timeout:?}")]
    Timeout {
        waiting_for: &'static str,
        timeout: Duration,
    },
    /// The engine's pipes closed.
    #[error("Engine connection closed")]
    Closed,
    /// The engine answered with something unusable.
    #[error("Invalid engine response: {0}")]
    Protocol(String),
}

/// Result of one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineAnalysis {
    /// Best move in coordinate notation, e.g. "e2e4".
    pub best_move: String,
    pub score: Option<Score>,
    pub depth: Option<u32>,
    pub pv: Vec<String>,
}

/// A connection to one UCI engine.
pub struct UciEngine {
    commands: mpsc::Sender<String>,
    lines: mpsc::Receiver<String>,
    child: Option<Child>,
    timeout: Duration,
    name: Option<String>,
}

impl UciEngine {
    /// Wraps an existing pair of channels: `commands` carries lines to the
    /// engine, `lines` carries its output.
    pub fn from_channels(
        commands: mpsc::Sender<String>,
        lines: mpsc::Receiver<String>,
        timeout: Duration,
    ) -> Self {
        UciEngine {
            commands,
            lines,
            child: None,
            timeout,
            name: None,
        }
    }

    /// Spawns the engine process and pumps its stdin/stdout through
    /// channels. Must be called inside a tokio runtime.
    pub fn spawn(path: &str, timeout: Duration) -> Result<Self, EngineError> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => EngineError::NotFound(path.to_string()),
                _ => EngineError::Spawn(e),
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Protocol("engine stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Protocol("engine stdout unavailable".to_string()))?;

        let (cmd_tx, mut cmd_rx) = mpsc::channel::<String>(64);
        let (line_tx, line_rx) = mpsc::channel::<String>(256);

        tokio::spawn(async move {
            while let Some(cmd) = cmd_rx.recv().await {
                if stdin.write_all(cmd.as_bytes()).await.is_err()
                    || stdin.write_all(b"\n").await.is_err()
                    || stdin.flush().await.is_err()
                {
                    break;
                }
            }
        });

        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if line_tx.send(line).await.is_err() {
                    break;
                }
            }
        });

        tracing::info!("Spawned engine {}", path);
        let mut engine = Self::from_channels(cmd_tx, line_rx, timeout);
        engine.child = Some(child);
        Ok(engine)
    }

    /// Name reported by `id name`, once the handshake is done.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    async fn send(&self, cmd: EngineCommand) -> Result<(), EngineError> {
        let line = cmd.to_uci();
        tracing::trace!(">> {}", line);
        self.commands
            .send(line)
            .await
            .map_err(|_| EngineError::Closed)
    }

    async fn next_message(
        &mut self,
        deadline: Instant,
        waiting_for: &'static str,
    ) -> Result<EngineMessage, EngineError> {
        match tokio::time::timeout_at(deadline, self.lines.recv()).await {
            Err(_) => {
                tracing::warn!("Engine timed out waiting for {}", waiting_for);
                Err(EngineError::Timeout {
                    waiting_for,
                    timeout: self.timeout,
                })
            }
            Ok(None) => Err(EngineError::Closed),
            Ok(Some(line)) => {
                tracing::trace!("<< {}", line);
                Ok(EngineMessage::parse(&line))
            }
        }
    }

    /// `uci` → `uciok`, then `isready` → `readyok`.
    pub async fn open(&mut self) -> Result<(), EngineError> {
        self.send(EngineCommand::Uci).await?;
        let deadline = Instant::now() + self.timeout;
        loop {
            match self.next_message(deadline, "uciok").await? {
                EngineMessage::Id {
                    name: Some(name), ..
                } => self.name = Some(name),
                EngineMessage::UciOk => break,
                _ => {}
            }
        }
        self.is_ready().await?;
        tracing::info!(
            "Engine ready: {}",
            self.name.as_deref().unwrap_or("Unknown Engine")
        );
        Ok(())
    }

    /// `isready` → `readyok`.
    pub async fn is_ready(&mut self) -> Result<(), EngineError> {
        self.send(EngineCommand::IsReady).await?;
        let deadline = Instant::now() + self.timeout;
        while self.next_message(deadline, "readyok").await? != EngineMessage::ReadyOk {}
        Ok(())
    }

    /// Sets the engine's `Skill Level` for the tier.
    pub async fn set_skill(&mut self, tier: SkillTier) -> Result<(), EngineError> {
        self.send(EngineCommand::set_option("Skill Level", tier.engine_skill()))
            .await?;
        self.is_ready().await
    }

    pub async fn new_game(&mut self) -> Result<(), EngineError> {
        self.send(EngineCommand::UciNewGame).await?;
        self.is_ready().await
    }

    /// Searches `fen` to `depth` and returns the engine's choice.
    pub async fn analyze(&mut self, fen: &str, depth: u32) -> Result<EngineAnalysis, EngineError> {
        self.send(EngineCommand::position_fen(fen)).await?;
        self.send(EngineCommand::Go(GoOptions::depth(depth))).await?;

        let deadline = Instant::now() + self.timeout;
        let mut last = EngineInfo::default();
        loop {
            let msg = match self.next_message(deadline, "bestmove").await {
                Ok(msg) => msg,
                Err(e @ EngineError::Timeout { .. }) => {
                    let _ = self.send(EngineCommand::Stop).await;
                    return Err(e);
                }
                Err(e) => return Err(e),
            };

            match msg {
                EngineMessage::Info(info) if info.score.is_some() => last = info,
                EngineMessage::BestMove { .. } => {
                    let best = msg
                        .best_move()
                        .ok_or_else(|| EngineError::Protocol("engine has no move".to_string()))?;
                    return Ok(EngineAnalysis {
                        best_move: best.to_string(),
                        score: last.score,
                        depth: last.depth,
                        pv: last.pv,
                    });
                }
                _ => {}
            }
        }
    }

    /// Sends `quit` and reaps the process.
    pub async fn close(mut self) {
        let _ = self.send(EngineCommand::Quit).await;
        if let Some(mut child) = self.child.take() {
            if tokio::time::timeout(Duration::from_millis(100), child.wait())
                .await
                .is_err()
            {
                let _ = child.kill().await;
            }
        }
    }
}

/// Holds at most one engine, opened on first use.
pub struct EngineSlot {
    config: EngineConfig,
    engine: Option<UciEngine>,
    ready: bool,
}

impl EngineSlot {
    pub fn new(config: EngineConfig) -> Self {
        EngineSlot {
            config,
            engine: None,
            ready: false,
        }
    }

    /// A slot that never opens an engine.
    pub fn disabled() -> Self {
        Self::new(EngineConfig::default())
    }

    /// A slot with an engine already connected (but not yet handshaken).
    pub fn with_engine(mut config: EngineConfig, engine: UciEngine) -> Self {
        config.enabled = true;
        EngineSlot {
            config,
            engine: Some(engine),
            ready: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn is_open(&self) -> bool {
        self.ready
    }

    async fn connect(&mut self) -> Result<&mut UciEngine, EngineError> {
        if !self.config.enabled {
            return Err(EngineError::Unavailable("engine disabled".to_string()));
        }
        let engine = match self.engine.take() {
            Some(engine) => engine,
            None => UciEngine::spawn(&self.config.path, self.config.timeout())?,
        };
        let engine = self.engine.insert(engine);
        if !self.ready {
            engine.open().await?;
            self.ready = true;
        }
        Ok(engine)
    }

    async fn search(&mut self, fen: &str, tier: SkillTier) -> Result<EngineAnalysis, EngineError> {
        let engine = self.connect().await?;
        engine.set_skill(tier).await?;
        engine.analyze(fen, tier.engine_depth()).await
    }

    /// Asks the engine for a move at the tier's skill and depth.
    ///
    /// On failure the engine is dropped; the next call opens a fresh one.
    pub async fn best_move(
        &mut self,
        fen: &str,
        tier: SkillTier,
    ) -> Result<EngineAnalysis, EngineError> {
        let result = self.search(fen, tier).await;
        if let Err(e) = &result {
            tracing::warn!("Engine search failed: {}", e);
            self.close().await;
        }
        result
    }

    /// Tells an open engine that a new game starts. Does nothing when the
    /// engine has not been opened yet.
    pub async fn new_game(&mut self) {
        if !self.ready {
            return;
        }
        if let Some(engine) = self.engine.as_mut() {
            if let Err(e) = engine.new_game().await {
                tracing::warn!("Engine failed to start a new game: {}", e);
                self.close().await;
            }
        }
    }

    /// Closes the engine, if any.
    pub async fn close(&mut self) {
        self.ready = false;
        if let Some(engine) = self.engine.take() {
            engine.close().await;
        }
    }
}
