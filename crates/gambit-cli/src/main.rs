//! gambit - play chess against a heuristic computer opponent in the terminal.
//!
//! Reads one command per line from stdin and prints what the game driver
//! reports. Logs go to stderr and are filtered with `RUST_LOG`.

mod board;
mod input;

use anyhow::Context;
use clap::Parser;
use gambit_core::Side;
use gambit_rules::{Position, RulesOracle, StandardRules};
use gambit_session::{
    AiModel, DriverEvent, DriverHandle, GameConfig, GameDriver, GameSetup, MessageKind, SkillTier,
};
use input::Command;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Play chess against the computer.
#[derive(Parser)]
#[command(name = "gambit")]
#[command(about = "Play chess against a heuristic computer opponent")]
struct Args {
    /// Side you play (white or black)
    #[arg(long, default_value = "white")]
    side: Side,

    /// Computer strength: novice, club or grandmaster
    #[arg(long, default_value = "club")]
    skill: SkillTier,

    /// Opponent label shown in chat
    #[arg(long, default_value = "default")]
    model: AiModel,

    /// UCI engine executable to consult before the built-in policy
    #[arg(long)]
    engine: Option<String>,

    /// Seed for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Configuration file (defaults to ./gambit.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

const HELP: &str = "\
Commands:
  e2e4, e7e8q      move in coordinate notation
  Nf3, O-O, exd5   move in algebraic notation
  moves <square>   legal destinations from a square
  hint             suggest a move
  pause            pause or resume
  board            show the board and FEN
  state            dump the session as JSON
  new              start over
  quit             leave
Anything else goes to the chat console.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut config = GameConfig::load(args.config.as_deref())?;
    if let Some(path) = args.engine {
        config.engine.enabled = true;
        config.engine.path = path;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let setup = GameSetup {
        player_side: args.side,
        tier: args.skill,
        model: args.model,
    };
    tracing::info!("Starting gambit: {:?}", setup);

    let (handle, mut events, driver) = GameDriver::spawn(&config);

    let printer = {
        let handle = handle.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                print_event(&event, &handle, setup.player_side).await;
            }
        })
    };

    handle.start(setup).await?;
    println!("Type \"help\" for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => {
                println!("{}", HELP);
                handle.chat("help").await?;
            }
            Command::New => {
                handle.reset().await?;
                handle.start(setup).await?;
            }
            Command::Hint(text) => handle.chat(text).await?,
            Command::Pause => handle.toggle_pause().await?,
            Command::Board => {
                let snap = handle.snapshot().await?;
                println!("{}", board::render(&snap.fen, setup.player_side)?);
                println!("{}", snap.fen);
            }
            Command::State => {
                let snap = handle.snapshot().await?;
                println!("{}", serde_json::to_string_pretty(&snap)?);
            }
            Command::Moves(square) => {
                let squares = handle.destinations(square).await?;
                if squares.is_empty() {
                    println!("No legal moves from {}.", square);
                } else {
                    let list: Vec<String> = squares.iter().map(|s| s.to_string()).collect();
                    println!("{}: {}", square, list.join(" "));
                }
            }
            Command::Move {
                from,
                to,
                promotion,
            } => handle.play(from, to, promotion).await?,
            Command::San(san) => play_san(&handle, &san).await?,
            Command::Chat(text) => handle.chat(text).await?,
        }
    }

    handle.shutdown().await.ok();
    driver.await.context("game driver panicked")?;
    printer.await.context("event printer panicked")?;
    Ok(())
}

/// Resolves `san` against the current position and plays it.
async fn play_san(handle: &DriverHandle, san: &str) -> anyhow::Result<()> {
    let snap = handle.snapshot().await?;
    let position = Position::from_fen(&snap.fen)?;
    match StandardRules.find_san(&position, san) {
        Ok(mv) => handle.play(mv.from, mv.to, mv.promotion).await?,
        Err(e) => println!("! {}", e),
    }
    Ok(())
}

async fn print_event(event: &DriverEvent, handle: &DriverHandle, player: Side) {
    match event {
        DriverEvent::MoveApplied { mv, mover, .. } => {
            println!("{} played {}", mover, mv);
            if let Ok(snap) = handle.snapshot().await {
                if let Ok(board) = board::render(&snap.fen, player) {
                    println!("{}", board);
                }
                println!(
                    "White {} | Black {}",
                    format_clock(snap.clock.white),
                    format_clock(snap.clock.black)
                );
            }
        }
        DriverEvent::PhaseChanged(phase) => println!("[{}]", phase),
        DriverEvent::Reasoning { text, .. } => println!("  {}", text),
        DriverEvent::Chat(message) => match (message.kind, message.tag) {
            (MessageKind::User, _) => {}
            (MessageKind::System, _) => println!("* {}", message.content),
            (_, Some(tag)) => println!("{:?}: {}", tag, message.content),
            (_, None) => println!("{}", message.content),
        },
        DriverEvent::Rejected(err) => println!("! {}", err),
        DriverEvent::Reset => println!("Board reset."),
        DriverEvent::Clock { white, black } => {
            tracing::trace!(white, black, "clock");
        }
        DriverEvent::Started(_) | DriverEvent::Hint(_) => {}
    }
}

fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
