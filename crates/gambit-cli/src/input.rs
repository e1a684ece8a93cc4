//! Console line parsing.

use gambit_core::{Move, PieceKind, Square};

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Coordinate move such as `e2e4` or `e7e8q`.
    Move {
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    },
    /// Algebraic move such as `Nf3` or `O-O`, resolved against the position.
    San(String),
    New,
    Help,
    /// Forwarded to the chat console, which decides whether a hint is due.
    Hint(String),
    Pause,
    Board,
    Moves(Square),
    State,
    Quit,
    Chat(String),
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim();
        let lower = line.to_lowercase();
        let mut words = lower.split_whitespace();
        let head = words.next().unwrap_or("");

        match head {
            "" => return Command::Empty,
            "new" | "reset" => return Command::New,
            "help" | "?" => return Command::Help,
            "hint" | "suggest" => return Command::Hint(line.to_string()),
            "pause" | "resume" => return Command::Pause,
            "board" | "fen" => return Command::Board,
            "state" => return Command::State,
            "quit" | "exit" => return Command::Quit,
            "moves" => {
                if let Some(Ok(square)) = words.next().map(str::parse::<Square>) {
                    return Command::Moves(square);
                }
            }
            _ => {}
        }

        if line.contains(char::is_whitespace) {
            return Command::Chat(line.to_string());
        }
        if let Ok(mv) = Move::from_uci(&lower) {
            return Command::Move {
                from: mv.from,
                to: mv.to,
                promotion: mv.promotion,
            };
        }
        if looks_like_san(line) {
            return Command::San(line.to_string());
        }
        Command::Chat(line.to_string())
    }
}

fn looks_like_san(word: &str) -> bool {
    if matches!(word, "O-O" | "O-O-O" | "0-0" | "0-0-0") {
        return true;
    }
    let allowed = |c: char| "KQRBNabcdefghx12345678=+#!?".contains(c);
    (2..=8).contains(&word.len())
        && word.chars().all(allowed)
        && word.chars().any(|c| c.is_ascii_digit())
}
