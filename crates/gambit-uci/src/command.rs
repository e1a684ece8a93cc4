//! Commands sent from the GUI to an engine.

use crate::UciError;

/// A command the session sends to an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    /// Switch the engine to UCI mode.
    Uci,
    /// Ask whether the engine is ready.
    IsReady,
    /// Tell the engine a new game begins.
    UciNewGame,
    /// Set an engine option.
    SetOption { name: String, value: Option<String> },
    /// Set up a position. `fen: None` means the standard start.
    Position {
        fen: Option<String>,
        moves: Vec<String>,
    },
    /// Start calculating.
    Go(GoOptions),
    /// Stop calculating.
    Stop,
    /// Quit the engine.
    Quit,
}

/// Options for the `go` command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GoOptions {
    /// Search to this depth.
    pub depth: Option<u32>,
    /// Search for exactly this time in milliseconds.
    pub movetime: Option<u64>,
    /// Search until `stop`.
    pub infinite: bool,
}

impl GoOptions {
    pub fn depth(depth: u32) -> Self {
        GoOptions {
            depth: Some(depth),
            ..Default::default()
        }
    }
}

impl EngineCommand {
    /// `setoption name <name> value <value>`.
    pub fn set_option(name: impl Into<String>, value: impl ToString) -> Self {
        EngineCommand::SetOption {
            name: name.into(),
            value: Some(value.to_string()),
        }
    }

    /// `position fen <fen>` with no trailing moves.
    pub fn position_fen(fen: impl Into<String>) -> Self {
        EngineCommand::Position {
            fen: Some(fen.into()),
            moves: Vec::new(),
        }
    }

    /// Format as a single UCI line (without newline).
    pub fn to_uci(&self) -> String {
        match self {
            EngineCommand::Uci => "uci".to_string(),
            EngineCommand::IsReady => "isready".to_string(),
            EngineCommand::UciNewGame => "ucinewgame".to_string(),
            EngineCommand::SetOption { name, value } => match value {
                Some(v) => format!("setoption name {} value {}", name, v),
                None => format!("setoption name {}", name),
            },
            EngineCommand::Position { fen, moves } => {
                let mut line = match fen {
                    Some(f) => format!("position fen {}", f),
                    None => "position startpos".to_string(),
                };
                if !moves.is_empty() {
                    line.push_str(" moves ");
                    line.push_str(&moves.join(" "));
                }
                line
            }
            EngineCommand::Go(opts) => {
                let mut parts = vec!["go".to_string()];
                if let Some(d) = opts.depth {
                    parts.push(format!("depth {}", d));
                }
                if let Some(t) = opts.movetime {
                    parts.push(format!("movetime {}", t));
                }
                if opts.infinite {
                    parts.push("infinite".to_string());
                }
                parts.join(" ")
            }
            EngineCommand::Stop => "stop".to_string(),
            EngineCommand::Quit => "quit".to_string(),
        }
    }

    /// Parse a UCI command line. Used by test engines that read what the
    /// session writes.
    pub fn parse(input: &str) -> Result<Self, UciError> {
        let input = input.trim();
        let mut parts = input.split_whitespace();

        match parts.next().unwrap_or("") {
            "uci" => Ok(EngineCommand::Uci),
            "isready" => Ok(EngineCommand::IsReady),
            "ucinewgame" => Ok(EngineCommand::UciNewGame),
            "stop" => Ok(EngineCommand::Stop),
            "quit" => Ok(EngineCommand::Quit),
            "setoption" => Self::parse_setoption(parts),
            "position" => Self::parse_position(parts),
            "go" => Ok(Self::parse_go(parts)),
            _ => Err(UciError::InvalidCommand(input.to_string())),
        }
    }

    fn parse_setoption<'a>(parts: impl Iterator<Item = &'a str>) -> Result<Self, UciError> {
        let parts: Vec<&str> = parts.collect();
        if parts.first() != Some(&"name") {
            return Err(UciError::ParseError("expected 'name'".to_string()));
        }
        let value_idx = parts.iter().position(|&s| s == "value");
        let name_end = value_idx.unwrap_or(parts.len());
        let name = parts[1..name_end].join(" ");
        if name.is_empty() {
            return Err(UciError::ParseError("empty option name".to_string()));
        }
        let value = value_idx.map(|i| parts[i + 1..].join(" "));
        Ok(EngineCommand::SetOption { name, value })
    }

    fn parse_position<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Self, UciError> {
        let fen = match parts.next() {
            Some("startpos") => None,
            Some("fen") => Some(String::new()),
            Some(other) => {
                return Err(UciError::ParseError(format!(
                    "Expected 'startpos' or 'fen', got '{}'",
                    other
                )))
            }
            None => {
                return Err(UciError::ParseError(
                    "Expected 'startpos' or 'fen'".to_string(),
                ))
            }
        };

        let rest: Vec<&str> = parts.collect();
        let moves_idx = rest.iter().position(|&s| s == "moves");
        let (fen_parts, moves) = match moves_idx {
            Some(i) => (&rest[..i], &rest[i + 1..]),
            None => (&rest[..], &rest[rest.len()..]),
        };

        let fen = match fen {
            Some(_) if fen_parts.is_empty() => {
                return Err(UciError::ParseError("empty FEN".to_string()))
            }
            Some(_) => Some(fen_parts.join(" ")),
            None => None,
        };

        Ok(EngineCommand::Position {
            fen,
            moves: moves.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn parse_go<'a>(parts: impl Iterator<Item = &'a str>) -> Self {
        let mut opts = GoOptions::default();
        let parts: Vec<&str> = parts.collect();
        let mut i = 0;

        while i < parts.len() {
            match parts[i] {
                "depth" => {
                    i += 1;
                    opts.depth = parts.get(i).and_then(|s| s.parse().ok());
                }
                "movetime" => {
                    i += 1;
                    opts.movetime = parts.get(i).and_then(|s| s.parse().ok());
                }
                "infinite" => opts.infinite = true,
                _ => {}
            }
            i += 1;
        }

        EngineCommand::Go(opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_simple_commands() {
        assert_eq!(EngineCommand::Uci.to_uci(), "uci");
        assert_eq!(EngineCommand::IsReady.to_uci(), "isready");
        assert_eq!(EngineCommand::UciNewGame.to_uci(), "ucinewgame");
        assert_eq!(EngineCommand::Quit.to_uci(), "quit");
    }

    #[test]
    fn format_setoption() {
        assert_eq!(
            EngineCommand::set_option("Skill Level", 12).to_uci(),
            "setoption name Skill Level value 12"
        );
    }

    #[test]
    fn format_position_and_go() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        assert_eq!(
            EngineCommand::position_fen(fen).to_uci(),
            format!("position fen {}", fen)
        );
        let startpos = EngineCommand::Position {
            fen: None,
            moves: vec!["e2e4".into(), "e7e5".into()],
        };
        assert_eq!(startpos.to_uci(), "position startpos moves e2e4 e7e5");
        assert_eq!(EngineCommand::Go(GoOptions::depth(18)).to_uci(), "go depth 18");
    }

    #[test]
    fn parse_setoption_with_spaces() {
        assert_eq!(
            EngineCommand::parse("setoption name Skill Level value 5").unwrap(),
            EngineCommand::SetOption {
                name: "Skill Level".into(),
                value: Some("5".into())
            }
        );
        assert!(EngineCommand::parse("setoption value 5").is_err());
    }

    #[test]
    fn parse_position_fen_with_moves() {
        let cmd = EngineCommand::parse(
            "position fen rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1 moves e7e5",
        )
        .unwrap();
        assert_eq!(
            cmd,
            EngineCommand::Position {
                fen: Some("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1".into()),
                moves: vec!["e7e5".into()]
            }
        );
    }

    #[test]
    fn parse_position_errors() {
        assert!(EngineCommand::parse("position").is_err());
        assert!(EngineCommand::parse("position fen").is_err());
        assert!(EngineCommand::parse("position somewhere").is_err());
    }

    #[test]
    fn parse_go_depth() {
        assert_eq!(
            EngineCommand::parse("go depth 10").unwrap(),
            EngineCommand::Go(GoOptions::depth(10))
        );
        let EngineCommand::Go(opts) = EngineCommand::parse("go infinite").unwrap() else {
            panic!("Expected Go command");
        };
        assert!(opts.infinite);
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(matches!(
            EngineCommand::parse("fly"),
            Err(UciError::InvalidCommand(_))
        ));
    }
}
