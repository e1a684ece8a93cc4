//! Messages sent from an engine to the GUI.

use crate::EngineInfo;

/// A line an engine writes, as the session understands it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineMessage {
    /// Engine identification.
    Id {
        name: Option<String>,
        author: Option<String>,
    },
    /// UCI initialization complete.
    UciOk,
    /// Engine is ready.
    ReadyOk,
    /// Search information.
    Info(EngineInfo),
    /// Best move found. `mv` is `(none)` or `0000` when there is no move.
    BestMove { mv: String, ponder: Option<String> },
    /// Anything else (`option ...`, banners, blank lines).
    Other(String),
}

impl EngineMessage {
    /// Parse one engine output line. Never fails: unrecognised lines become
    /// [`EngineMessage::Other`].
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let mut parts = line.split_whitespace();

        match parts.next() {
            Some("uciok") => EngineMessage::UciOk,
            Some("readyok") => EngineMessage::ReadyOk,
            Some("id") => match parts.next() {
                Some("name") => EngineMessage::Id {
                    name: Some(parts.collect::<Vec<_>>().join(" ")),
                    author: None,
                },
                Some("author") => EngineMessage::Id {
                    name: None,
                    author: Some(parts.collect::<Vec<_>>().join(" ")),
                },
                _ => EngineMessage::Other(line.to_string()),
            },
            Some("bestmove") => match parts.next() {
                Some(mv) => {
                    let ponder = match parts.next() {
                        Some("ponder") => parts.next().map(str::to_string),
                        _ => None,
                    };
                    EngineMessage::BestMove {
                        mv: mv.to_string(),
                        ponder,
                    }
                }
                None => EngineMessage::Other(line.to_string()),
            },
            Some("info") => match EngineInfo::parse(line) {
                Some(info) => EngineMessage::Info(info),
                None => EngineMessage::Other(line.to_string()),
            },
            _ => EngineMessage::Other(line.to_string()),
        }
    }

    /// Format message as an engine would print it.
    pub fn to_uci(&self) -> String {
        match self {
            EngineMessage::Id { name, author } => {
                let mut parts = Vec::new();
                if let Some(n) = name {
                    parts.push(format!("id name {}", n));
                }
                if let Some(a) = author {
                    parts.push(format!("id author {}", a));
                }
                parts.join("\n")
            }
            EngineMessage::UciOk => "uciok".to_string(),
            EngineMessage::ReadyOk => "readyok".to_string(),
            EngineMessage::Info(info) => info.to_uci(),
            EngineMessage::BestMove { mv, ponder } => match ponder {
                Some(p) => format!("bestmove {} ponder {}", mv, p),
                None => format!("bestmove {}", mv),
            },
            EngineMessage::Other(s) => s.clone(),
        }
    }

    /// The best move, unless the engine reported that it has none.
    pub fn best_move(&self) -> Option<&str> {
        match self {
            EngineMessage::BestMove { mv, .. } if mv != "(none)" && mv != "0000" => Some(mv.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Score;

    #[test]
    fn parse_handshake_lines() {
        assert_eq!(EngineMessage::parse("uciok"), EngineMessage::UciOk);
        assert_eq!(EngineMessage::parse("readyok\n"), EngineMessage::ReadyOk);
        assert_eq!(
            EngineMessage::parse("id name Stockfish 16"),
            EngineMessage::Id {
                name: Some("Stockfish 16".into()),
                author: None
            }
        );
    }

    #[test]
    fn parse_bestmove() {
        let msg = EngineMessage::parse("bestmove e2e4 ponder e7e5");
        assert_eq!(
            msg,
            EngineMessage::BestMove {
                mv: "e2e4".into(),
                ponder: Some("e7e5".into())
            }
        );
        assert_eq!(msg.best_move(), Some("e2e4"));
        assert_eq!(EngineMessage::parse("bestmove (none)").best_move(), None);
        assert!(matches!(
            EngineMessage::parse("bestmove"),
            EngineMessage::Other(_)
        ));
    }

    #[test]
    fn parse_info_line() {
        let EngineMessage::Info(info) = EngineMessage::parse("info depth 8 score cp 17 pv d2d4")
        else {
            panic!("Expected info");
        };
        assert_eq!(info.depth, Some(8));
        assert_eq!(info.score, Some(Score::Cp(17)));
    }

    #[test]
    fn unknown_lines_are_kept() {
        assert_eq!(
            EngineMessage::parse("option name Hash type spin default 16"),
            EngineMessage::Other("option name Hash type spin default 16".into())
        );
    }

    #[test]
    fn to_uci_matches_parse() {
        for line in ["uciok", "readyok", "bestmove g1f3", "info depth 3 score mate 2 pv h5f7"] {
            assert_eq!(EngineMessage::parse(line).to_uci(), line);
        }
    }
}
