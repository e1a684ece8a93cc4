//! Canned chat text and the session transcript.
//!
//! Everything here is template selection. The random pick is injected so
//! tests can pin it down.

use crate::{AiModel, GamePhase};
use gambit_core::{GameStatus, Move, PieceKind, Side};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// Display-only status lines shown while the computer "thinks".
pub const REASONING_STEPS: [&str; 6] = [
    "Reading the position...",
    "Weighing piece activity...",
    "Looking for forcing lines...",
    "Scanning tactical motifs...",
    "Reviewing pawn structure...",
    "Settling on a move...",
];

/// Commentary on a move the computer just played.
pub fn ai_commentary<R: Rng + ?Sized>(mv: &Move, status: GameStatus, rng: &mut R) -> String {
    let san = mv.san.clone().unwrap_or_else(|| mv.to_uci());
    let piece = mv.piece.unwrap_or(PieceKind::Pawn).name();

    match status {
        GameStatus::Checkmate => format!(
            "{} - Checkmate. My {} finishes it. Thanks for the game; the mating net \
             was set once my pieces started working together.",
            san, piece
        ),
        GameStatus::Check => format!(
            "{} - Check from my {}! Your king has to deal with this right now. \
             Look at which of your pieces it cuts off.",
            san, piece
        ),
        _ if mv.is_capture() => {
            let gain = if rng.gen_bool(0.5) {
                "wins material"
            } else {
                "opens lines for the rest of my army"
            };
            format!(
                "{} - Taking with my {}. The trade {}. Imbalances like this shape \
                 the middlegame.",
                san, piece, gain
            )
        }
        _ => {
            let remarks = [
                "claims more of the centre. Central control lets pieces swing to either wing.",
                "develops with tempo. Every move should improve something.",
                "lands on an active square and links up with its neighbours.",
                "is a quiet prophylactic move that heads off your ideas early.",
                "regroups for the middlegame fight ahead.",
            ];
            let remark = remarks.choose(rng).copied().unwrap_or(remarks[0]);
            format!("{} - My {} {}", san, piece, remark)
        }
    }
}

/// Short remark on the player's move. Often says nothing.
pub fn player_critique<R: Rng + ?Sized>(mv: &Move, rng: &mut R) -> Option<&'static str> {
    if mv.is_capture() {
        return Some("Trade noted.");
    }
    let options = [
        Some("Solid."),
        Some("Interesting."),
        Some("Good development."),
        None,
        None,
        None,
    ];
    options.choose(rng).copied().flatten()
}

/// Keyword-routed strategy advice for a free-text question.
pub fn strategy_answer(question: &str, model: AiModel) -> String {
    let q = question.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| q.contains(w));

    let body = if has(&["opening", "start"]) {
        "Openings reward simple principles: fight for e4, d4, e5 and d5, bring the \
         knights out before the bishops, castle early, connect the rooks, and avoid \
         moving one piece twice or launching the queen too soon."
    } else if has(&["castle", "king"]) {
        "Keep your king safe. Castling hides it behind pawns and brings a rook toward \
         the centre. The short side usually needs fewer preparatory moves; the long \
         side is sharper. Aim to castle within the first ten moves."
    } else if has(&["pawn", "structure"]) {
        "Pawns set the plan. Watch for doubled, isolated and backward pawns, attack a \
         chain at its base, and remember that every pawn move is permanent."
    } else if has(&["endgame", "end game"]) {
        "In the endgame the king becomes a fighter. Create passed pawns, put rooks \
         behind them, and use the opposition and the rule of the square in king and \
         pawn endings."
    } else if has(&["tactic", "pin", "fork"]) {
        "Look for forks, pins, skewers, discovered attacks and double checks, for both \
         sides. Whoever spots the tactic first usually wins."
    } else {
        "Good question. Keep your pieces active and your king safe, and give every move \
         a purpose. Check forcing moves first: checks, captures, threats. Then improve \
         quietly."
    };

    format!("[{}] {}", model.label(), body)
}

/// Closing line for a terminal phase. `mover` is the side that made the
/// last move; `player` is the human's side.
pub fn result_announcement(phase: GamePhase, mover: Side, player: Side) -> Option<String> {
    match phase {
        GamePhase::Checkmate if mover == player => {
            Some(format!("Checkmate! {} wins. Well played.", mover))
        }
        GamePhase::Checkmate => Some(format!("Checkmate. {} wins. Game over, you lose.", mover)),
        GamePhase::Stalemate => Some("Stalemate. The game is drawn.".to_string()),
        GamePhase::Draw => Some("Draw. Neither side can make progress.".to_string()),
        GamePhase::Flagged(loser) => Some(format!(
            "{} ran out of time. {} wins on time.",
            loser,
            loser.opposite()
        )),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Agent,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageTag {
    Critique,
    Agent,
    Tip,
    System,
}

/// One line in the chat console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<MessageTag>,
    pub content: String,
    /// SAN of the move this message is about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub san: Option<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            kind: MessageKind::User,
            tag: None,
            content: content.into(),
            san: None,
        }
    }

    pub fn agent(tag: MessageTag, content: impl Into<String>) -> Self {
        ChatMessage {
            kind: MessageKind::Agent,
            tag: Some(tag),
            content: content.into(),
            san: None,
        }
    }

    pub fn tip(content: impl Into<String>) -> Self {
        Self::agent(MessageTag::Tip, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            kind: MessageKind::System,
            tag: Some(MessageTag::System),
            content: content.into(),
            san: None,
        }
    }

    pub fn with_san(mut self, san: Option<String>) -> Self {
        self.san = san;
        self
    }
}

/// Append-only chat history.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends and returns the stored message.
    pub fn push(&mut self, message: ChatMessage) -> &ChatMessage {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn mv(san: &str, piece: PieceKind, captured: Option<PieceKind>) -> Move {
        let mut m = Move::new("e2".parse().unwrap(), "e4".parse().unwrap());
        m.san = Some(san.to_string());
        m.piece = Some(piece);
        m.captured = captured;
        m
    }

    #[test]
    fn commentary_follows_status() {
        let mut rng = StdRng::seed_from_u64(3);
        let mate = ai_commentary(&mv("Qh4#", PieceKind::Queen, None), GameStatus::Checkmate, &mut rng);
        assert!(mate.starts_with("Qh4# - Checkmate. My queen"));

        let check = ai_commentary(&mv("Bb5+", PieceKind::Bishop, None), GameStatus::Check, &mut rng);
        assert!(check.contains("Check from my bishop"));

        let take = ai_commentary(
            &mv("Nxe5", PieceKind::Knight, Some(PieceKind::Pawn)),
            GameStatus::Active,
            &mut rng,
        );
        assert!(take.contains("Taking with my knight"));

        let quiet = ai_commentary(&mv("Nf3", PieceKind::Knight, None), GameStatus::Active, &mut rng);
        assert!(quiet.starts_with("Nf3 - My knight "));
    }

    #[test]
    fn critique_of_captures_is_fixed() {
        let mut rng = StdRng::seed_from_u64(0);
        let capture = mv("exd5", PieceKind::Pawn, Some(PieceKind::Pawn));
        for _ in 0..10 {
            assert_eq!(player_critique(&capture, &mut rng), Some("Trade noted."));
        }
    }

    #[test]
    fn critique_is_sometimes_silent() {
        let mut rng = StdRng::seed_from_u64(11);
        let quiet = mv("d4", PieceKind::Pawn, None);
        let results: Vec<_> = (0..200).map(|_| player_critique(&quiet, &mut rng)).collect();
        assert!(results.iter().any(Option::is_none));
        assert!(results.iter().any(Option::is_some));
    }

    #[test]
    fn strategy_routing() {
        assert!(strategy_answer("How should I START?", AiModel::Default).starts_with("[AI] Openings"));
        assert!(strategy_answer("when to castle", AiModel::Claude).starts_with("[Claude] Keep your king"));
        assert!(strategy_answer("pawn islands", AiModel::Gpt).contains("Pawns set the plan"));
        assert!(strategy_answer("endgame tips", AiModel::Grok).contains("king becomes a fighter"));
        assert!(strategy_answer("what is a fork", AiModel::Gemini).contains("skewers"));
        assert!(strategy_answer("hello", AiModel::Mistral).starts_with("[Mistral] Good question."));
    }

    #[test]
    fn announcements() {
        assert_eq!(
            result_announcement(GamePhase::Checkmate, Side::White, Side::White).as_deref(),
            Some("Checkmate! White wins. Well played.")
        );
        assert!(result_announcement(GamePhase::Checkmate, Side::Black, Side::White)
            .unwrap()
            .contains("you lose"));
        assert_eq!(
            result_announcement(GamePhase::Flagged(Side::Black), Side::White, Side::White)
                .as_deref(),
            Some("Black ran out of time. White wins on time.")
        );
        assert_eq!(result_announcement(GamePhase::Check, Side::White, Side::White), None);
    }

    #[test]
    fn transcript_is_append_only() {
        let mut t = Transcript::new();
        assert!(t.is_empty());
        t.push(ChatMessage::user("Played e4").with_san(Some("e4".into())));
        let tip = t.push(ChatMessage::tip("Try Nf3.")).clone();
        assert_eq!(t.len(), 2);
        assert_eq!(tip.tag, Some(MessageTag::Tip));
        assert_eq!(t.messages()[0].san.as_deref(), Some("e4"));
        assert_eq!(t.last(), Some(&tip));
    }
}
