//! Standard chess rules, backed by `shakmaty`.

use crate::oracle::{CandidateMove, RulesError, RulesOracle};
use crate::san::{move_to_san, resolve_san};
use crate::Position;
use gambit_core::{GameStatus, Move, PieceKind, Square};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, EnPassantMode, File, Move as SMove, Position as _, Role};

/// The standard chess rules oracle.
///
/// Stateless: every call parses the given FEN, so one value can serve any
/// number of sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl StandardRules {
    fn load(&self, position: &Position) -> Result<Chess, RulesError> {
        let fen: Fen = position
            .as_fen()
            .parse()
            .map_err(|e| RulesError::InvalidPosition(format!("{}", e)))?;
        fen.into_position(CastlingMode::Standard)
            .map_err(|e| RulesError::InvalidPosition(format!("{}", e)))
    }

    fn store(&self, pos: &Chess) -> Result<Position, RulesError> {
        let fen = Fen::from_position(pos.clone(), EnPassantMode::Legal).to_string();
        Ok(Position::from_fen(&fen)?)
    }

    fn annotate(&self, pos: &Chess, m: &SMove) -> Result<Move, RulesError> {
        let mut mv = Move::new(from_square(m)?, to_square(m)?);
        mv.promotion = m.promotion().map(piece_kind);
        mv.piece = Some(piece_kind(m.role()));
        mv.captured = m.capture().map(piece_kind);
        mv.san = Some(move_to_san(pos, m));
        Ok(mv)
    }

    fn candidate(&self, pos: &Chess, m: &SMove) -> Result<CandidateMove, RulesError> {
        let mut after = pos.clone();
        after.play_unchecked(m);
        Ok(CandidateMove {
            mv: self.annotate(pos, m)?,
            gives_check: after.is_check(),
            gives_mate: after.is_checkmate(),
        })
    }

    fn leaves(m: &SMove, from: Square, to: Square) -> bool {
        from_square(m).ok() == Some(from) && to_square(m).ok() == Some(to)
    }
}

impl RulesOracle for StandardRules {
    fn new_position(&self, fen: Option<&str>) -> Result<Position, RulesError> {
        match fen {
            None => Ok(Position::startpos()),
            Some(fen) => {
                let position = Position::from_fen(fen)?;
                // Reject shapes that parse but are not playable.
                self.load(&position)?;
                Ok(position)
            }
        }
    }

    fn legal_moves(
        &self,
        position: &Position,
        from: Option<Square>,
    ) -> Result<Vec<CandidateMove>, RulesError> {
        let pos = self.load(position)?;
        pos.legal_moves()
            .iter()
            .filter(|m| from.map_or(true, |sq| from_square(m).ok() == Some(sq)))
            .map(|m| self.candidate(&pos, m))
            .collect()
    }

    fn apply_move(
        &self,
        position: &Position,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<(Position, Move), RulesError> {
        let pos = self.load(position)?;
        let illegal = || RulesError::IllegalMove { from, to };

        let matching: Vec<SMove> = pos
            .legal_moves()
            .into_iter()
            .filter(|m| Self::leaves(m, from, to))
            .collect();

        let wanted = match promotion {
            Some(p) => Some(p),
            None if matching.iter().any(|m| m.is_promotion()) => Some(PieceKind::Queen),
            None => None,
        };

        let m = matching
            .into_iter()
            .find(|m| m.promotion().map(piece_kind) == wanted)
            .ok_or_else(illegal)?;

        let mv = self.annotate(&pos, &m)?;
        let next = pos.play(&m).map_err(|_| illegal())?;
        Ok((self.store(&next)?, mv))
    }

    fn status(&self, position: &Position) -> Result<GameStatus, RulesError> {
        let pos = self.load(position)?;
        let status = if pos.is_checkmate() {
            GameStatus::Checkmate
        } else if pos.is_stalemate() {
            GameStatus::Stalemate
        } else if pos.is_insufficient_material() || pos.halfmoves() >= 100 {
            GameStatus::Draw
        } else if pos.is_check() {
            GameStatus::Check
        } else {
            GameStatus::Active
        };
        Ok(status)
    }

    fn find_san(&self, position: &Position, san: &str) -> Result<Move, RulesError> {
        let pos = self.load(position)?;
        let m = resolve_san(&pos, san).ok_or_else(|| RulesError::UnknownSan(san.to_string()))?;
        self.annotate(&pos, &m)
    }
}

/// Origin square in session terms. Castling moves are reported from the
/// king's square.
fn from_square(m: &SMove) -> Result<Square, RulesError> {
    square(m.from().unwrap_or_else(|| m.to()))
}

/// Destination square in session terms. Castling moves land on the king's
/// destination (g- or c-file), not on the rook.
fn to_square(m: &SMove) -> Result<Square, RulesError> {
    match m {
        SMove::Castle { king, rook } => {
            let file = if rook.file() > king.file() {
                File::G
            } else {
                File::C
            };
            square(shakmaty::Square::from_coords(file, king.rank()))
        }
        _ => square(m.to()),
    }
}

fn square(sq: shakmaty::Square) -> Result<Square, RulesError> {
    Square::new(u8::from(sq.file()), u8::from(sq.rank()))
        .ok_or_else(|| RulesError::InvalidPosition(format!("square {} out of range", sq)))
}

fn piece_kind(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}
