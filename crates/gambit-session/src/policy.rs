//! Heuristic move selection with skill-tiered randomness.
//!
//! Each legal move is scored from its tags alone (capture, check, mate,
//! centre destination) plus a little noise. The candidates are sorted and
//! one is picked uniformly among the top share allowed by the skill tier:
//! 70% of the list for a novice, 30% at club level, 10% for a grandmaster.
//! There is no search.

use crate::SkillTier;
use gambit_core::Move;
use gambit_rules::CandidateMove;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

pub const NOISE_MAX: f64 = 10.0;
pub const CAPTURE_BONUS: f64 = 50.0;
pub const CHECK_BONUS: f64 = 30.0;
pub const MATE_BONUS: f64 = 1000.0;
pub const CENTER_BONUS: f64 = 20.0;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("no legal moves to choose from")]
    EmptyLegalMoveSet,
}

/// Deterministic part of the score. `noise` is the random draw in
/// `[0, NOISE_MAX)`.
pub fn score(candidate: &CandidateMove, noise: f64) -> f64 {
    let mut score = noise;
    if candidate.is_capture() {
        score += CAPTURE_BONUS;
    }
    if candidate.gives_mate {
        score += MATE_BONUS;
    } else if candidate.gives_check {
        score += CHECK_BONUS;
    }
    if candidate.to().is_center() {
        score += CENTER_BONUS;
    }
    score
}

/// How many of `n` ranked candidates the tier picks from: at least one.
pub fn pick_count(n: usize, tier: SkillTier) -> usize {
    let percent = (tier.random_factor() * 100.0).round() as usize;
    ((n * percent + 99) / 100).clamp(1, n.max(1))
}

/// Picks moves for the computer side and for hints.
pub struct MovePolicy<R = StdRng> {
    rng: R,
}

impl MovePolicy<StdRng> {
    /// Policy seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible policy.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for MovePolicy<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> MovePolicy<R> {
    pub fn with_rng(rng: R) -> Self {
        MovePolicy { rng }
    }

    /// Scores every candidate and sorts best first.
    pub fn rank<'a>(&mut self, candidates: &'a [CandidateMove]) -> Vec<(f64, &'a CandidateMove)> {
        let mut ranked: Vec<(f64, &CandidateMove)> = candidates
            .iter()
            .map(|c| (score(c, self.rng.gen_range(0.0..NOISE_MAX)), c))
            .collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
        ranked
    }

    /// Chooses one of `candidates` for the given tier.
    ///
    /// An empty list means the caller asked for a move in a finished
    /// position. That is a bug: it panics in debug builds and is reported
    /// as [`PolicyError::EmptyLegalMoveSet`] otherwise.
    pub fn select(
        &mut self,
        candidates: &[CandidateMove],
        tier: SkillTier,
    ) -> Result<Move, PolicyError> {
        debug_assert!(
            !candidates.is_empty(),
            "move policy invoked without legal moves"
        );
        if candidates.is_empty() {
            return Err(PolicyError::EmptyLegalMoveSet);
        }

        let ranked = self.rank(candidates);
        let k = pick_count(ranked.len(), tier);
        let (score, chosen) = ranked[self.rng.gen_range(0..k)];
        tracing::debug!(
            tier = %tier,
            candidates = ranked.len(),
            pool = k,
            score,
            mv = %chosen.mv,
            "policy picked move"
        );
        Ok(chosen.mv.clone())
    }

    /// Strongest-tier suggestion, independent of the game's tier.
    pub fn hint(&mut self, candidates: &[CandidateMove]) -> Result<Move, PolicyError> {
        self.select(candidates, SkillTier::Grandmaster)
    }
}
