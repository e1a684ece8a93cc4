//! Game setup choices: side, skill tier and model label.

use gambit_core::Side;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strength setting for the computer opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillTier {
    Novice,
    #[default]
    Club,
    Grandmaster,
}

impl SkillTier {
    pub const ALL: [SkillTier; 3] = [SkillTier::Novice, SkillTier::Club, SkillTier::Grandmaster];

    /// Share of the scored candidates the policy picks from.
    pub const fn random_factor(self) -> f64 {
        match self {
            SkillTier::Novice => 0.7,
            SkillTier::Club => 0.3,
            SkillTier::Grandmaster => 0.1,
        }
    }

    /// `Skill Level` option sent to an external engine.
    pub const fn engine_skill(self) -> u8 {
        match self {
            SkillTier::Novice => 5,
            SkillTier::Club => 12,
            SkillTier::Grandmaster => 20,
        }
    }

    /// Search depth requested from an external engine.
    pub const fn engine_depth(self) -> u32 {
        match self {
            SkillTier::Novice => 8,
            SkillTier::Club => 12,
            SkillTier::Grandmaster => 18,
        }
    }
}

impl fmt::Display for SkillTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkillTier::Novice => "novice",
            SkillTier::Club => "club",
            SkillTier::Grandmaster => "grandmaster",
        };
        f.write_str(s)
    }
}

impl FromStr for SkillTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "novice" => Ok(SkillTier::Novice),
            "club" => Ok(SkillTier::Club),
            "grandmaster" | "gm" => Ok(SkillTier::Grandmaster),
            other => Err(format!(
                "unknown skill tier '{}': expected novice, club or grandmaster",
                other
            )),
        }
    }
}

/// Persona label for the computer opponent. Cosmetic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiModel {
    #[default]
    Default,
    Claude,
    Gpt,
    Grok,
    Mistral,
    Gemini,
}

impl AiModel {
    /// Name shown in front of chat answers.
    pub const fn label(self) -> &'static str {
        match self {
            AiModel::Default => "AI",
            AiModel::Claude => "Claude",
            AiModel::Gpt => "GPT",
            AiModel::Grok => "Grok",
            AiModel::Mistral => "Mistral",
            AiModel::Gemini => "Gemini",
        }
    }
}

impl fmt::Display for AiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AiModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "ai" => Ok(AiModel::Default),
            "claude" => Ok(AiModel::Claude),
            "gpt" => Ok(AiModel::Gpt),
            "grok" => Ok(AiModel::Grok),
            "mistral" => Ok(AiModel::Mistral),
            "gemini" => Ok(AiModel::Gemini),
            other => Err(format!("unknown model '{}'", other)),
        }
    }
}

/// Everything chosen before a game starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSetup {
    /// The human's side. The computer plays the other one.
    pub player_side: Side,
    pub tier: SkillTier,
    pub model: AiModel,
}

impl Default for GameSetup {
    fn default() -> Self {
        GameSetup {
            player_side: Side::White,
            tier: SkillTier::default(),
            model: AiModel::default(),
        }
    }
}
