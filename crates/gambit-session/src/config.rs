//! Configuration file loading.
//!
//! Settings come from a TOML file, `gambit.toml` in the current directory by
//! default. A missing default file yields the built-in defaults.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`GameConfig`].
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// Values parse but make no sense together.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// External engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ask the engine before falling back to the built-in policy.
    pub enabled: bool,
    /// Engine executable, looked up on `PATH` when not absolute.
    pub path: String,
    /// Upper bound on every wait for an engine reply.
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            enabled: false,
            path: "stockfish".to_string(),
            timeout_secs: 10,
        }
    }
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Session and driver settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GameConfig {
    /// Clock allotment per side.
    pub starting_seconds: u32,
    /// Pause before the computer starts thinking.
    pub initial_delay_ms: u64,
    /// Lower bound of one reasoning step.
    pub think_step_min_ms: u64,
    /// Upper bound of one reasoning step.
    pub think_step_max_ms: u64,
    /// End the game when a clock reaches zero. Off by default: the clock
    /// just stays at zero and play continues.
    pub flag_fall_ends_game: bool,
    /// Seed for the move policy and the thinking timings.
    pub seed: Option<u64>,
    pub engine: EngineConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            starting_seconds: 600,
            initial_delay_ms: 500,
            think_step_min_ms: 400,
            think_step_max_ms: 700,
            flag_fall_ends_game: false,
            seed: None,
            engine: EngineConfig::default(),
        }
    }
}

impl GameConfig {
    /// Default location of the configuration file.
    pub fn config_path() -> PathBuf {
        PathBuf::from("gambit.toml")
    }

    /// Loads the configuration.
    ///
    /// With an explicit `path` the file must exist. Without one,
    /// [`Self::config_path()`] is tried and defaults are used if it is absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::config_path(), false),
        };

        if !required && !path.exists() {
            tracing::debug!("No {} found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_seconds == 0 {
            return Err(ConfigError::Invalid(
                "starting_seconds must be positive".to_string(),
            ));
        }
        if self.think_step_min_ms > self.think_step_max_ms {
            return Err(ConfigError::Invalid(format!(
                "think_step_min_ms ({}) exceeds think_step_max_ms ({})",
                self.think_step_min_ms, self.think_step_max_ms
            )));
        }
        Ok(())
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Range a single reasoning step's duration is drawn from, in ms.
    ///
    /// Never empty: a maximum below the minimum collapses to the minimum,
    /// which covers configs built in code that skip validation.
    pub fn think_step_range(&self) -> RangeInclusive<u64> {
        let max = self.think_step_max_ms.max(self.think_step_min_ms);
        self.think_step_min_ms..=max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GameConfig::default();
        assert_eq!(config.starting_seconds, 600);
        assert_eq!(config.initial_delay(), Duration::from_millis(500));
        assert_eq!(config.think_step_range(), 400..=700);
        assert!(!config.flag_fall_ends_game);
        assert!(!config.engine.enabled);
        assert_eq!(config.engine.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = GameConfig::from_toml(
            r#"
            starting_seconds = 300
            seed = 9

            [engine]
            enabled = true
            "#,
        )
        .unwrap();
        assert_eq!(config.starting_seconds, 300);
        assert_eq!(config.seed, Some(9));
        assert!(config.engine.enabled);
        assert_eq!(config.engine.path, "stockfish");
        assert_eq!(config.think_step_max_ms, 700);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            GameConfig::from_toml("starting_seconds = \"ten\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            GameConfig::from_toml("starting_seconds = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_toml("think_step_min_ms = 900"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn inverted_think_steps_collapse_to_the_minimum() {
        let config = GameConfig {
            think_step_min_ms: 900,
            think_step_max_ms: 100,
            ..GameConfig::default()
        };
        let range = config.think_step_range();
        assert!(!range.is_empty());
        assert_eq!(range, 900..=900);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let path = Path::new("definitely/not/here/gambit.toml");
        assert!(matches!(
            GameConfig::load(Some(path)),
            Err(ConfigError::Read { .. })
        ));
    }
}
