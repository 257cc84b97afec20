//! Game tunables.
//!
//! The builtin values ship as embedded JSON. A deployment can override
//! them from a file; missing fields fall back to the builtin defaults.
//!
//! ```
//! use mechfront_logic::config::{validate_config, GameConfig};
//!
//! let config = GameConfig::from_json_str(r#"{ "step_interval_ms": 250 }"#).unwrap();
//! assert_eq!(config.step_interval_ms, 250);
//! assert!(validate_config(&config).is_empty());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::mech::{MechClass, MechStats};

pub const BUILTIN_GAME_CONFIG: &str = include_str!("data/game_config.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Delay between combat sequence events, and before completion.
    pub step_interval_ms: u64,
    /// Credits every new pilot starts with, before origin bonuses.
    pub starting_credits: u64,
    /// Stats of a fresh starting mech, per class.
    pub mech_baselines: BTreeMap<MechClass, MechStats>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            step_interval_ms: 1000,
            starting_credits: 0,
            mech_baselines: MechClass::ALL
                .into_iter()
                .map(|class| (class, MechStats::baseline(class)))
                .collect(),
        }
    }
}

impl GameConfig {
    pub fn builtin() -> Self {
        // The embedded file is covered by `test_builtin_config_parses`.
        Self::from_json_str(BUILTIN_GAME_CONFIG).unwrap_or_default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigLoadError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let config = GameConfig::from_json_str(&contents)?;
        Ok(config)
    }

    /// Baseline stats for `class`, falling back to the compiled-in table.
    pub fn baseline(&self, class: MechClass) -> MechStats {
        self.mech_baselines
            .get(&class)
            .copied()
            .unwrap_or_else(|| MechStats::baseline(class))
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to parse game config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read game config from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Combat sequence would emit every event at once.
    #[error("step interval must be greater than zero")]
    ZeroStepInterval,
    /// A class has no baseline; its starting mech would be unconfigured.
    #[error("no baseline stats for mech class '{0}'")]
    MissingBaseline(MechClass),
    /// A baseline with zero health cannot field a mech.
    #[error("baseline for mech class '{0}' has zero health")]
    ZeroHealth(MechClass),
}

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &GameConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.step_interval_ms == 0 {
        errors.push(ConfigError::ZeroStepInterval);
    }

    for class in MechClass::ALL {
        match config.mech_baselines.get(&class) {
            None => errors.push(ConfigError::MissingBaseline(class)),
            Some(stats) if stats.health == 0 => errors.push(ConfigError::ZeroHealth(class)),
            Some(_) => {}
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_config_parses() {
        let config = GameConfig::from_json_str(BUILTIN_GAME_CONFIG).unwrap();
        assert_eq!(config, GameConfig::default());
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = GameConfig::from_json_str(r#"{ "starting_credits": 300 }"#).unwrap();
        assert_eq!(config.starting_credits, 300);
        assert_eq!(config.step_interval_ms, 1000);
        assert_eq!(config.baseline(MechClass::Tank), MechStats::baseline(MechClass::Tank));
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let mut config = GameConfig::default();
        config.step_interval_ms = 0;
        config.mech_baselines.remove(&MechClass::Sniper);
        config.mech_baselines.insert(
            MechClass::Tank,
            MechStats {
                health: 0,
                ..MechStats::baseline(MechClass::Tank)
            },
        );

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ConfigError::ZeroStepInterval));
        assert!(errors.contains(&ConfigError::MissingBaseline(MechClass::Sniper)));
        assert!(errors.contains(&ConfigError::ZeroHealth(MechClass::Tank)));
    }

    #[test]
    fn test_from_file_missing_path() {
        let err = GameConfig::from_file(Path::new("/nonexistent/game_config.json")).unwrap_err();
        assert!(matches!(err, ConfigLoadError::ReadFailed { .. }));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(GameConfig::from_json_str("{ not json").is_err());
    }
}
