//! Simulation settings.
//!
//! Settings come from an optional JSON file (camelCase keys, every key
//! optional) and are then overridden by command-line flags.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codon_select::Strategy;
use crate::playback::{PlaybackMode, DEFAULT_SPEED_MS};
use crate::validate::DEFAULT_MAX_PROTEIN_LENGTH;

/// Delay between the start of transcription and the start of translation.
pub const DEFAULT_TRANSLATION_DELAY_MS: u64 = 1000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} must be greater than 0")]
    NotPositive(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Duration of a whole animation
    pub speed_ms: u64,
    pub mode: PlaybackMode,
    pub strategy: Strategy,
    pub max_protein_length: usize,
    pub translation_delay_ms: u64,
    /// Fixed seed for reproducible codon choices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            speed_ms: DEFAULT_SPEED_MS,
            mode: PlaybackMode::Auto,
            strategy: Strategy::default(),
            max_protein_length: DEFAULT_MAX_PROTEIN_LENGTH,
            translation_delay_ms: DEFAULT_TRANSLATION_DELAY_MS,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.speed_ms == 0 {
            return Err(ConfigError::NotPositive("speedMs"));
        }
        if self.max_protein_length == 0 {
            return Err(ConfigError::NotPositive("maxProteinLength"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.speed_ms, 2000);
        assert_eq!(config.mode, PlaybackMode::Auto);
        assert_eq!(config.strategy, Strategy::Random);
        assert_eq!(config.max_protein_length, 100);
        assert_eq!(config.translation_delay_ms, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config =
            SimulationConfig::from_json_str(r#"{"speedMs": 500, "strategy": "gc_rich", "seed": 7}"#)
                .unwrap();
        assert_eq!(config.speed_ms, 500);
        assert_eq!(config.strategy, Strategy::GcRich);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.mode, PlaybackMode::Auto);
    }

    #[test]
    fn test_zero_speed_rejected() {
        let err = SimulationConfig::from_json_str(r#"{"speedMs": 0}"#).unwrap_err();
        assert_eq!(err.to_string(), "speedMs must be greater than 0");
    }

    #[test]
    fn test_unknown_values_rejected() {
        assert!(SimulationConfig::from_json_str(r#"{"mode": "fast"}"#).is_err());
        assert!(SimulationConfig::from_json_str(r#"{"speed": 10}"#).is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"mode": "step", "maxProteinLength": 20}}"#).unwrap();
        let config = SimulationConfig::from_file(file.path()).unwrap();
        assert_eq!(config.mode, PlaybackMode::Step);
        assert_eq!(config.max_protein_length, 20);

        assert!(matches!(
            SimulationConfig::from_file("/nonexistent/dogmatui.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
