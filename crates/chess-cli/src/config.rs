//! Engine settings loaded from `engine.toml`.
//!
//! Every field has a default, so a missing file or an empty one yields a
//! usable configuration. Command-line flags override what is loaded here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when loading the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// A value parsed but is out of range.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Search settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Deepest iteration to search. Defaults to 6.
    #[serde(default = "default_max_depth")]
    pub max_depth: u8,
    /// Time budget per search in milliseconds. Unlimited when absent.
    #[serde(default)]
    pub movetime_ms: Option<u64>,
}

fn default_max_depth() -> u8 {
    6
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_depth: default_max_depth(),
            movetime_ms: None,
        }
    }
}

impl EngineConfig {
    /// Default location: `engine.toml` in the working directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from("engine.toml")
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// [`ConfigError::ParseError`] for invalid TOML and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 || self.max_depth > chess_search::MAX_DEPTH {
            return Err(ConfigError::Invalid(format!(
                "max_depth must be between 1 and {}, got {}",
                chess_search::MAX_DEPTH,
                self.max_depth
            )));
        }
        if self.movetime_ms == Some(0) {
            return Err(ConfigError::Invalid("movetime_ms must be positive".to_string()));
        }
        Ok(())
    }

    pub fn movetime(&self) -> Option<Duration> {
        self.movetime_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = EngineConfig::parse("max_depth = 9\nmovetime_ms = 1500\n").unwrap();
        assert_eq!(config.max_depth, 9);
        assert_eq!(config.movetime(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_empty_config_defaults() {
        let config = EngineConfig::parse("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_depth, 6);
        assert!(config.movetime().is_none());
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        assert!(matches!(
            EngineConfig::parse("max_depth = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::parse("max_depth = 200"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::parse("movetime_ms = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_bad_toml_is_a_parse_error() {
        assert!(matches!(
            EngineConfig::parse("max_depth = \"deep\""),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = EngineConfig::load(Path::new("does/not/exist/engine.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = EngineConfig {
            max_depth: 4,
            movetime_ms: Some(250),
        };
        let serialized = toml::to_string(&config).unwrap();
        assert_eq!(EngineConfig::parse(&serialized).unwrap(), config);
    }
}
