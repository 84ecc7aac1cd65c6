//! Generator Configuration
//!
//! Defines the tunables of a generation session. Loaded from TOML; every
//! field has a default so partial files are accepted.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bound on nested expression construction per instruction.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 50;

/// Default share of instructions routed through the corruption path.
pub const DEFAULT_CORRUPTION_RATE: f64 = 0.1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("corruption rate must be within [0, 1], got {0}")]
    RateOutOfRange(f64),
}

/// Configuration for a generation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Maximum nesting of expressions inside one instruction.
    pub max_recursion_depth: usize,

    /// Disable the corruption path from the start.
    pub pure_run: bool,

    /// Corruption path tunables.
    pub corruption: CorruptionConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            pure_run: false,
            corruption: CorruptionConfig::default(),
        }
    }
}

/// Corruption path tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorruptionConfig {
    /// Probability in `[0, 1]` that an instruction is corrupted.
    pub rate: f64,

    /// Seed for the per-instruction corruption roll.
    pub seed: u64,
}

impl Default for CorruptionConfig {
    fn default() -> Self {
        Self {
            rate: DEFAULT_CORRUPTION_RATE,
            seed: 0,
        }
    }
}

impl CorruptionConfig {
    pub fn disabled() -> Self {
        Self {
            rate: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if (0.0..=1.0).contains(&self.rate) {
            Ok(())
        } else {
            Err(ConfigError::RateOutOfRange(self.rate))
        }
    }
}

impl GeneratorConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = toml::from_str(source)?;
        config.corruption.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = GeneratorConfig::from_toml_str("pure_run = true\n").unwrap();
        assert!(config.pure_run);
        assert_eq!(config.max_recursion_depth, DEFAULT_MAX_RECURSION_DEPTH);
        assert_eq!(config.corruption, CorruptionConfig::default());
    }

    #[test]
    fn test_corruption_section() {
        let config = GeneratorConfig::from_toml_str(
            "max_recursion_depth = 8\n[corruption]\nrate = 0.5\nseed = 99\n",
        )
        .unwrap();
        assert_eq!(config.max_recursion_depth, 8);
        assert_eq!(config.corruption.rate, 0.5);
        assert_eq!(config.corruption.seed, 99);
    }

    #[test]
    fn test_rate_out_of_range() {
        let err = GeneratorConfig::from_toml_str("[corruption]\nrate = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::RateOutOfRange(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("astforge.toml");
        fs::write(&path, "max_recursion_depth = 3\n").unwrap();
        assert_eq!(GeneratorConfig::load(&path).unwrap().max_recursion_depth, 3);
    }
}
