//! Engine configuration
//!
//! Optional JSON file (default `~/.tryte/config.json`); a missing file means
//! defaults. Command-line flags override whatever the file sets.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use tryte_core::{MAX_MIN_WEIGHT_MAGNITUDE, PowConfig, SecurityLevel};

/// Default minimum weight magnitude for `pow` and `attach`
pub const DEFAULT_MIN_WEIGHT_MAGNITUDE: usize = 14;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File I/O error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker threads for the nonce search (default: number of CPU cores)
    pub threads: Option<usize>,
    /// Trailing zero trits required of a transaction hash
    pub min_weight_magnitude: usize,
    /// Key fragments per address, 1 to 3
    pub security_level: u8,
    /// `error`, `warn`, `info`, `debug` or `trace`
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: None,
            min_weight_magnitude: DEFAULT_MIN_WEIGHT_MAGNITUDE,
            security_level: SecurityLevel::default() as u8,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "threads",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.min_weight_magnitude > MAX_MIN_WEIGHT_MAGNITUDE {
            return Err(ConfigError::InvalidValue {
                field: "min_weight_magnitude",
                reason: format!("must be at most {}", MAX_MIN_WEIGHT_MAGNITUDE),
            });
        }
        self.security()?;
        self.log_filter()?;
        Ok(())
    }

    pub fn security(&self) -> Result<SecurityLevel, ConfigError> {
        SecurityLevel::try_from(self.security_level).map_err(|e| ConfigError::InvalidValue {
            field: "security_level",
            reason: e.to_string(),
        })
    }

    pub fn log_filter(&self) -> Result<log::LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                field: "log_level",
                reason: format!("unknown level {:?}", self.log_level),
            })
    }

    /// Thread count, falling back to the search default (one per core)
    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(|| PowConfig::default().threads)
    }

    pub fn pow_config(&self) -> PowConfig {
        PowConfig {
            min_weight_magnitude: self.min_weight_magnitude,
            threads: self.thread_count(),
        }
    }
}

/// Default config file path
#[cfg(feature = "cli")]
pub fn default_config_path() -> std::path::PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    home.join(".tryte").join("config.json")
}
