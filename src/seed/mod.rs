//! Seed handling
//!
//! A seed is 81 trytes. New seeds come from the OS random source; existing
//! seeds are read from a plaintext file (default `~/.tryte/seed.txt`).
//! Nothing here writes seeds to disk.

use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

use tryte_core::{SEED_TRYTES, SecurityLevel, TRYTE_ALPHABET, generate_address, validate_trytes};

/// Largest multiple of 27 that fits a byte; bytes at or above are redrawn
const REJECTION_LIMIT: u8 = 243;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Failed to gather randomness: {0}")]
    Random(String),

    #[error("Invalid seed: {0}")]
    Invalid(#[from] tryte_core::Error),

    #[error("File I/O error: {0}")]
    FileError(#[from] std::io::Error),
}

/// An 81-tryte seed
#[derive(Clone, PartialEq, Eq)]
pub struct Seed {
    trytes: String,
}

impl Seed {
    /// Create a new random seed
    pub fn new() -> Result<Self, SeedError> {
        let mut trytes = String::with_capacity(SEED_TRYTES);
        let mut buffer = [0u8; 2 * SEED_TRYTES];

        while trytes.len() < SEED_TRYTES {
            getrandom::getrandom(&mut buffer).map_err(|e| SeedError::Random(e.to_string()))?;
            for &byte in buffer.iter().filter(|&&b| b < REJECTION_LIMIT) {
                if trytes.len() == SEED_TRYTES {
                    break;
                }
                trytes.push(TRYTE_ALPHABET[(byte % 27) as usize] as char);
            }
        }
        Ok(Self { trytes })
    }

    /// Parse a seed; surrounding whitespace is ignored
    pub fn from_trytes(trytes: &str) -> Result<Self, SeedError> {
        let trytes = trytes.trim();
        validate_trytes(trytes, "seed", Some(SEED_TRYTES))?;
        Ok(Self {
            trytes: trytes.to_string(),
        })
    }

    /// Load a seed from a file
    pub fn load_from_file(path: &Path) -> Result<Self, SeedError> {
        let content = fs::read_to_string(path)?;
        Self::from_trytes(&content)
    }

    pub fn as_trytes(&self) -> &str {
        &self.trytes
    }

    /// Address for `index` at the given security level
    pub fn address(&self, index: u64, level: SecurityLevel) -> Result<String, SeedError> {
        Ok(generate_address(&self.trytes, index, level)?)
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed").field("trytes", &"<redacted>").finish()
    }
}

/// Default seed file path
#[cfg(feature = "cli")]
pub fn default_seed_path() -> std::path::PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    home.join(".tryte").join("seed.txt")
}
