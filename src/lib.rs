//! Tryte toolkit
//!
//! Ternary digests, proof-of-work and one-time signatures for a
//! tryte-encoded ledger, plus the configuration and seed handling used by
//! the `tryte` command-line tool.
//!
//! # Example
//!
//! ```rust
//! use tryte::algorithm::{SecurityLevel, generate_address, generate_signature, validate_signature};
//!
//! let seed = "NXAZBDBCCFZUSZMGKZCVNGMMKMCEXOGRLNNMXOIUMKDXTTVDBWGRBYVYZXMWSVLNYIADFTPWYUWJSG9HF";
//! let bundle = "JEGPJQCCCEUBLSFGBBISRCHFUHBXMCVGDXLHSQQBMSWRZYLBPBVDKHEJSAEXWCMDPDNCRLFZWHTHHBCYG";
//!
//! let address = generate_address(seed, 0, SecurityLevel::Low).unwrap();
//! let signature = generate_signature(seed, 0, SecurityLevel::Low, bundle).unwrap();
//! assert!(validate_signature(&address, &signature, bundle).unwrap());
//! ```

// Re-export the core algorithm
pub use tryte_core as algorithm;

pub mod config;
pub mod seed;

// Convenience re-exports
pub use algorithm::{
    CancelToken, PearlDiver, SecurityLevel, attach_bundle, checksum, digest, generate_address,
    generate_signature, proof_of_work,
};
pub use config::EngineConfig;
pub use seed::Seed;
