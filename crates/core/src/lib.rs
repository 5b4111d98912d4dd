//! # Tryte Core
//!
//! Ternary hashing, proof-of-work and one-time signatures for a
//! tryte-encoded ledger.
//!
//! ## Components
//!
//! - **Codec**: tryte strings (`9ABCDEFGHIJKLMNOPQRSTUVWXYZ`) to balanced trits and back
//! - **Curl-P**: 729-trit sponge, 27 or 81 rounds, with a bit-sliced variant
//! - **Kerl**: Keccak-384 behind the same ternary sponge interface
//! - **PearlDiver**: multi-threaded nonce search, 64 candidates per transform
//! - **Signing**: seed → key → address, bundle-hash signatures and verification
//!
//! ## Example
//!
//! ```rust
//! use tryte_core::{PearlDiver, checksum, digest};
//!
//! let d = digest("HELLO9WORLD").unwrap();
//! assert_eq!(d.len(), 81);
//! assert_eq!(checksum("HELLO9WORLD", 9).unwrap(), &d[72..]);
//!
//! let diver = PearlDiver::new(2);
//! let tx = "9".repeat(2673);
//! let attached = diver.search_trytes(&tx, 1).unwrap();
//! assert_eq!(attached.len(), 2673);
//! ```

mod bundle;
mod curl;
mod error;
mod hash;
mod kerl;
mod params;
mod pow;
mod primitives;
mod signing;
mod transaction;
mod trits;
mod words;

pub use bundle::{attach_bundle, attach_bundle_trytes, current_timestamp_ms, normalized_bundle};
pub use curl::{Curl, CurlRounds, Sponge};
pub use error::{Error, ErrorKind, Result};
pub use hash::{checksum, digest, digest_trits, meets_difficulty, trailing_zeros};
pub use kerl::Kerl;
pub use params::*;
pub use pow::{
    CancelToken, LANES, PearlDiver, PowConfig, PowOutcome, PowState, proof_of_work,
    proof_of_work_trits,
};
pub use primitives::{transform, transform_bct};
pub use signing::{
    SecurityLevel, add_checksum, address_from_digests, address_from_key, digest_from_signature,
    digests, generate_address, generate_addresses, generate_signature, is_valid_checksum,
    key_from_seed, signature_from_key, subseed, validate_signature, validate_signature_trits,
};
pub use transaction::{Field, Transaction};
pub use trits::{
    TRYTE_ALPHABET, Trit, add_trits, bct_decode, bct_encode, is_trytes, pad_trytes,
    trits_to_trytes, trits_to_value, trytes_to_trits, tryte_value, validate_trytes,
    value_to_trits, value_to_trits_padded,
};
pub use words::{BYTE_LENGTH, bytes_to_trits, trits_to_bytes};

#[cfg(test)]
mod tests;
