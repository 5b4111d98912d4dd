//! Protocol constants
//!
//! Everything here is fixed by the ternary ledger protocol; changing any
//! value produces incompatible hashes, nonces or addresses.

/// Trits per tryte
pub const TRITS_PER_TRYTE: usize = 3;

/// Output length of one squeeze (Curl-P and Kerl), in trits
pub const HASH_LENGTH: usize = 243;

/// Output length of one squeeze, in trytes
pub const HASH_TRYTES: usize = HASH_LENGTH / TRITS_PER_TRYTE;

/// Curl sponge state width in trits
pub const STATE_LENGTH: usize = 3 * HASH_LENGTH;

/// Rounds of the Curl-P-81 permutation (transactions, digests)
pub const CURL_P81_ROUNDS: usize = 81;

/// Rounds of the Curl-P-27 permutation
pub const CURL_P27_ROUNDS: usize = 27;

/// Largest value a single tryte can hold
pub const MAX_TRYTE_VALUE: i8 = 13;

/// Smallest value a single tryte can hold
pub const MIN_TRYTE_VALUE: i8 = -13;

/// Seed length in trytes
pub const SEED_TRYTES: usize = 81;

/// Chunks of 243 trits in one key or signature fragment
pub const FRAGMENT_CHUNKS: usize = 27;

/// Key / signature fragment length in trits (27 × 243)
pub const FRAGMENT_LENGTH: usize = FRAGMENT_CHUNKS * HASH_LENGTH;

/// Signature fragment length in trytes
pub const FRAGMENT_TRYTES: usize = FRAGMENT_LENGTH / TRITS_PER_TRYTE;

/// Hash rounds applied to every key chunk to form the public commitment
pub const KEY_CHUNK_ROUNDS: usize = 26;

/// Address checksum length in trytes
pub const ADDRESS_CHECKSUM_TRYTES: usize = 9;

/// Full transaction length in trits
pub const TRANSACTION_LENGTH: usize = 8019;

/// Full transaction length in trytes
pub const TRANSACTION_TRYTES: usize = TRANSACTION_LENGTH / TRITS_PER_TRYTE;

/// Nonce field length in trits (last field of a transaction)
pub const NONCE_LENGTH: usize = 81;

/// Trit offset of the nonce inside the transaction
pub const NONCE_OFFSET: usize = TRANSACTION_LENGTH - NONCE_LENGTH;

/// Largest meaningful minimum weight magnitude (every hash trit zero)
pub const MAX_MIN_WEIGHT_MAGNITUDE: usize = HASH_LENGTH;

/// Upper bound written into the attachment-timestamp upper bound field: (3^27 - 1) / 2
pub const MAX_TIMESTAMP_VALUE: i64 = 3_812_798_742_493;
