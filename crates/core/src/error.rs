//! Error types shared by every engine component

use thiserror::Error;

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed tryte alphabet, wrong length, out-of-range parameter
    InvalidInput,
    /// Search cancelled or aborted before completion
    ResourceExhaustion,
    /// A table or transform bug; should be unreachable
    InternalInvariantViolation,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid tryte {symbol:?} at position {index}")]
    InvalidTryte { index: usize, symbol: char },

    #[error("invalid trit value {value} at position {index}")]
    InvalidTrit { index: usize, value: i8 },

    #[error("invalid {what} length: expected {expected}, got {actual}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid {what} length: {actual} is not a multiple of {multiple}")]
    NotMultipleOf {
        what: &'static str,
        multiple: usize,
        actual: usize,
    },

    #[error("security level must be 1, 2 or 3, got {0}")]
    InvalidSecurityLevel(u8),

    #[error("minimum weight magnitude {value} exceeds the maximum of {max}")]
    InvalidMinWeightMagnitude { value: usize, max: usize },

    #[error("checksum length must be between 1 and {max}, got {requested}")]
    InvalidChecksumLength { requested: usize, max: usize },

    #[error("{what} value {value} does not fit its field")]
    ValueOutOfRange { what: &'static str, value: i64 },

    #[error("proof-of-work search cancelled")]
    Cancelled,

    #[error("nonce space exhausted without a valid nonce")]
    NonceSpaceExhausted,

    #[error("a search is already running on this diver")]
    SearchInProgress,

    #[error("internal invariant violated: {0}")]
    Internal(&'static str),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Cancelled | Error::NonceSpaceExhausted => ErrorKind::ResourceExhaustion,
            Error::Internal(_) => ErrorKind::InternalInvariantViolation,
            _ => ErrorKind::InvalidInput,
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;

/// Fail with [`Error::InvalidLength`] unless `actual == expected`
#[inline]
pub(crate) fn expect_length(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if actual != expected {
        return Err(Error::InvalidLength {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}
