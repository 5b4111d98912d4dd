//! Digest and checksum API over tryte strings

use crate::curl::{Curl, Sponge};
use crate::error::{Error, Result};
use crate::params::{HASH_LENGTH, HASH_TRYTES};
use crate::trits::{Trit, check_trits, trits_to_trytes, trytes_to_trits};

/// Curl-P-81 hash of a trit slice (243 trits)
pub fn digest_trits(trits: &[Trit]) -> Result<Vec<Trit>> {
    check_trits(trits)?;
    Ok(Curl::p81().hash(trits))
}

/// Curl-P-81 digest of a tryte string (81 trytes)
pub fn digest(trytes: &str) -> Result<String> {
    let trits = trytes_to_trits(trytes)?;
    trits_to_trytes(&digest_trits(&trits)?)
}

/// Last `length` trytes of [`digest`]
pub fn checksum(trytes: &str, length: usize) -> Result<String> {
    if length == 0 || length > HASH_TRYTES {
        return Err(Error::InvalidChecksumLength {
            requested: length,
            max: HASH_TRYTES,
        });
    }
    let full = digest(trytes)?;
    Ok(full[HASH_TRYTES - length..].to_string())
}

/// Number of consecutive zero trits at the end of a hash
pub fn trailing_zeros(hash: &[Trit]) -> usize {
    hash.iter().rev().take_while(|&&t| t == 0).count()
}

/// Check whether a 243-trit hash ends in at least `min_weight_magnitude` zeros
pub fn meets_difficulty(hash: &[Trit], min_weight_magnitude: usize) -> bool {
    hash.len() == HASH_LENGTH && trailing_zeros(hash) >= min_weight_magnitude
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_length_and_alphabet() {
        let d = digest("SOME9TRYTES").unwrap();
        assert_eq!(d.len(), HASH_TRYTES);
        assert!(crate::trits::is_trytes(&d));
    }

    #[test]
    fn test_checksum_is_digest_suffix() {
        let input = "CHECKSUMINPUT";
        let full = digest(input).unwrap();
        for n in [1, 9, 81] {
            assert_eq!(checksum(input, n).unwrap(), full[81 - n..]);
        }
    }

    #[test]
    fn test_checksum_length_bounds() {
        assert_eq!(
            checksum("ABC", 0),
            Err(Error::InvalidChecksumLength {
                requested: 0,
                max: 81
            })
        );
        assert!(checksum("ABC", 82).is_err());
    }

    #[test]
    fn test_invalid_trytes_rejected() {
        assert!(matches!(digest("abc"), Err(Error::InvalidTryte { index: 0, .. })));
    }

    #[test]
    fn test_digest_trits_rejects_out_of_range_trits() {
        assert_eq!(
            digest_trits(&[2; HASH_LENGTH]),
            Err(Error::InvalidTrit { index: 0, value: 2 })
        );
        let mut trits = vec![0 as Trit; HASH_LENGTH];
        trits[100] = -2;
        assert_eq!(
            digest_trits(&trits),
            Err(Error::InvalidTrit {
                index: 100,
                value: -2
            })
        );
        assert_eq!(digest_trits(&[0; HASH_LENGTH]).unwrap(), vec![0; HASH_LENGTH]);
    }

    #[test]
    fn test_trailing_zeros() {
        let mut hash = vec![1 as Trit; HASH_LENGTH];
        assert_eq!(trailing_zeros(&hash), 0);
        for t in hash.iter_mut().skip(HASH_LENGTH - 5) {
            *t = 0;
        }
        assert_eq!(trailing_zeros(&hash), 5);
        assert!(meets_difficulty(&hash, 5));
        assert!(!meets_difficulty(&hash, 6));
        assert!(!meets_difficulty(&hash[1..], 0));
    }
}
