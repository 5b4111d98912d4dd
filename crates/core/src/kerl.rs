//! Kerl: a ternary sponge over Keccak-384
//!
//! Trits cross into Keccak as 48-byte words (see [`crate::words`]). After
//! each squeezed block the Keccak state is reset and re-seeded with the
//! bitwise complement of that block.

use sha3::{Digest, Keccak384};

use crate::curl::Sponge;
use crate::params::HASH_LENGTH;
use crate::trits::Trit;
use crate::words::{BYTE_LENGTH, bytes_to_trits, trits_to_bytes};

#[derive(Clone, Default)]
pub struct Kerl {
    keccak: Keccak384,
}

impl Kerl {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sponge for Kerl {
    fn reset(&mut self) {
        Digest::reset(&mut self.keccak);
    }

    fn absorb(&mut self, trits: &[Trit]) {
        for chunk in trits.chunks(HASH_LENGTH) {
            let mut block = [0 as Trit; HASH_LENGTH];
            block[..chunk.len()].copy_from_slice(chunk);
            block[HASH_LENGTH - 1] = 0;
            self.keccak.update(trits_to_bytes(&block));
        }
    }

    fn squeeze_into(&mut self, out: &mut [Trit]) {
        for chunk in out.chunks_mut(HASH_LENGTH) {
            let digest = self.keccak.finalize_reset();
            let mut bytes = [0u8; BYTE_LENGTH];
            bytes.copy_from_slice(&digest);

            let trits = bytes_to_trits(&bytes);
            chunk.copy_from_slice(&trits[..chunk.len()]);

            for b in bytes.iter_mut() {
                *b = !*b;
            }
            self.keccak.update(bytes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trits::{trits_to_trytes, trytes_to_trits};

    #[test]
    fn test_kerl_vector() {
        let input = trytes_to_trits(
            "GYOMKVTSNHVJNCNFBBAH9AAMXLPLLLROQY99QN9DLSJUHDPBLCFFAIQXZA9BKMBJCYSFHFPXAHDWZFEIZ",
        )
        .unwrap();
        let mut kerl = Kerl::new();
        let out = kerl.hash(&input);
        assert_eq!(
            trits_to_trytes(&out).unwrap(),
            "OXJCNFHUNAHWDLKKPELTBFUCVW9KLXKOGWERKTJXQMXTKFKNWNNXYD9DMJJABSEIONOSJTTEVKVDQEWTW"
        );
    }

    #[test]
    fn test_multi_block_squeeze_is_deterministic() {
        let input = trytes_to_trits(&"KERL9".repeat(30)).unwrap();
        let mut a = Kerl::new();
        a.absorb(&input);
        let long = a.squeeze(3 * HASH_LENGTH);

        let mut b = Kerl::new();
        b.absorb(&input);
        let first = b.squeeze(HASH_LENGTH);
        let rest = b.squeeze(2 * HASH_LENGTH);

        assert_eq!(long[..HASH_LENGTH], first[..]);
        assert_eq!(long[HASH_LENGTH..], rest[..]);
        assert_ne!(long[..HASH_LENGTH], long[HASH_LENGTH..2 * HASH_LENGTH]);
    }

    #[test]
    fn test_last_trit_is_zero() {
        let mut kerl = Kerl::new();
        kerl.absorb(&trytes_to_trits("ABC").unwrap());
        let out = kerl.squeeze(2 * HASH_LENGTH);
        assert_eq!(out[HASH_LENGTH - 1], 0);
        assert_eq!(out[2 * HASH_LENGTH - 1], 0);
    }
}
