//! Trit/byte conversion for Kerl
//!
//! A 243-trit chunk (last trit ignored) is the balanced-ternary integer
//! `Σ t_i·3^i`, `i < 242`, which always fits a 384-bit two's-complement
//! word. Arithmetic runs on little-endian `u32` limbs with one spare limb
//! for the sign during the modular reduction.

use crate::params::HASH_LENGTH;
use crate::trits::Trit;

/// Bytes of one Kerl block
pub const BYTE_LENGTH: usize = 48;

const LIMBS: usize = 13;
const BYTE_LIMBS: usize = BYTE_LENGTH / 4;
/// Trits carried by a block; trit 242 is always zero
const VALUE_TRITS: usize = HASH_LENGTH - 1;

type Limbs = [u32; LIMBS];

/// 3^242
const MODULUS: Limbs = pow3(VALUE_TRITS);
/// (3^242 - 1) / 2, the largest balanced 242-trit value
const HALF: Limbs = half_of_odd(MODULUS);

const fn pow3(exp: usize) -> Limbs {
    let mut out = [0u32; LIMBS];
    out[0] = 1;
    let mut e = 0;
    while e < exp {
        let mut carry = 0u64;
        let mut i = 0;
        while i < LIMBS {
            let v = out[i] as u64 * 3 + carry;
            out[i] = v as u32;
            carry = v >> 32;
            i += 1;
        }
        e += 1;
    }
    out
}

const fn half_of_odd(n: Limbs) -> Limbs {
    // (n - 1) / 2 == n >> 1 for odd n
    let mut out = [0u32; LIMBS];
    let mut i = 0;
    while i < LIMBS {
        let upper = if i + 1 < LIMBS { n[i + 1] << 31 } else { 0 };
        out[i] = (n[i] >> 1) | upper;
        i += 1;
    }
    out
}

fn add(a: &mut Limbs, b: &Limbs) {
    let mut carry = 0u64;
    for i in 0..LIMBS {
        let v = a[i] as u64 + b[i] as u64 + carry;
        a[i] = v as u32;
        carry = v >> 32;
    }
}

fn sub(a: &mut Limbs, b: &Limbs) {
    let mut borrow = 0i64;
    for i in 0..LIMBS {
        let v = a[i] as i64 - b[i] as i64 - borrow;
        if v < 0 {
            a[i] = (v + (1i64 << 32)) as u32;
            borrow = 1;
        } else {
            a[i] = v as u32;
            borrow = 0;
        }
    }
}

fn is_negative(a: &Limbs) -> bool {
    a[LIMBS - 1] >> 31 == 1
}

fn greater_or_equal(a: &Limbs, b: &Limbs) -> bool {
    for i in (0..LIMBS).rev() {
        if a[i] != b[i] {
            return a[i] > b[i];
        }
    }
    true
}

/// Divide in place by 3, returning the remainder
fn div3(a: &mut Limbs) -> u32 {
    let mut rem = 0u64;
    for limb in a.iter_mut().rev() {
        let v = (rem << 32) | *limb as u64;
        *limb = (v / 3) as u32;
        rem = v % 3;
    }
    rem as u32
}

/// Encode the first 242 trits of a chunk as a 48-byte big-endian
/// two's-complement integer
pub fn trits_to_bytes(trits: &[Trit; HASH_LENGTH]) -> [u8; BYTE_LENGTH] {
    // unsigned w = Σ (t_i + 1)·3^i, then shift by HALF into the balanced range
    let mut value: Limbs = [0; LIMBS];
    for &t in trits[..VALUE_TRITS].iter().rev() {
        let mut carry = (t + 1) as u64;
        for limb in value.iter_mut() {
            let v = *limb as u64 * 3 + carry;
            *limb = v as u32;
            carry = v >> 32;
        }
    }
    sub(&mut value, &HALF);

    let mut bytes = [0u8; BYTE_LENGTH];
    for (i, chunk) in bytes.chunks_exact_mut(4).enumerate() {
        chunk.copy_from_slice(&value[BYTE_LIMBS - 1 - i].to_be_bytes());
    }
    bytes
}

/// Decode 48 big-endian bytes into 243 trits, reducing the signed value
/// modulo 3^242 into the balanced range; trit 242 is zero
pub fn bytes_to_trits(bytes: &[u8; BYTE_LENGTH]) -> [Trit; HASH_LENGTH] {
    let mut value: Limbs = [0; LIMBS];
    for (i, chunk) in bytes.chunks_exact(4).enumerate() {
        value[BYTE_LIMBS - 1 - i] = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    // sign-extend from 384 bits
    if value[BYTE_LIMBS - 1] >> 31 == 1 {
        value[BYTE_LIMBS..].fill(u32::MAX);
    }

    add(&mut value, &HALF);
    if is_negative(&value) {
        add(&mut value, &MODULUS);
    } else if greater_or_equal(&value, &MODULUS) {
        sub(&mut value, &MODULUS);
    }

    let mut trits = [0 as Trit; HASH_LENGTH];
    for t in trits[..VALUE_TRITS].iter_mut() {
        *t = div3(&mut value) as Trit - 1;
    }
    trits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(
            HALF,
            [
                0xa5ce8964, 0x9f007669, 0x1484504f, 0x3ade00d9, 0x0c24486e, 0x50979d57, 0x79a4c702,
                0x48bbae36, 0xa9f6808b, 0xaa06a805, 0xa87fabdf, 0x5e69ebef, 0
            ]
        );
        assert_eq!(MODULUS[0], 0x4b9d12c9);
        assert_eq!(MODULUS[BYTE_LIMBS - 1], 0xbcd3d7df);
        assert_eq!(MODULUS[LIMBS - 1], 0);
    }

    #[test]
    fn test_zero_trits_are_zero_bytes() {
        assert_eq!(trits_to_bytes(&[0; HASH_LENGTH]), [0u8; BYTE_LENGTH]);
        assert_eq!(bytes_to_trits(&[0u8; BYTE_LENGTH]), [0; HASH_LENGTH]);
    }

    #[test]
    fn test_small_values() {
        let mut one = [0 as Trit; HASH_LENGTH];
        one[0] = 1;
        let bytes = trits_to_bytes(&one);
        assert_eq!(bytes[BYTE_LENGTH - 1], 1);
        assert!(bytes[..BYTE_LENGTH - 1].iter().all(|&b| b == 0));

        let mut minus_one = [0 as Trit; HASH_LENGTH];
        minus_one[0] = -1;
        assert_eq!(trits_to_bytes(&minus_one), [0xff; BYTE_LENGTH]);
        assert_eq!(bytes_to_trits(&[0xff; BYTE_LENGTH]), minus_one);
    }

    #[test]
    fn test_round_trip_ignores_last_trit() {
        let mut trits = [0 as Trit; HASH_LENGTH];
        for (i, t) in trits.iter_mut().enumerate() {
            *t = (i % 3) as Trit - 1;
        }
        let back = bytes_to_trits(&trits_to_bytes(&trits));
        assert_eq!(back[..VALUE_TRITS], trits[..VALUE_TRITS]);
        assert_eq!(back[VALUE_TRITS], 0);
    }

    #[test]
    fn test_out_of_range_bytes_are_reduced() {
        // 0x7f.. is larger than HALF, so it wraps to a negative balanced value
        let mut bytes = [0xff; BYTE_LENGTH];
        bytes[0] = 0x7f;
        let trits = bytes_to_trits(&bytes);
        assert!(trits.iter().all(|t| (-1..=1).contains(t)));
        assert_eq!(trits[VALUE_TRITS], 0);
    }
}
