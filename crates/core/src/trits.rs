//! Ternary codec
//!
//! Converts between tryte strings (27-symbol text) and balanced-ternary trit
//! arrays, plus the integer and binary-coded-ternary encodings used by the
//! signing and proof-of-work code.
//!
//! A tryte holds three little-endian trits: `value = t0 + 3·t1 + 9·t2`,
//! range -13..=13. Symbol `9` is zero, `A`..`M` are 1..=13 and `N`..`Z`
//! are -13..=-1.

use crate::error::{Error, Result};
use crate::params::{MAX_TRYTE_VALUE, TRITS_PER_TRYTE};

/// A balanced ternary digit: -1, 0 or 1
pub type Trit = i8;

/// The tryte alphabet, indexed by tryte value (negative values wrap by +27)
pub const TRYTE_ALPHABET: &[u8; 27] = b"9ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Trits of each alphabet symbol, same order as [`TRYTE_ALPHABET`]
const TRYTE_TRITS: [[Trit; 3]; 27] = [
    [0, 0, 0],
    [1, 0, 0],
    [-1, 1, 0],
    [0, 1, 0],
    [1, 1, 0],
    [-1, -1, 1],
    [0, -1, 1],
    [1, -1, 1],
    [-1, 0, 1],
    [0, 0, 1],
    [1, 0, 1],
    [-1, 1, 1],
    [0, 1, 1],
    [1, 1, 1],
    [-1, -1, -1],
    [0, -1, -1],
    [1, -1, -1],
    [-1, 0, -1],
    [0, 0, -1],
    [1, 0, -1],
    [-1, 1, -1],
    [0, 1, -1],
    [1, 1, -1],
    [-1, -1, 0],
    [0, -1, 0],
    [1, -1, 0],
    [-1, 0, 0],
];

/// Position of a symbol in the alphabet, if it belongs to it
#[inline(always)]
fn symbol_index(symbol: u8) -> Option<usize> {
    match symbol {
        b'9' => Some(0),
        b'A'..=b'Z' => Some((symbol - b'A') as usize + 1),
        _ => None,
    }
}

/// Value (-13..=13) of a single tryte symbol
pub fn tryte_value(symbol: u8) -> Option<i8> {
    symbol_index(symbol).map(|index| {
        let value = index as i8;
        if value > MAX_TRYTE_VALUE {
            value - 27
        } else {
            value
        }
    })
}

/// Whether every character of `s` is a tryte symbol
pub fn is_trytes(s: &str) -> bool {
    s.bytes().all(|b| symbol_index(b).is_some())
}

/// Check the alphabet and, when given, the exact length of a tryte string
pub fn validate_trytes(s: &str, what: &'static str, expected_len: Option<usize>) -> Result<()> {
    if let Some(expected) = expected_len {
        crate::error::expect_length(what, expected, s.len())?;
    }
    if let Some((index, symbol)) = s.char_indices().find(|(_, c)| {
        !c.is_ascii() || symbol_index(*c as u8).is_none()
    }) {
        return Err(Error::InvalidTryte { index, symbol });
    }
    Ok(())
}

/// Decode a tryte string into trits (3 per tryte)
pub fn trytes_to_trits(trytes: &str) -> Result<Vec<Trit>> {
    let mut trits = Vec::with_capacity(trytes.len() * TRITS_PER_TRYTE);
    for (index, symbol) in trytes.char_indices() {
        let lut = u8::try_from(symbol)
            .ok()
            .and_then(symbol_index)
            .ok_or(Error::InvalidTryte { index, symbol })?;
        trits.extend_from_slice(&TRYTE_TRITS[lut]);
    }
    Ok(trits)
}

/// Encode trits as a tryte string
///
/// Fails when the length is not a multiple of 3 or a trit is outside {-1, 0, 1}.
pub fn trits_to_trytes(trits: &[Trit]) -> Result<String> {
    if trits.len() % TRITS_PER_TRYTE != 0 {
        return Err(Error::NotMultipleOf {
            what: "trits",
            multiple: TRITS_PER_TRYTE,
            actual: trits.len(),
        });
    }
    check_trits(trits)?;

    let trytes = trits
        .chunks_exact(TRITS_PER_TRYTE)
        .map(|t| {
            let value = t[0] + 3 * t[1] + 9 * t[2];
            let index = if value < 0 { value + 27 } else { value };
            TRYTE_ALPHABET[index as usize] as char
        })
        .collect();
    Ok(trytes)
}

/// Fail with [`Error::InvalidTrit`] on the first value outside {-1, 0, 1}
pub fn check_trits(trits: &[Trit]) -> Result<()> {
    match trits.iter().position(|t| !(-1..=1).contains(t)) {
        Some(index) => Err(Error::InvalidTrit {
            index,
            value: trits[index],
        }),
        None => Ok(()),
    }
}

/// Integer value of a little-endian balanced trit sequence
///
/// Wraps on overflow, so only meaningful for sequences whose value fits in
/// an `i64` (any field up to 39 trits always does).
pub fn trits_to_value(trits: &[Trit]) -> i64 {
    trits
        .iter()
        .rev()
        .fold(0i64, |acc, &t| acc.wrapping_mul(3).wrapping_add(t as i64))
}

/// Shortest balanced-ternary representation of `value` (zero → empty)
pub fn value_to_trits(value: i64) -> Vec<Trit> {
    balanced_digits(value as i128)
}

/// Balanced-ternary representation of `value` padded with zeros to `length`
///
/// Fails when the value needs more than `length` trits.
pub fn value_to_trits_padded(value: i64, length: usize, what: &'static str) -> Result<Vec<Trit>> {
    let mut trits = value_to_trits(value);
    if trits.len() > length {
        return Err(Error::ValueOutOfRange { what, value });
    }
    trits.resize(length, 0);
    Ok(trits)
}

pub(crate) fn balanced_digits(mut value: i128) -> Vec<Trit> {
    let mut trits = Vec::new();
    while value != 0 {
        let mut digit = value.rem_euclid(3);
        if digit == 2 {
            digit = -1;
        }
        trits.push(digit as Trit);
        value = (value - digit) / 3;
    }
    trits
}

/// Balanced ternary addition; the result is as long as the longer input and
/// the final carry is dropped.
pub fn add_trits(a: &[Trit], b: &[Trit]) -> Vec<Trit> {
    let len = a.len().max(b.len());
    let mut out = Vec::with_capacity(len);
    let mut carry: i8 = 0;

    for i in 0..len {
        let sum = a.get(i).copied().unwrap_or(0) + b.get(i).copied().unwrap_or(0) + carry;
        // sum is in -3..=3; split into a balanced digit and a carry
        let digit = (sum + 1).rem_euclid(3) - 1;
        carry = (sum - digit) / 3;
        out.push(digit);
    }
    out
}

/// Right-pad a tryte string with `9` up to `length`
pub fn pad_trytes(trytes: &str, length: usize) -> String {
    let mut padded = String::with_capacity(length.max(trytes.len()));
    padded.push_str(trytes);
    while padded.len() < length {
        padded.push('9');
    }
    padded
}

/// Binary-coded ternary: all lanes of a word pair set to the same trit
///
/// `0 → (1, 1)`, `1 → (0, 1)`, `-1 → (1, 0)` per bit lane.
#[inline(always)]
pub fn bct_encode(trit: Trit) -> (u64, u64) {
    match trit {
        1 => (0, u64::MAX),
        -1 => (u64::MAX, 0),
        _ => (u64::MAX, u64::MAX),
    }
}

/// Read the trit held in bit lane `lane` of a binary-coded-ternary word pair
#[inline(always)]
pub fn bct_decode(low: u64, high: u64, lane: usize) -> Trit {
    match ((low >> lane) & 1, (high >> lane) & 1) {
        (0, 1) => 1,
        (1, 0) => -1,
        _ => 0,
    }
}
