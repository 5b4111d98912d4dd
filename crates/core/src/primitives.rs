//! Curl-P permutation
//!
//! Two renditions of the same fixed-round permutation over a 729-trit state:
//! a scalar one working on trits, and a bit-sliced one working on
//! binary-coded-ternary word pairs that evaluates 64 independent states
//! at once (one per bit lane).

use crate::params::STATE_LENGTH;
use crate::trits::Trit;

/// S-box: `TRUTH_TABLE[a + 4·b + 5]` for trits `a`, `b`
const TRUTH_TABLE: [Trit; 11] = [1, 0, -1, 2, 1, -1, 0, 2, -1, 1, 0];

/// Read positions of the permutation; `INDICES[i]` and `INDICES[i + 1]`
/// feed output trit `i`.
pub static INDICES: [usize; STATE_LENGTH + 1] = build_indices();

const fn build_indices() -> [usize; STATE_LENGTH + 1] {
    let mut indices = [0usize; STATE_LENGTH + 1];
    let mut k = 0;
    while k < STATE_LENGTH {
        indices[k + 1] = if indices[k] < 365 {
            indices[k] + 364
        } else {
            indices[k] - 365
        };
        k += 1;
    }
    indices
}

/// Apply `rounds` rounds of the permutation to a trit state
#[inline(always)]
pub fn transform(state: &mut [Trit; STATE_LENGTH], rounds: usize) {
    let mut scratch = [0 as Trit; STATE_LENGTH];
    for _ in 0..rounds {
        scratch.copy_from_slice(state);
        for (i, out) in state.iter_mut().enumerate() {
            let a = scratch[INDICES[i]];
            let b = scratch[INDICES[i + 1]];
            *out = TRUTH_TABLE[(a + (b << 2) + 5) as usize];
        }
    }
}

/// Apply `rounds` rounds of the permutation to 64 bit-sliced states
///
/// `low[i]`/`high[i]` hold trit `i` of every lane in binary-coded ternary.
#[inline(always)]
pub fn transform_bct(low: &mut [u64; STATE_LENGTH], high: &mut [u64; STATE_LENGTH], rounds: usize) {
    let mut scratch_low = [0u64; STATE_LENGTH];
    let mut scratch_high = [0u64; STATE_LENGTH];

    for _ in 0..rounds {
        scratch_low.copy_from_slice(low);
        scratch_high.copy_from_slice(high);

        for j in 0..STATE_LENGTH {
            let t1 = INDICES[j];
            let t2 = INDICES[j + 1];

            let alpha = scratch_low[t1];
            let beta = scratch_high[t1];
            let gamma = scratch_high[t2];
            let delta = (alpha | !gamma) & (scratch_low[t2] ^ beta);

            low[j] = !delta;
            high[j] = (alpha ^ gamma) | delta;
        }
    }
}
