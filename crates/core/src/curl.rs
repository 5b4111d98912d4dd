//! Curl-P sponge
//!
//! A 729-trit state whose first 243 trits form the rate. Absorbing
//! overwrites the rate chunk by chunk, squeezing reads it back; the
//! permutation runs after every chunk in both directions.

use crate::params::{CURL_P27_ROUNDS, CURL_P81_ROUNDS, HASH_LENGTH, STATE_LENGTH};
use crate::primitives::transform;
use crate::trits::Trit;

/// Common interface of the ternary sponges (Curl-P and Kerl)
pub trait Sponge {
    /// Return to the freshly constructed state
    fn reset(&mut self);

    /// Absorb trits, one 243-trit chunk at a time
    fn absorb(&mut self, trits: &[Trit]);

    /// Fill `out` with squeezed trits, one 243-trit chunk at a time
    fn squeeze_into(&mut self, out: &mut [Trit]);

    /// Squeeze `length` trits into a new vector
    fn squeeze(&mut self, length: usize) -> Vec<Trit> {
        let mut out = vec![0; length];
        self.squeeze_into(&mut out);
        out
    }

    /// Absorb `input` into a fresh sponge and squeeze one hash
    fn hash(&mut self, input: &[Trit]) -> Vec<Trit> {
        self.reset();
        self.absorb(input);
        self.squeeze(HASH_LENGTH)
    }
}

/// Number of permutation rounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurlRounds {
    P27,
    #[default]
    P81,
}

impl CurlRounds {
    pub fn count(self) -> usize {
        match self {
            CurlRounds::P27 => CURL_P27_ROUNDS,
            CurlRounds::P81 => CURL_P81_ROUNDS,
        }
    }
}

/// Curl-P sponge state
#[derive(Clone)]
pub struct Curl {
    state: [Trit; STATE_LENGTH],
    rounds: CurlRounds,
}

impl Curl {
    /// Create a sponge with the given round count
    pub fn new(rounds: CurlRounds) -> Self {
        Self {
            state: [0; STATE_LENGTH],
            rounds,
        }
    }

    /// Curl-P-81, used for transaction hashes and digests
    pub fn p81() -> Self {
        Self::new(CurlRounds::P81)
    }

    /// Curl-P-27
    pub fn p27() -> Self {
        Self::new(CurlRounds::P27)
    }

    pub fn rounds(&self) -> CurlRounds {
        self.rounds
    }

    /// Full 729-trit state, e.g. to hand a mid-state to the nonce search
    pub fn state(&self) -> &[Trit; STATE_LENGTH] {
        &self.state
    }

    /// Run the permutation once over the whole state
    #[inline]
    pub fn transform(&mut self) {
        transform(&mut self.state, self.rounds.count());
    }
}

impl Default for Curl {
    fn default() -> Self {
        Self::p81()
    }
}

impl Sponge for Curl {
    fn reset(&mut self) {
        self.state = [0; STATE_LENGTH];
    }

    fn absorb(&mut self, trits: &[Trit]) {
        // an empty input still runs the permutation once
        if trits.is_empty() {
            self.transform();
            return;
        }
        for chunk in trits.chunks(HASH_LENGTH) {
            self.state[..chunk.len()].copy_from_slice(chunk);
            self.transform();
        }
    }

    fn squeeze_into(&mut self, out: &mut [Trit]) {
        if out.is_empty() {
            self.transform();
            return;
        }
        for chunk in out.chunks_mut(HASH_LENGTH) {
            chunk.copy_from_slice(&self.state[..chunk.len()]);
            self.transform();
        }
    }
}
