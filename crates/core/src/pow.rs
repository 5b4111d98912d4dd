//! Proof-of-work nonce search (PearlDiver)
//!
//! The search runs on a Curl-P-81 mid-state: the first 7776 trits of the
//! transaction are absorbed once, then only the last 243-trit block (which
//! holds the nonce) is varied. The state is bit-sliced so that one
//! transform evaluates 64 candidate nonces, one per bit lane.
//!
//! Nonce layout inside the final block:
//!
//! ```text
//! 162..166  lane constants, every lane a different value
//! 166..193  worker partition, incremented `worker_index` times up front
//! 193..243  per-worker counter, incremented before every transform
//! ```
//!
//! Workers are scoped threads sharing only a stop flag, the caller's
//! [`CancelToken`], a one-shot result slot and a candidate counter.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::curl::{Curl, Sponge};
use crate::error::{Error, Result, expect_length};
use crate::params::{
    CURL_P81_ROUNDS, HASH_LENGTH, MAX_MIN_WEIGHT_MAGNITUDE, NONCE_LENGTH, NONCE_OFFSET,
    STATE_LENGTH, TRANSACTION_LENGTH, TRANSACTION_TRYTES,
};
use crate::primitives::transform_bct;
use crate::trits::{
    Trit, bct_decode, bct_encode, check_trits, trits_to_trytes, trytes_to_trits,
    validate_trytes,
};

/// Candidates evaluated by one bit-sliced transform
pub const LANES: u64 = 64;

/// Start of the nonce within the final state block
const NONCE_START: usize = HASH_LENGTH - NONCE_LENGTH;
const LANE_START: usize = NONCE_START;
const PARTITION_START: usize = NONCE_START + 4;
const COUNTER_START: usize = PARTITION_START + 27;

/// Word pairs that give each of the 64 lanes a distinct 4-trit prefix
const LANE_LOW: [u64; 4] = [
    0xDB6D_B6DB_6DB6_DB6D,
    0xF1F8_FC7E_3F1F_8FC7,
    0x7FFF_E00F_FFFC_01FF,
    0xFFC0_0000_07FF_FFFF,
];
const LANE_HIGH: [u64; 4] = [
    0xB6DB_6DB6_DB6D_B6DB,
    0x8FC7_E3F1_F8FC_7E3F,
    0xFFC0_1FFF_F803_FFFF,
    0x003F_FFFF_FFFF_FFFF,
];

/// Cooperative cancellation shared with the caller
///
/// Cancellation is sticky: a cancelled token stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Lifecycle of a search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PowState {
    Prepared = 0,
    Searching = 1,
    Found = 2,
    Cancelled = 3,
    /// Every worker ran out of nonces without a hit
    Exhausted = 4,
}

impl PowState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => PowState::Searching,
            2 => PowState::Found,
            3 => PowState::Cancelled,
            4 => PowState::Exhausted,
            _ => PowState::Prepared,
        }
    }
}

/// Search parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowConfig {
    pub min_weight_magnitude: usize,
    pub threads: usize,
}

impl Default for PowConfig {
    fn default() -> Self {
        Self {
            min_weight_magnitude: 14,
            threads: num_cpus::get(),
        }
    }
}

/// Result of a successful search
#[derive(Debug, Clone)]
pub struct PowOutcome {
    /// The transaction with its nonce field filled in
    pub transaction: Vec<Trit>,
    pub nonce: Vec<Trit>,
    /// Candidate nonces evaluated across all workers
    pub candidates: u64,
    pub elapsed: Duration,
}

impl PowOutcome {
    /// Candidates per second
    pub fn hashrate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.candidates as f64 / secs
        } else {
            0.0
        }
    }
}

/// Bit-sliced 729-trit state
#[derive(Clone)]
struct BctState {
    low: [u64; STATE_LENGTH],
    high: [u64; STATE_LENGTH],
}

impl BctState {
    fn encode(trits: &[Trit; STATE_LENGTH]) -> Self {
        let mut state = Self {
            low: [0; STATE_LENGTH],
            high: [0; STATE_LENGTH],
        };
        for (i, &t) in trits.iter().enumerate() {
            (state.low[i], state.high[i]) = bct_encode(t);
        }
        state
    }

    /// Add one to the trits `from..to` of every lane; false on overflow
    fn increment(&mut self, from: usize, to: usize) -> bool {
        for i in from..to {
            let (low, high) = (self.low[i], self.high[i]);
            self.low[i] = high ^ low;
            self.high[i] = low;
            if high & !low == 0 {
                return true;
            }
        }
        false
    }

    /// Lanes whose last `mwm` trits are all zero, as a bit mask
    fn zero_suffix_lanes(&self, mwm: usize) -> u64 {
        let mut probe = u64::MAX;
        for i in HASH_LENGTH - mwm..HASH_LENGTH {
            probe &= !(self.low[i] ^ self.high[i]);
            if probe == 0 {
                break;
            }
        }
        probe
    }

    fn lane_trits(&self, from: usize, to: usize, lane: usize) -> Vec<Trit> {
        (from..to)
            .map(|i| bct_decode(self.low[i], self.high[i], lane))
            .collect()
    }
}

/// Parallel nonce searcher
///
/// One diver runs one search at a time; a second concurrent call fails with
/// [`Error::SearchInProgress`]. Searches in sequence (e.g. a bundle) are
/// fine and the candidate counter accumulates across them.
#[derive(Debug)]
pub struct PearlDiver {
    threads: usize,
    cancel: CancelToken,
    state: AtomicU8,
    candidates: AtomicU64,
    busy: AtomicBool,
}

/// Releases the diver's busy flag when a search returns
struct SearchGuard<'a>(&'a AtomicBool);

impl Drop for SearchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl PearlDiver {
    pub fn new(threads: usize) -> Self {
        Self::with_cancel_token(threads, CancelToken::new())
    }

    pub fn with_cancel_token(threads: usize, cancel: CancelToken) -> Self {
        Self {
            threads: threads.max(1),
            cancel,
            state: AtomicU8::new(PowState::Prepared as u8),
            candidates: AtomicU64::new(0),
            busy: AtomicBool::new(false),
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn state(&self) -> PowState {
        PowState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Candidates evaluated so far; safe to poll from another thread
    pub fn candidates(&self) -> u64 {
        self.candidates.load(Ordering::Relaxed)
    }

    fn set_state(&self, state: PowState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    /// Find a nonce for an 8019-trit transaction
    pub fn search(&self, transaction: &[Trit], min_weight_magnitude: usize) -> Result<PowOutcome> {
        expect_length("transaction", TRANSACTION_LENGTH, transaction.len())?;
        check_trits(transaction)?;
        if min_weight_magnitude > MAX_MIN_WEIGHT_MAGNITUDE {
            return Err(Error::InvalidMinWeightMagnitude {
                value: min_weight_magnitude,
                max: MAX_MIN_WEIGHT_MAGNITUDE,
            });
        }
        if self.busy.swap(true, Ordering::AcqRel) {
            return Err(Error::SearchInProgress);
        }
        let _guard = SearchGuard(&self.busy);

        if self.cancel.is_cancelled() {
            self.set_state(PowState::Cancelled);
            return Err(Error::Cancelled);
        }

        let started = Instant::now();
        if min_weight_magnitude == 0 {
            self.set_state(PowState::Found);
            return Ok(PowOutcome {
                transaction: transaction.to_vec(),
                nonce: transaction[NONCE_OFFSET..].to_vec(),
                candidates: 0,
                elapsed: started.elapsed(),
            });
        }

        self.set_state(PowState::Searching);
        debug!(
            "pow: searching with {} workers, mwm {}",
            self.threads, min_weight_magnitude
        );

        let mid_state = prepare_mid_state(transaction);
        let counted_before = self.candidates();
        let stop = AtomicBool::new(false);
        let found: OnceLock<(usize, Vec<Trit>)> = OnceLock::new();

        std::thread::scope(|scope| {
            for worker in 0..self.threads {
                let mid_state = &mid_state;
                let stop = &stop;
                let found = &found;
                scope.spawn(move || {
                    self.dive(worker, mid_state, min_weight_magnitude, stop, found);
                });
            }
        });

        let candidates = self.candidates() - counted_before;
        self.conclude(transaction, found.into_inner(), candidates, started.elapsed())
    }

    /// Turn the workers' result into the search outcome and final state
    fn conclude(
        &self,
        transaction: &[Trit],
        found: Option<(usize, Vec<Trit>)>,
        candidates: u64,
        elapsed: Duration,
    ) -> Result<PowOutcome> {
        match found {
            Some((worker, nonce)) => {
                self.set_state(PowState::Found);
                info!(
                    "pow: worker {} found a nonce after {} candidates in {:.2?}",
                    worker, candidates, elapsed
                );
                let mut out = transaction.to_vec();
                out[NONCE_OFFSET..].copy_from_slice(&nonce);
                Ok(PowOutcome {
                    transaction: out,
                    nonce,
                    candidates,
                    elapsed,
                })
            }
            None if self.cancel.is_cancelled() => {
                self.set_state(PowState::Cancelled);
                debug!("pow: cancelled after {} candidates", candidates);
                Err(Error::Cancelled)
            }
            None => {
                self.set_state(PowState::Exhausted);
                debug!("pow: nonce space exhausted after {} candidates", candidates);
                Err(Error::NonceSpaceExhausted)
            }
        }
    }

    /// [`search`](Self::search) over tryte strings; returns the transaction
    /// trytes with the nonce filled in
    pub fn search_trytes(&self, transaction: &str, min_weight_magnitude: usize) -> Result<String> {
        validate_trytes(transaction, "transaction", Some(TRANSACTION_TRYTES))?;
        let trits = trytes_to_trits(transaction)?;
        let outcome = self.search(&trits, min_weight_magnitude)?;
        trits_to_trytes(&outcome.transaction)
    }

    fn dive(
        &self,
        worker: usize,
        mid_state: &BctState,
        mwm: usize,
        stop: &AtomicBool,
        found: &OnceLock<(usize, Vec<Trit>)>,
    ) {
        let mut state = mid_state.clone();
        for _ in 0..worker {
            state.increment(PARTITION_START, COUNTER_START);
        }

        let mut scratch = state.clone();
        while !stop.load(Ordering::Relaxed) && !self.cancel.is_cancelled() {
            if !state.increment(COUNTER_START, HASH_LENGTH) {
                break;
            }

            scratch.low.copy_from_slice(&state.low);
            scratch.high.copy_from_slice(&state.high);
            transform_bct(&mut scratch.low, &mut scratch.high, CURL_P81_ROUNDS);
            self.candidates.fetch_add(LANES, Ordering::Relaxed);

            let lanes = scratch.zero_suffix_lanes(mwm);
            if lanes != 0 {
                let lane = lanes.trailing_zeros() as usize;
                let nonce = state.lane_trits(NONCE_START, HASH_LENGTH, lane);
                if found.set((worker, nonce)).is_ok() {
                    stop.store(true, Ordering::SeqCst);
                }
                break;
            }
        }
    }
}

impl Default for PearlDiver {
    fn default() -> Self {
        Self::new(PowConfig::default().threads)
    }
}

/// Absorb everything but the last block, load the last block and bit-slice
fn prepare_mid_state(transaction: &[Trit]) -> BctState {
    let tail = TRANSACTION_LENGTH - HASH_LENGTH;
    let mut curl = Curl::p81();
    curl.absorb(&transaction[..tail]);

    let mut trits = *curl.state();
    trits[..HASH_LENGTH].copy_from_slice(&transaction[tail..]);

    let mut state = BctState::encode(&trits);
    for k in 0..LANE_LOW.len() {
        state.low[LANE_START + k] = LANE_LOW[k];
        state.high[LANE_START + k] = LANE_HIGH[k];
    }
    state
}

/// Attach a nonce to a transaction given as trytes
pub fn proof_of_work(transaction: &str, config: &PowConfig) -> Result<String> {
    PearlDiver::new(config.threads).search_trytes(transaction, config.min_weight_magnitude)
}

/// Attach a nonce to a transaction given as trits
pub fn proof_of_work_trits(transaction: &[Trit], config: &PowConfig) -> Result<PowOutcome> {
    PearlDiver::new(config.threads).search(transaction, config.min_weight_magnitude)
}
