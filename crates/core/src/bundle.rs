//! Bundle helpers: hash normalization for signing and batch attachment

use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};

use crate::error::{Error, Result, expect_length};
use crate::params::{
    FRAGMENT_CHUNKS, HASH_LENGTH, HASH_TRYTES, MAX_TIMESTAMP_VALUE, MAX_TRYTE_VALUE,
    MIN_TRYTE_VALUE, TRITS_PER_TRYTE,
};
use crate::pow::PearlDiver;
use crate::transaction::{Field, Transaction};
use crate::trits::{Trit, check_trits, trits_to_value, trytes_to_trits, validate_trytes};

/// Tryte values of a bundle hash, each 27-value third shifted to sum to zero
///
/// Values are lowered (first one above -13 first) while a third sums above
/// zero, raised while it sums below.
pub fn normalized_bundle(bundle_hash: &[Trit]) -> Result<[i8; HASH_TRYTES]> {
    expect_length("bundle hash", HASH_LENGTH, bundle_hash.len())?;
    check_trits(bundle_hash)?;

    let mut normalized = [0i8; HASH_TRYTES];
    for (value, tryte) in normalized
        .iter_mut()
        .zip(bundle_hash.chunks_exact(TRITS_PER_TRYTE))
    {
        *value = trits_to_value(tryte) as i8;
    }

    for third in normalized.chunks_exact_mut(FRAGMENT_CHUNKS) {
        let mut sum: i32 = third.iter().map(|&v| v as i32).sum();
        while sum > 0 {
            match third.iter_mut().find(|v| **v > MIN_TRYTE_VALUE) {
                Some(v) => *v -= 1,
                None => return Err(Error::Internal("normalization found no value to lower")),
            }
            sum -= 1;
        }
        while sum < 0 {
            match third.iter_mut().find(|v| **v < MAX_TRYTE_VALUE) {
                Some(v) => *v += 1,
                None => return Err(Error::Internal("normalization found no value to raise")),
            }
            sum += 1;
        }
    }
    Ok(normalized)
}

/// Chain, timestamp and prove every transaction of a bundle
///
/// `transactions` are in bundle order (index 0 first) and come back in the
/// same order. Work runs from the last transaction to the first: the last
/// one references `trunk` and `branch`, every other one references the hash
/// of its successor as trunk and `trunk` as branch. A failure anywhere
/// aborts the whole batch.
pub fn attach_bundle(
    diver: &PearlDiver,
    transactions: &[Transaction],
    trunk: &[Trit],
    branch: &[Trit],
    min_weight_magnitude: usize,
    timestamp_ms: i64,
) -> Result<Vec<Transaction>> {
    expect_length("trunk transaction", HASH_LENGTH, trunk.len())?;
    expect_length("branch transaction", HASH_LENGTH, branch.len())?;

    let mut attached = Vec::with_capacity(transactions.len());
    let mut successor: Option<Vec<Trit>> = None;

    for (position, source) in transactions.iter().enumerate().rev() {
        let mut tx = source.clone();
        match &successor {
            None => {
                tx.set_field(Field::TrunkTransaction, trunk)?;
                tx.set_field(Field::BranchTransaction, branch)?;
            }
            Some(hash) => {
                tx.set_field(Field::TrunkTransaction, hash)?;
                tx.set_field(Field::BranchTransaction, trunk)?;
            }
        }

        if tx.is_empty_field(Field::Tag) {
            let obsolete = tx.field(Field::ObsoleteTag).to_vec();
            tx.set_field(Field::Tag, &obsolete)?;
        }
        tx.set_value(Field::AttachmentTimestamp, timestamp_ms)?;
        tx.set_value(Field::AttachmentTimestampLowerBound, 0)?;
        tx.set_value(Field::AttachmentTimestampUpperBound, MAX_TIMESTAMP_VALUE)?;

        let outcome = diver.search(tx.trits(), min_weight_magnitude)?;
        let tx = Transaction::from_trits(&outcome.transaction)?;
        debug!(
            "bundle: transaction {} attached after {} candidates",
            position, outcome.candidates
        );

        successor = Some(tx.hash());
        attached.push(tx);
    }

    attached.reverse();
    info!("bundle: attached {} transactions", attached.len());
    Ok(attached)
}

/// [`attach_bundle`] over tryte strings, stamped with the current time
pub fn attach_bundle_trytes(
    diver: &PearlDiver,
    transactions: &[String],
    trunk: &str,
    branch: &str,
    min_weight_magnitude: usize,
) -> Result<Vec<String>> {
    validate_trytes(trunk, "trunk transaction", Some(HASH_TRYTES))?;
    validate_trytes(branch, "branch transaction", Some(HASH_TRYTES))?;
    let parsed = transactions
        .iter()
        .map(|t| Transaction::from_trytes(t))
        .collect::<Result<Vec<_>>>()?;

    let attached = attach_bundle(
        diver,
        &parsed,
        &trytes_to_trits(trunk)?,
        &trytes_to_trits(branch)?,
        min_weight_magnitude,
        current_timestamp_ms()?,
    )?;
    attached.iter().map(Transaction::to_trytes).collect()
}

/// Milliseconds since the Unix epoch
pub fn current_timestamp_ms() -> Result<i64> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| Error::Internal("system clock is before the Unix epoch"))?;
    i64::try_from(elapsed.as_millis()).map_err(|_| Error::Internal("timestamp overflows i64"))
}
