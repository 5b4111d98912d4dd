//! Transaction trit layout
//!
//! A transaction is a fixed 8019-trit record. Only the fields needed to
//! chain and attach a bundle are interpreted here; everything else is
//! carried through untouched.

use crate::curl::{Curl, Sponge};
use crate::error::{Error, Result, expect_length};
use crate::params::{HASH_LENGTH, TRANSACTION_LENGTH, TRANSACTION_TRYTES};
use crate::trits::{
    Trit, check_trits, trits_to_trytes, trits_to_value, trytes_to_trits, validate_trytes,
    value_to_trits_padded,
};

/// Named field of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    SignatureMessageFragment,
    Address,
    Value,
    ObsoleteTag,
    Timestamp,
    CurrentIndex,
    LastIndex,
    Bundle,
    TrunkTransaction,
    BranchTransaction,
    Tag,
    AttachmentTimestamp,
    AttachmentTimestampLowerBound,
    AttachmentTimestampUpperBound,
    Nonce,
}

impl Field {
    /// `(offset, length)` in trits
    pub const fn span(self) -> (usize, usize) {
        match self {
            Field::SignatureMessageFragment => (0, 6561),
            Field::Address => (6561, 243),
            Field::Value => (6804, 81),
            Field::ObsoleteTag => (6885, 81),
            Field::Timestamp => (6966, 27),
            Field::CurrentIndex => (6993, 27),
            Field::LastIndex => (7020, 27),
            Field::Bundle => (7047, 243),
            Field::TrunkTransaction => (7290, 243),
            Field::BranchTransaction => (7533, 243),
            Field::Tag => (7776, 81),
            Field::AttachmentTimestamp => (7857, 27),
            Field::AttachmentTimestampLowerBound => (7884, 27),
            Field::AttachmentTimestampUpperBound => (7911, 27),
            Field::Nonce => (7938, 81),
        }
    }

    pub const fn length(self) -> usize {
        self.span().1
    }

    fn name(self) -> &'static str {
        match self {
            Field::SignatureMessageFragment => "signature message fragment",
            Field::Address => "address",
            Field::Value => "value",
            Field::ObsoleteTag => "obsolete tag",
            Field::Timestamp => "timestamp",
            Field::CurrentIndex => "current index",
            Field::LastIndex => "last index",
            Field::Bundle => "bundle",
            Field::TrunkTransaction => "trunk transaction",
            Field::BranchTransaction => "branch transaction",
            Field::Tag => "tag",
            Field::AttachmentTimestamp => "attachment timestamp",
            Field::AttachmentTimestampLowerBound => "attachment timestamp lower bound",
            Field::AttachmentTimestampUpperBound => "attachment timestamp upper bound",
            Field::Nonce => "nonce",
        }
    }
}

/// An 8019-trit transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    trits: Vec<Trit>,
}

impl Transaction {
    pub fn from_trytes(trytes: &str) -> Result<Self> {
        validate_trytes(trytes, "transaction", Some(TRANSACTION_TRYTES))?;
        Ok(Self {
            trits: trytes_to_trits(trytes)?,
        })
    }

    pub fn from_trits(trits: &[Trit]) -> Result<Self> {
        expect_length("transaction", TRANSACTION_LENGTH, trits.len())?;
        check_trits(trits)?;
        Ok(Self {
            trits: trits.to_vec(),
        })
    }

    pub fn trits(&self) -> &[Trit] {
        &self.trits
    }

    pub fn to_trytes(&self) -> Result<String> {
        encode(&self.trits)
    }

    pub fn field(&self, field: Field) -> &[Trit] {
        let (offset, length) = field.span();
        &self.trits[offset..offset + length]
    }

    pub fn field_trytes(&self, field: Field) -> Result<String> {
        encode(self.field(field))
    }

    pub fn set_field(&mut self, field: Field, trits: &[Trit]) -> Result<()> {
        let (offset, length) = field.span();
        expect_length(field.name(), length, trits.len())?;
        check_trits(trits)?;
        self.trits[offset..offset + length].copy_from_slice(trits);
        Ok(())
    }

    pub fn set_field_trytes(&mut self, field: Field, trytes: &str) -> Result<()> {
        self.set_field(field, &trytes_to_trits(trytes)?)
    }

    /// Integer value of a numeric field
    pub fn value_of(&self, field: Field) -> i64 {
        trits_to_value(self.field(field))
    }

    /// Write an integer into a numeric field, zero-padded
    pub fn set_value(&mut self, field: Field, value: i64) -> Result<()> {
        let trits = value_to_trits_padded(value, field.length(), field.name())?;
        self.set_field(field, &trits)
    }

    /// Whether a field holds only zero trits (all `9` trytes)
    pub fn is_empty_field(&self, field: Field) -> bool {
        self.field(field).iter().all(|&t| t == 0)
    }

    /// Curl-P-81 hash of the whole transaction
    pub fn hash(&self) -> Vec<Trit> {
        let mut curl = Curl::p81();
        curl.absorb(&self.trits);
        curl.squeeze(HASH_LENGTH)
    }

    pub fn hash_trytes(&self) -> Result<String> {
        encode(&self.hash())
    }
}

/// Every stored trit is checked on construction and by `set_field`, and every
/// span is a whole number of trytes, so encoding can only fail on a bug
fn encode(trits: &[Trit]) -> Result<String> {
    trits_to_trytes(trits)
        .map_err(|_| Error::Internal("transaction trits do not encode as trytes"))
}
