//! Block records in their two phases: a mutable draft that is mined, and the
//! sealed block the chain stores once a proof has been accepted.

use crate::hash::{sha256, BlockHash, ParentHash};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Opaque transaction payload. The core only hashes it.
pub type Transaction = serde_json::Value;

/// Canonical hash input: the compact JSON array
/// `[index, transactions, timestamp, previous_hash, nonce]`.
pub fn canonical_encoding(
    index: u64,
    transactions: &[Transaction],
    timestamp: f64,
    previous_hash: &ParentHash,
    nonce: u64,
) -> Vec<u8> {
    // serde_json::Value payloads and the primitive fields have no failing Serialize path.
    serde_json::to_vec(&(index, transactions, timestamp, previous_hash, nonce))
        .expect("canonical block encoding is infallible")
}

pub(crate) fn hash_fields(
    index: u64,
    transactions: &[Transaction],
    timestamp: f64,
    previous_hash: &ParentHash,
    nonce: u64,
) -> BlockHash {
    sha256(&canonical_encoding(
        index,
        transactions,
        timestamp,
        previous_hash,
        nonce,
    ))
}

/// Seconds since the Unix epoch.
pub fn current_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// A candidate block. Everything is mutable; the nonce is what mining varies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DraftBlock {
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub timestamp: f64,
    pub previous_hash: ParentHash,
    pub nonce: u64,
}

impl DraftBlock {
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        timestamp: f64,
        previous_hash: ParentHash,
    ) -> Self {
        Self {
            index,
            transactions,
            timestamp,
            previous_hash,
            nonce: 0,
        }
    }

    /// Draft stamped with the current time.
    pub fn now(index: u64, transactions: Vec<Transaction>, previous_hash: ParentHash) -> Self {
        Self::new(index, transactions, current_timestamp(), previous_hash)
    }

    /// Draft that extends `tip`.
    pub fn on_top_of(tip: &Block, transactions: Vec<Transaction>) -> Self {
        Self::now(tip.index + 1, transactions, ParentHash::Block(tip.hash))
    }

    pub fn compute_hash(&self) -> BlockHash {
        hash_fields(
            self.index,
            &self.transactions,
            self.timestamp,
            &self.previous_hash,
            self.nonce,
        )
    }

    pub(crate) fn seal(self, hash: BlockHash) -> Block {
        Block {
            index: self.index,
            transactions: self.transactions,
            timestamp: self.timestamp,
            previous_hash: self.previous_hash,
            nonce: self.nonce,
            hash,
        }
    }
}

/// A block that has been accepted into a chain. `hash` is written once, when
/// the block is sealed, and validation never trusts it without recomputing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub(crate) index: u64,
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) timestamp: f64,
    pub(crate) previous_hash: ParentHash,
    pub(crate) nonce: u64,
    pub(crate) hash: BlockHash,
}

impl Block {
    pub(crate) fn genesis(timestamp: f64) -> Self {
        let draft = DraftBlock::new(0, Vec::new(), timestamp, ParentHash::Genesis);
        let hash = draft.compute_hash();
        draft.seal(hash)
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn previous_hash(&self) -> &ParentHash {
        &self.previous_hash
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// The digest recorded when the block was sealed.
    pub fn hash(&self) -> BlockHash {
        self.hash
    }

    pub fn compute_hash(&self) -> BlockHash {
        hash_fields(
            self.index,
            &self.transactions,
            self.timestamp,
            &self.previous_hash,
            self.nonce,
        )
    }

    /// Stored hash equals the recomputed one.
    pub fn is_consistent(&self) -> bool {
        self.hash == self.compute_hash()
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.previous_hash.is_genesis()
    }
}
