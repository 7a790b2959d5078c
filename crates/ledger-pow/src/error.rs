use crate::hash::{BlockHash, ParentHash};
use thiserror::Error;

/// Why a claimed proof-of-work digest was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofError {
    #[error("digest {found} has fewer than {required} leading zero nibbles")]
    InsufficientWork { required: u32, found: BlockHash },
    #[error("claimed digest {claimed} does not match block digest {computed}")]
    DigestMismatch {
        claimed: BlockHash,
        computed: BlockHash,
    },
}

/// Rejection of a candidate block. The chain is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AcceptError {
    #[error("block does not extend the tip: expected parent {expected}, found {found}")]
    LinkageMismatch {
        expected: BlockHash,
        found: ParentHash,
    },
    #[error("block index {found} does not follow the tip (expected {expected})")]
    IndexMismatch { expected: u64, found: u64 },
    #[error("block timestamp {0} is not a finite number")]
    InvalidTimestamp(f64),
    #[error("invalid proof of work: {0}")]
    InvalidProof(#[from] ProofError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("chain has no blocks")]
    EmptyChain,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainFault {
    #[error("stored hash {stored} does not match recomputed {computed}")]
    HashMismatch {
        stored: BlockHash,
        computed: BlockHash,
    },
    #[error("previous_hash {found} does not reference predecessor {expected}")]
    BrokenLink {
        expected: BlockHash,
        found: ParentHash,
    },
    #[error("index {found} does not follow predecessor (expected {expected})")]
    IndexGap { expected: u64, found: u64 },
    #[error("first block is not a genesis block (index 0, parent \"0\")")]
    InvalidGenesis,
    #[error("hash {hash} has fewer than {required} leading zero nibbles")]
    InsufficientWork { required: u32, hash: BlockHash },
}

/// Full validation found a block that breaks the chain's history. No repair
/// is possible; the whole chain is untrustworthy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("chain corrupt at block {index}: {fault}")]
pub struct ChainCorrupt {
    pub index: usize,
    pub fault: ChainFault,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("difficulty {0} exceeds the maximum of {}", crate::constants::MAX_DIFFICULTY)]
    DifficultyTooHigh(u32),
    #[error("invalid difficulty value {value:?}: {source}")]
    InvalidDifficulty {
        value: String,
        source: std::num::ParseIntError,
    },
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
