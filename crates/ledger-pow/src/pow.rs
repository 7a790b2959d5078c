//! Proof-of-work: the difficulty predicate, the nonce search, and the miner
//! that proposes blocks to a [`Chain`].

use crate::block::DraftBlock;
use crate::chain::Chain;
use crate::constants::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
use crate::error::{ConfigError, ProofError};
use crate::hash::BlockHash;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Attempts per [`MiningJob::step`] when a miner drives the job itself.
const ATTEMPTS_PER_STEP: u64 = 4096;

/// Required number of leading zero hex nibbles in an accepted digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Difficulty(u32);

impl Difficulty {
    pub fn new(zeros: u32) -> Result<Self, ConfigError> {
        if zeros > MAX_DIFFICULTY {
            return Err(ConfigError::DifficultyTooHigh(zeros));
        }
        Ok(Self(zeros))
    }

    pub fn zeros(&self) -> u32 {
        self.0
    }

    pub fn is_satisfied_by(&self, hash: &BlockHash) -> bool {
        hash.leading_zero_nibbles() >= self.0
    }

    /// The acceptance rule for a claimed proof: it meets the target and it is
    /// the block's own digest at its current nonce.
    pub fn verify_proof(&self, block: &DraftBlock, claimed: &BlockHash) -> Result<(), ProofError> {
        if !self.is_satisfied_by(claimed) {
            return Err(ProofError::InsufficientWork {
                required: self.0,
                found: *claimed,
            });
        }
        let computed = block.compute_hash();
        if computed != *claimed {
            return Err(ProofError::DigestMismatch {
                claimed: *claimed,
                computed,
            });
        }
        Ok(())
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(DEFAULT_DIFFICULTY)
    }
}

impl TryFrom<u32> for Difficulty {
    type Error = ConfigError;

    fn try_from(zeros: u32) -> Result<Self, Self::Error> {
        Self::new(zeros)
    }
}

impl From<Difficulty> for u32 {
    fn from(d: Difficulty) -> Self {
        d.0
    }
}

/// Shared cancellation flag. Once cancelled it stays cancelled.
#[derive(Clone, Debug, Default)]
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

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MiningStatus {
    Searching,
    Found(BlockHash),
    Cancelled,
    /// Every nonce was tried without success.
    Exhausted,
}

/// Resumable nonce search. Each call to [`step`](Self::step) does a bounded
/// amount of work, so the search can be driven by any scheduler.
#[derive(Clone, Debug)]
pub struct MiningJob {
    draft: DraftBlock,
    difficulty: Difficulty,
    status: MiningStatus,
    attempts: u64,
}

impl MiningJob {
    pub fn new(mut draft: DraftBlock, difficulty: Difficulty) -> Self {
        draft.nonce = 0;
        Self {
            draft,
            difficulty,
            status: MiningStatus::Searching,
            attempts: 0,
        }
    }

    pub fn status(&self) -> MiningStatus {
        self.status
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn draft(&self) -> &DraftBlock {
        &self.draft
    }

    pub fn into_draft(self) -> DraftBlock {
        self.draft
    }

    /// Try up to `max_attempts` nonces. Cancellation is checked before every
    /// attempt. Once the job leaves `Searching` further calls do nothing.
    pub fn step(&mut self, max_attempts: u64, cancel: &CancelToken) -> MiningStatus {
        for _ in 0..max_attempts {
            if self.status != MiningStatus::Searching {
                break;
            }
            if cancel.is_cancelled() {
                debug!(
                    index = self.draft.index,
                    nonce = self.draft.nonce,
                    "mining cancelled"
                );
                self.status = MiningStatus::Cancelled;
                break;
            }
            let hash = self.draft.compute_hash();
            self.attempts += 1;
            if self.difficulty.is_satisfied_by(&hash) {
                self.status = MiningStatus::Found(hash);
                break;
            }
            match self.draft.nonce.checked_add(1) {
                Some(next) => self.draft.nonce = next,
                None => self.status = MiningStatus::Exhausted,
            }
        }
        self.status
    }
}

/// Proposes blocks: finds a nonce for a draft and hands the result to the
/// chain, which alone decides acceptance.
#[derive(Clone, Copy, Debug, Default)]
pub struct Miner {
    difficulty: Difficulty,
}

impl Miner {
    pub fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }

    /// A miner targeting the chain's own difficulty.
    pub fn for_chain(chain: &Chain) -> Self {
        Self::new(chain.difficulty())
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Reset the nonce to 0 and search upward until the digest meets the
    /// difficulty. Blocks until a nonce is found; use
    /// [`mine_with_cancel`](Self::mine_with_cancel) to bound it.
    pub fn mine(&self, block: &mut DraftBlock) -> BlockHash {
        block.nonce = 0;
        loop {
            let hash = block.compute_hash();
            if self.difficulty.is_satisfied_by(&hash) {
                info!(
                    index = block.index,
                    nonce = block.nonce,
                    %hash,
                    "mined block"
                );
                return hash;
            }
            block.nonce = block.nonce.wrapping_add(1);
        }
    }

    /// Same search as [`mine`](Self::mine) but gives up once `cancel` fires.
    /// On `None` the draft keeps the last nonce tried.
    pub fn mine_with_cancel(
        &self,
        block: &mut DraftBlock,
        cancel: &CancelToken,
    ) -> Option<BlockHash> {
        let mut job = MiningJob::new(block.clone(), self.difficulty);
        let status = loop {
            match job.step(ATTEMPTS_PER_STEP, cancel) {
                MiningStatus::Searching => continue,
                other => break other,
            }
        };
        *block = job.into_draft();
        match status {
            MiningStatus::Found(hash) => {
                info!(index = block.index, nonce = block.nonce, %hash, "mined block");
                Some(hash)
            }
            _ => None,
        }
    }

    pub fn valid_proof(&self, block: &DraftBlock, claimed: &BlockHash) -> bool {
        self.difficulty.verify_proof(block, claimed).is_ok()
    }

    /// Offer a mined block to the chain. Returns whether it was accepted and
    /// a human-readable reason.
    pub fn submit(&self, chain: &mut Chain, block: DraftBlock, proof: BlockHash) -> (bool, String) {
        match chain.add_block(block, proof) {
            Ok(_) => (true, "Block added to the blockchain.".to_string()),
            Err(e) => (false, e.to_string()),
        }
    }

    pub fn validate_chain(&self, chain: &Chain) -> bool {
        chain.is_chain_valid()
    }
}
