use crate::block::{Block, DraftBlock};
use crate::chain::Chain;
use crate::error::{AcceptError, ChainCorrupt};
use crate::hash::BlockHash;
use crate::pow::Difficulty;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A chain shared between several miners. Acceptance runs under the write
/// lock, so only one block can extend a given tip; losers see the new tip and
/// fail the linkage check.
#[derive(Clone, Debug)]
pub struct SharedChain {
    inner: Arc<RwLock<Chain>>,
}

impl SharedChain {
    pub fn new(chain: Chain) -> Self {
        Self {
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    // `add_block` pushes only after every check, so a poisoned lock still
    // guards a consistent chain.
    fn read(&self) -> RwLockReadGuard<'_, Chain> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Chain> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn difficulty(&self) -> Difficulty {
        self.read().difficulty()
    }

    /// Clone of the current tip, for building the next draft without holding
    /// the lock while mining.
    pub fn tip(&self) -> Block {
        self.read().last_block().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Accept a mined draft; returns the sealed block on success.
    pub fn add_block(&self, block: DraftBlock, proof: BlockHash) -> Result<Block, AcceptError> {
        self.write().add_block(block, proof).cloned()
    }

    pub fn verify(&self) -> Result<(), ChainCorrupt> {
        self.read().verify()
    }

    pub fn is_chain_valid(&self) -> bool {
        self.read().is_chain_valid()
    }

    /// Copy of the whole chain.
    pub fn snapshot(&self) -> Chain {
        self.read().clone()
    }
}

impl From<Chain> for SharedChain {
    fn from(chain: Chain) -> Self {
        Self::new(chain)
    }
}
