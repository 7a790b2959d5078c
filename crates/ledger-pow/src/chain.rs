//! The append-only chain and its single acceptance path.

use crate::block::{current_timestamp, Block, DraftBlock};
use crate::config::ChainConfig;
use crate::error::{AcceptError, ChainCorrupt, ChainError, ChainFault};
use crate::hash::{BlockHash, ParentHash};
use crate::pow::Difficulty;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Serialized form of a chain. Converting it back into a [`Chain`] does not
/// validate history; call [`Chain::verify`] on the result.
#[derive(Debug, Deserialize)]
pub struct ChainSnapshot {
    pub difficulty: Difficulty,
    pub blocks: Vec<Block>,
}

impl TryFrom<ChainSnapshot> for Chain {
    type Error = ChainError;

    fn try_from(snapshot: ChainSnapshot) -> Result<Self, Self::Error> {
        Chain::from_blocks(snapshot.difficulty, snapshot.blocks)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "ChainSnapshot")]
pub struct Chain {
    difficulty: Difficulty,
    blocks: Vec<Block>,
}

impl Chain {
    pub fn new(config: &ChainConfig) -> Self {
        Self::with_difficulty(config.difficulty)
    }

    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        let mut chain = Self {
            difficulty,
            blocks: Vec::new(),
        };
        chain.create_genesis();
        chain
    }

    /// Adopt an existing block list as-is. Fails only when it is empty.
    pub fn from_blocks(difficulty: Difficulty, blocks: Vec<Block>) -> Result<Self, ChainError> {
        if blocks.is_empty() {
            return Err(ChainError::EmptyChain);
        }
        Ok(Self { difficulty, blocks })
    }

    fn create_genesis(&mut self) {
        let genesis = Block::genesis(current_timestamp());
        info!(hash = %genesis.hash(), "created genesis block");
        self.blocks.push(genesis);
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// The tip. A chain always holds at least its genesis block.
    pub fn last_block(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// The only way a chain grows. The candidate must extend the tip and
    /// `proof` must be its own digest at the chain's difficulty. On success
    /// the block is sealed with `proof` as its hash and appended; on failure
    /// the chain is unchanged.
    pub fn add_block(
        &mut self,
        block: DraftBlock,
        proof: BlockHash,
    ) -> Result<&Block, AcceptError> {
        let tip = self.last_block();
        if block.previous_hash != ParentHash::Block(tip.hash()) {
            debug!(index = block.index, tip = %tip.hash(), "rejected block: stale parent");
            return Err(AcceptError::LinkageMismatch {
                expected: tip.hash(),
                found: block.previous_hash,
            });
        }
        let expected_index = tip.index() + 1;
        if block.index != expected_index {
            debug!(index = block.index, expected_index, "rejected block: index");
            return Err(AcceptError::IndexMismatch {
                expected: expected_index,
                found: block.index,
            });
        }
        // Non-finite floats all encode as `null`.
        if !block.timestamp.is_finite() {
            debug!(
                index = block.index,
                timestamp = block.timestamp,
                "rejected block: timestamp"
            );
            return Err(AcceptError::InvalidTimestamp(block.timestamp));
        }
        if let Err(e) = self.difficulty.verify_proof(&block, &proof) {
            debug!(index = block.index, error = %e, "rejected block: proof");
            return Err(e.into());
        }

        info!(index = block.index, nonce = block.nonce, hash = %proof, "accepted block");
        self.blocks.push(block.seal(proof));
        Ok(self.last_block())
    }

    /// Re-derive every hash and re-check every link. Reports the first
    /// offending block.
    pub fn verify(&self) -> Result<(), ChainCorrupt> {
        let genesis = &self.blocks[0];
        if !genesis.is_genesis() {
            return Err(self.corrupt(0, ChainFault::InvalidGenesis));
        }
        let computed = genesis.compute_hash();
        if genesis.hash() != computed {
            return Err(self.corrupt(
                0,
                ChainFault::HashMismatch {
                    stored: genesis.hash(),
                    computed,
                },
            ));
        }

        for (i, pair) in self.blocks.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            let index = i + 1;

            let computed = current.compute_hash();
            if current.hash() != computed {
                return Err(self.corrupt(
                    index,
                    ChainFault::HashMismatch {
                        stored: current.hash(),
                        computed,
                    },
                ));
            }
            if *current.previous_hash() != ParentHash::Block(previous.hash()) {
                return Err(self.corrupt(
                    index,
                    ChainFault::BrokenLink {
                        expected: previous.hash(),
                        found: *current.previous_hash(),
                    },
                ));
            }
            if current.index() != previous.index() + 1 {
                return Err(self.corrupt(
                    index,
                    ChainFault::IndexGap {
                        expected: previous.index() + 1,
                        found: current.index(),
                    },
                ));
            }
            if !self.difficulty.is_satisfied_by(&current.hash()) {
                return Err(self.corrupt(
                    index,
                    ChainFault::InsufficientWork {
                        required: self.difficulty.zeros(),
                        hash: current.hash(),
                    },
                ));
            }
        }
        Ok(())
    }

    pub fn is_chain_valid(&self) -> bool {
        self.verify().is_ok()
    }

    fn corrupt(&self, index: usize, fault: ChainFault) -> ChainCorrupt {
        let err = ChainCorrupt { index, fault };
        warn!(len = self.blocks.len(), "{err}");
        err
    }
}
