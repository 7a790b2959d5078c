//! Proof-of-work ledger core.
//!
//! - [`block`]: draft and sealed blocks, canonical hashing
//! - [`chain`]: the append-only chain, acceptance and full validation
//! - [`pow`]: difficulty, the miner and the resumable mining job
//! - [`mine`]: parallel nonce search
//! - [`shared`]: a chain several miners can race on

pub mod block;
pub mod chain;
pub mod config;
pub mod constants;
pub mod error;
pub mod hash;
pub mod mine;
pub mod pow;
pub mod shared;

pub use block::{canonical_encoding, Block, DraftBlock, Transaction};
pub use chain::{Chain, ChainSnapshot};
pub use config::ChainConfig;
pub use error::{AcceptError, ChainCorrupt, ChainError, ChainFault, ConfigError, ProofError};
pub use hash::{sha256, BlockHash, HashParseError, ParentHash};
pub use mine::mine_parallel;
pub use pow::{CancelToken, Difficulty, Miner, MiningJob, MiningStatus};
pub use shared::SharedChain;
