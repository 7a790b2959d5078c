//! SHA-256 digests and parent references.

use crate::constants::{GENESIS_PARENT, HASH_HEX_SIZE, HASH_SIZE};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashParseError {
    #[error("expected {HASH_HEX_SIZE} hex characters, got {0}")]
    Length(usize),
    #[error("invalid hex digest: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// A block digest. Always rendered as 64 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockHash([u8; HASH_SIZE]);

impl BlockHash {
    pub const fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, HashParseError> {
        if s.len() != HASH_HEX_SIZE {
            return Err(HashParseError::Length(s.len()));
        }
        let mut out = [0u8; HASH_SIZE];
        hex::decode_to_slice(s, &mut out)?;
        Ok(Self(out))
    }

    /// Number of leading `'0'` characters in the hex rendering.
    pub fn leading_zero_nibbles(&self) -> u32 {
        let mut total = 0u32;
        for b in &self.0 {
            if *b == 0 {
                total += 2;
            } else {
                if *b >> 4 == 0 {
                    total += 1;
                }
                break;
            }
        }
        total
    }
}

/// SHA-256 over `data`.
pub fn sha256(data: &[u8]) -> BlockHash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&digest[..]);
    BlockHash(out)
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", &self.to_hex()[..12])
    }
}

impl std::str::FromStr for BlockHash {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for BlockHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

/// What a block points back at: the genesis sentinel `"0"` or a real digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ParentHash {
    Genesis,
    Block(BlockHash),
}

impl ParentHash {
    pub fn is_genesis(&self) -> bool {
        matches!(self, ParentHash::Genesis)
    }
}

impl From<BlockHash> for ParentHash {
    fn from(hash: BlockHash) -> Self {
        ParentHash::Block(hash)
    }
}

impl fmt::Display for ParentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentHash::Genesis => f.write_str(GENESIS_PARENT),
            ParentHash::Block(hash) => fmt::Display::fmt(hash, f),
        }
    }
}

impl Serialize for ParentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ParentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s == GENESIS_PARENT {
            return Ok(ParentHash::Genesis);
        }
        BlockHash::from_hex(&s)
            .map(ParentHash::Block)
            .map_err(de::Error::custom)
    }
}
