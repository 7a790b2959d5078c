use crate::constants::DIFFICULTY_ENV;
use crate::error::ConfigError;
use crate::pow::Difficulty;
use serde::{Deserialize, Serialize};

/// Chain parameters. The chain's difficulty is the only one miners and the
/// acceptance path consult.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainConfig {
    pub difficulty: Difficulty,
}

impl ChainConfig {
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }

    /// Parse a JSON config such as `{"difficulty": 4}`. Missing fields take
    /// their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Defaults, with `LEDGER_POW_DIFFICULTY` overriding the difficulty when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_override(std::env::var(DIFFICULTY_ENV).ok().as_deref())
    }

    fn with_override(mut self, raw: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(raw) = raw {
            let zeros = raw
                .trim()
                .parse::<u32>()
                .map_err(|source| ConfigError::InvalidDifficulty {
                    value: raw.to_string(),
                    source,
                })?;
            self.difficulty = Difficulty::new(zeros)?;
        }
        Ok(self)
    }
}
