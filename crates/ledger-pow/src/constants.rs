pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const GENESIS_PARENT: &str = "0";
pub const DEFAULT_DIFFICULTY: u32 = 4;
pub const MAX_DIFFICULTY: u32 = HASH_HEX_SIZE as u32;
pub const DIFFICULTY_ENV: &str = "LEDGER_POW_DIFFICULTY";
