// Genesis block miner
// Builds a chain's first block and searches for a proof-of-work nonce

pub mod core;
pub mod consensus;
pub mod config;
pub mod error;
pub mod report;
pub mod cli;

// Re-exports for convenience
pub use self::core::{BlockHeader, GenesisBlock, GenesisTransaction, Hash256, Script, ScriptSigLayout, merkle_root};
pub use consensus::{ExhaustionPolicy, Miner, MinerOptions, MiningResult, Progress, Target, mine_genesis, verify_genesis};
pub use config::{GenesisParams, Preset};
pub use error::{GenesisError, Result};
pub use cli::{Cli, CliHandler};
