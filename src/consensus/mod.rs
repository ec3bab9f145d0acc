// Proof-of-work search for the genesis header

pub mod target;
pub mod pow;
pub mod parallel;
pub mod genesis;

pub use target::Target;
pub use pow::{ExhaustionPolicy, HeaderTemplate, Miner, MinerOptions, MiningResult, Progress, PROGRESS_INTERVAL};
pub use genesis::{mine_genesis, verify_genesis};
