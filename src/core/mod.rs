// Core genesis data structures

mod types;
mod transaction;
mod block;
mod merkle;
mod hash;
pub mod serialize;
pub mod script;

pub use types::*;
pub use transaction::*;
pub use block::*;
pub use merkle::merkle_root;
pub use hash::*;
pub use script::{Script, ScriptSigLayout};
