// Basic types for genesis block data

use crate::error::{GenesisError, Result};
use primitive_types::U256;
use std::fmt;

/// 256-bit hash type (32 bytes, internal byte order)
/// Used for block hashes, transaction IDs, and merkle roots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// Create a new Hash256 from a byte array
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create a Hash256 from a slice
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        if slice.len() != 32 {
            return Err(GenesisError::invalid(format!(
                "Invalid hash length: expected 32, got {}",
                slice.len()
            )));
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Get the hash as a byte slice
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Create zero hash (used for genesis block's prev_block_hash)
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Interpret the digest as an integer for proof-of-work comparison.
    /// The internal bytes are little-endian, so this equals reading the
    /// byte-reversed digest as a big-endian number.
    pub fn to_u256(&self) -> U256 {
        U256::from_little_endian(&self.0)
    }

    /// Convert to hex string (reversed for display)
    pub fn to_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }

    /// Create from hex string (expects reversed byte order, optional 0x prefix)
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let trimmed = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(trimmed)?;
        let mut hash = Self::from_slice(&bytes)?;
        hash.0.reverse();
        Ok(hash)
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
