// Block header and genesis block assembly

use crate::config::GenesisParams;
use crate::core::script::Script;
use crate::core::serialize::Reader;
use crate::core::transaction::TxOutput;
use crate::core::{GenesisTransaction, Hash256, hash256, merkle_root};
use crate::error::{GenesisError, Result};

/// Serialized header size
pub const HEADER_SIZE: usize = 80;
/// Header bytes before the nonce
pub const HEADER_PREFIX_SIZE: usize = 76;

/// Block header - 80 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Block version
    pub version: i32,
    /// Hash of the previous block
    pub prev_block_hash: Hash256,
    /// Merkle root of all transactions in the block
    pub merkle_root: Hash256,
    /// Block timestamp (Unix epoch)
    pub timestamp: u32,
    /// Difficulty target (compact format)
    pub bits: u32,
    /// Nonce for proof-of-work
    pub nonce: u32,
}

impl BlockHeader {
    /// Create a new block header
    pub fn new(
        version: i32,
        prev_block_hash: Hash256,
        merkle_root: Hash256,
        timestamp: u32,
        bits: u32,
        nonce: u32,
    ) -> Self {
        Self {
            version,
            prev_block_hash,
            merkle_root,
            timestamp,
            bits,
            nonce,
        }
    }

    /// Calculate the hash of this block header
    pub fn hash(&self) -> Hash256 {
        hash256(&self.serialize())
    }

    /// Everything except the nonce, in wire order
    pub fn prefix(&self) -> [u8; HEADER_PREFIX_SIZE] {
        let mut buf = [0u8; HEADER_PREFIX_SIZE];
        buf[0..4].copy_from_slice(&self.version.to_le_bytes());
        buf[4..36].copy_from_slice(self.prev_block_hash.as_bytes());
        buf[36..68].copy_from_slice(self.merkle_root.as_bytes());
        buf[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        buf[72..76].copy_from_slice(&self.bits.to_le_bytes());
        buf
    }

    /// Serialize the block header (always 80 bytes)
    pub fn serialize(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[..HEADER_PREFIX_SIZE].copy_from_slice(&self.prefix());
        buf[HEADER_PREFIX_SIZE..].copy_from_slice(&self.nonce.to_le_bytes());
        buf
    }

    /// Deserialize a block header
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        if data.len() != HEADER_SIZE {
            return Err(GenesisError::invalid(format!(
                "Block header must be {} bytes, got {}",
                HEADER_SIZE,
                data.len()
            )));
        }

        let mut reader = Reader::new(data);
        Ok(Self {
            version: reader.read_i32_le()?,
            prev_block_hash: Hash256::new(reader.read_array()?),
            merkle_root: Hash256::new(reader.read_array()?),
            timestamp: reader.read_u32_le()?,
            bits: reader.read_u32_le()?,
            nonce: reader.read_u32_le()?,
        })
    }

    /// Check if this is a genesis header
    pub fn is_genesis(&self) -> bool {
        self.prev_block_hash == Hash256::zero()
    }
}

/// Genesis block - header plus its only transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisBlock {
    pub header: BlockHeader,
    pub transaction: GenesisTransaction,
}

impl GenesisBlock {
    /// Build the coinbase and an unmined header (nonce = `nonce`)
    pub fn build(params: &GenesisParams, nonce: u32) -> Result<Self> {
        let script_sig = Script::coinbase_script_sig(
            params.layout,
            params.script_sig_number,
            params.script_sig_extra,
            params.message.as_bytes(),
        )?;
        let script_pubkey = Script::p2pk_script_pubkey(&params.pubkey_bytes()?)?;
        let transaction = GenesisTransaction::new(
            script_sig,
            TxOutput::new(params.reward, script_pubkey),
            params.layout.length_prefix(),
        )?;

        let merkle_root = merkle_root(&transaction);
        log::debug!("Genesis coinbase {} bytes, merkle root {}", transaction.serialize().len(), merkle_root);

        let header = BlockHeader::new(
            params.version,
            Hash256::zero(),
            merkle_root,
            params.timestamp,
            params.bits,
            nonce,
        );

        Ok(Self {
            header,
            transaction,
        })
    }

    /// Get the block hash
    pub fn hash(&self) -> Hash256 {
        self.header.hash()
    }
}
