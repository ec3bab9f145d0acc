// Genesis coinbase transaction

use crate::core::{Hash256, hash256};
use crate::core::serialize::{LengthPrefix, Reader};
use crate::error::{GenesisError, Result};

/// Prevout index marking a coinbase input
pub const COINBASE_PREV_INDEX: u32 = 0xffffffff;
/// Sequence used by the genesis input
pub const FINAL_SEQUENCE: u32 = 0xffffffff;
/// Version of the genesis transaction
pub const TX_VERSION: i32 = 1;

/// Transaction input of the coinbase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInput {
    /// Hash of the previous transaction (all zero for coinbase)
    pub prev_tx_hash: Hash256,
    /// Index of the output in the previous transaction
    pub prev_index: u32,
    /// Signature script carrying the launch message
    pub script_sig: Vec<u8>,
    /// Sequence number
    pub sequence: u32,
}

impl TxInput {
    /// Create a coinbase input
    pub fn coinbase(script_sig: Vec<u8>) -> Self {
        Self {
            prev_tx_hash: Hash256::zero(),
            prev_index: COINBASE_PREV_INDEX,
            script_sig,
            sequence: FINAL_SEQUENCE,
        }
    }

    /// Check if this is a coinbase input
    pub fn is_coinbase(&self) -> bool {
        self.prev_tx_hash == Hash256::zero() && self.prev_index == COINBASE_PREV_INDEX
    }

    fn write(&self, buf: &mut Vec<u8>, prefix: LengthPrefix) -> Result<()> {
        buf.extend_from_slice(self.prev_tx_hash.as_bytes());
        buf.extend_from_slice(&self.prev_index.to_le_bytes());
        prefix.write(buf, &self.script_sig, "scriptSig")?;
        buf.extend_from_slice(&self.sequence.to_le_bytes());
        Ok(())
    }

    fn read(reader: &mut Reader, prefix: LengthPrefix) -> Result<Self> {
        let prev_tx_hash = Hash256::new(reader.read_array()?);
        let prev_index = reader.read_u32_le()?;
        let script_sig = reader.read_prefixed(prefix)?.to_vec();
        let sequence = reader.read_u32_le()?;
        Ok(Self {
            prev_tx_hash,
            prev_index,
            script_sig,
            sequence,
        })
    }
}

/// Transaction output paying the genesis reward
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    /// Amount in the chain's smallest unit
    pub value: u64,
    /// Public key script
    pub script_pubkey: Vec<u8>,
}

impl TxOutput {
    pub fn new(value: u64, script_pubkey: Vec<u8>) -> Self {
        Self {
            value,
            script_pubkey,
        }
    }

    fn write(&self, buf: &mut Vec<u8>, prefix: LengthPrefix) -> Result<()> {
        buf.extend_from_slice(&self.value.to_le_bytes());
        prefix.write(buf, &self.script_pubkey, "scriptPubKey")
    }

    fn read(reader: &mut Reader, prefix: LengthPrefix) -> Result<Self> {
        let value = reader.read_u64_le()?;
        let script_pubkey = reader.read_prefixed(prefix)?.to_vec();
        Ok(Self {
            value,
            script_pubkey,
        })
    }
}

/// The single transaction of a genesis block: one coinbase input, one output.
///
/// The serialized bytes are computed once at construction and never change,
/// so `txid` and the merkle root are stable for the lifetime of the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisTransaction {
    pub version: i32,
    pub input: TxInput,
    pub output: TxOutput,
    pub lock_time: u32,
    prefix: LengthPrefix,
    bytes: Vec<u8>,
}

impl GenesisTransaction {
    /// Build and serialize the coinbase transaction, writing script lengths
    /// with `prefix`
    pub fn new(script_sig: Vec<u8>, output: TxOutput, prefix: LengthPrefix) -> Result<Self> {
        let input = TxInput::coinbase(script_sig);
        let bytes = Self::encode(TX_VERSION, &input, &output, 0, prefix)?;
        Ok(Self {
            version: TX_VERSION,
            input,
            output,
            lock_time: 0,
            prefix,
            bytes,
        })
    }

    fn encode(
        version: i32,
        input: &TxInput,
        output: &TxOutput,
        lock_time: u32,
        prefix: LengthPrefix,
    ) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(
            4 + 1 + 32 + 4 + 9 + input.script_sig.len() + 4 + 1 + 8 + 9 + output.script_pubkey.len() + 4,
        );

        buf.extend_from_slice(&version.to_le_bytes());
        // Input count
        buf.push(1);
        input.write(&mut buf, prefix)?;
        // Output count
        buf.push(1);
        output.write(&mut buf, prefix)?;
        buf.extend_from_slice(&lock_time.to_le_bytes());

        Ok(buf)
    }

    /// Canonical serialization
    pub fn serialize(&self) -> &[u8] {
        &self.bytes
    }

    /// Transaction ID (double SHA256 of serialized tx)
    pub fn txid(&self) -> Hash256 {
        hash256(&self.bytes)
    }

    /// Length encoding used for the scripts
    pub fn length_prefix(&self) -> LengthPrefix {
        self.prefix
    }

    /// Parse a serialized genesis transaction, enforcing the fixed shape
    pub fn deserialize(data: &[u8], prefix: LengthPrefix) -> Result<Self> {
        let mut reader = Reader::new(data);

        let version = reader.read_i32_le()?;

        let input_count = reader.read_u8()?;
        if input_count != 1 {
            return Err(GenesisError::invalid(format!(
                "Genesis transaction must have exactly one input, found {}",
                input_count
            )));
        }
        let input = TxInput::read(&mut reader, prefix)?;
        if !input.is_coinbase() {
            return Err(GenesisError::invalid("Genesis input is not a coinbase input"));
        }

        let output_count = reader.read_u8()?;
        if output_count != 1 {
            return Err(GenesisError::invalid(format!(
                "Genesis transaction must have exactly one output, found {}",
                output_count
            )));
        }
        let output = TxOutput::read(&mut reader, prefix)?;

        let lock_time = reader.read_u32_le()?;
        if reader.remaining() != 0 {
            return Err(GenesisError::invalid(format!(
                "{} trailing bytes after transaction",
                reader.remaining()
            )));
        }

        Ok(Self {
            version,
            input,
            output,
            lock_time,
            prefix,
            bytes: data.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::script::{Script, ScriptSigLayout};

    const GENESIS_PUBKEY: &str = "04678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5f";
    const MESSAGE: &[u8] = b"ViceversaChain 18/Dec/2024 Blockchain that counts backwards from 100M to 0";

    fn devtools_tx() -> GenesisTransaction {
        let script_sig = Script::coinbase_script_sig(ScriptSigLayout::Devtools, 486604799, 4, MESSAGE).unwrap();
        let pubkey = hex::decode(GENESIS_PUBKEY).unwrap();
        let script_pubkey = Script::p2pk_script_pubkey(&pubkey).unwrap();
        GenesisTransaction::new(script_sig, TxOutput::new(50 * 100_000_000, script_pubkey), LengthPrefix::Byte).unwrap()
    }

    #[test]
    fn test_coinbase_input() {
        let input = TxInput::coinbase(vec![1, 2, 3]);
        assert!(input.is_coinbase());
        assert_eq!(input.prev_tx_hash, Hash256::zero());
        assert_eq!(input.prev_index, 0xffffffff);
        assert_eq!(input.sequence, 0xffffffff);
    }

    #[test]
    fn test_devtools_layout_length() {
        let tx = devtools_tx();
        let script_len = 4 + 1 + 1 + MESSAGE.len();
        let pubkey_script_len = 1 + 65 + 1;
        let expected = 4 + 1 + 32 + 4 + 1 + script_len + 4 + 1 + 8 + 1 + pubkey_script_len + 4;

        assert_eq!(MESSAGE.len(), 74);
        assert_eq!(tx.serialize().len(), expected);
        assert_eq!(tx.serialize().len(), 207);
    }

    #[test]
    fn test_devtools_layout_prefix() {
        let tx = devtools_tx();
        let bytes = tx.serialize();

        // version
        assert_eq!(&bytes[0..4], &[0x01, 0x00, 0x00, 0x00]);
        // input count
        assert_eq!(bytes[4], 0x01);
        // null prevout
        assert_eq!(&bytes[5..37], &[0u8; 32]);
        assert_eq!(&bytes[37..41], &[0xff; 4]);
        // scriptSig: length, number literal, extra, message length, message
        assert_eq!(bytes[41], 80);
        assert_eq!(&bytes[42..46], &[0xff, 0xff, 0x00, 0x1d]);
        assert_eq!(bytes[46], 0x04);
        assert_eq!(bytes[47], 74);
        assert_eq!(&bytes[48..122], MESSAGE);
        // sequence
        assert_eq!(&bytes[122..126], &[0xff; 4]);
        // output count and amount
        assert_eq!(bytes[126], 0x01);
        assert_eq!(&bytes[127..135], &5_000_000_000u64.to_le_bytes());
        // scriptPubKey
        assert_eq!(bytes[135], 67);
        assert_eq!(bytes[136], 65);
        assert_eq!(bytes[136 + 66], 0xac);
        // lock time
        assert_eq!(&bytes[203..207], &[0u8; 4]);
    }

    #[test]
    fn test_txid_stable() {
        let tx = devtools_tx();
        assert_eq!(tx.txid(), tx.txid());
        assert_eq!(tx.txid(), devtools_tx().txid());
    }

    #[test]
    fn test_deserialize_roundtrip() {
        let tx = devtools_tx();
        let parsed = GenesisTransaction::deserialize(tx.serialize(), LengthPrefix::Byte).unwrap();
        assert_eq!(parsed, tx);
        assert_eq!(parsed.output.value, 5_000_000_000);
        assert_eq!(parsed.lock_time, 0);
    }

    #[test]
    fn test_deserialize_rejects_trailing_bytes() {
        let mut bytes = devtools_tx().serialize().to_vec();
        bytes.push(0);
        assert!(GenesisTransaction::deserialize(&bytes, LengthPrefix::Byte).is_err());
    }

    #[test]
    fn test_deserialize_rejects_two_inputs() {
        let mut bytes = devtools_tx().serialize().to_vec();
        bytes[4] = 2;
        assert!(GenesisTransaction::deserialize(&bytes, LengthPrefix::Byte).is_err());
    }

    fn tx_with_script_len(len: usize, prefix: LengthPrefix) -> Result<GenesisTransaction> {
        GenesisTransaction::new(vec![0x51; len], TxOutput::new(1, vec![0xac]), prefix)
    }

    #[test]
    fn test_compact_size_script_length_boundary() {
        // 252 still fits in one byte
        let tx = tx_with_script_len(252, LengthPrefix::CompactSize).unwrap();
        assert_eq!(tx.serialize()[41], 0xfc);
        assert_eq!(tx.serialize()[42], 0x51);

        // 253 switches to the three-byte form
        let tx = tx_with_script_len(253, LengthPrefix::CompactSize).unwrap();
        assert_eq!(&tx.serialize()[41..44], &[0xfd, 0xfd, 0x00]);
        assert_eq!(tx.serialize()[44], 0x51);

        let parsed = GenesisTransaction::deserialize(tx.serialize(), LengthPrefix::CompactSize).unwrap();
        assert_eq!(parsed, tx);
        assert_eq!(parsed.input.script_sig.len(), 253);

        // Scripts longer than a byte can express are still encodable
        assert!(tx_with_script_len(300, LengthPrefix::CompactSize).is_ok());
    }

    #[test]
    fn test_raw_byte_script_length() {
        let tx = tx_with_script_len(253, LengthPrefix::Byte).unwrap();
        assert_eq!(tx.serialize()[41], 0xfd);
        assert_eq!(tx.serialize()[42], 0x51);
        assert!(tx_with_script_len(256, LengthPrefix::Byte).is_err());
    }
}
