// Script templates for the genesis coinbase (no interpreter)

use crate::core::serialize::LengthPrefix;
use crate::error::{GenesisError, Result};
use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};

/// Opcodes used by the genesis scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    /// Push an empty item
    Op0 = 0x00,
    /// Next byte is the length of the data to push
    OpPushData1 = 0x4c,
    /// Push the number 1 (OP_2..OP_16 follow consecutively)
    Op1 = 0x51,
    /// Check signature against the pushed public key
    OpCheckSig = 0xac,
}

/// How the coinbase script-sig is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScriptSigLayout {
    /// Raw fields: `u32le(number) || extra || len(message) || message`
    #[default]
    Devtools,
    /// Proper script pushes: `push(number) push(extra) push(message)`,
    /// the encoding a node uses when it rebuilds the genesis block
    Consensus,
}

impl ScriptSigLayout {
    /// How script lengths are written in the transaction
    pub fn length_prefix(&self) -> LengthPrefix {
        match self {
            ScriptSigLayout::Devtools => LengthPrefix::Byte,
            ScriptSigLayout::Consensus => LengthPrefix::CompactSize,
        }
    }
}

/// Script builder for the genesis coinbase
pub struct Script;

impl Script {
    /// Build the coinbase scriptSig carrying the launch message
    pub fn coinbase_script_sig(
        layout: ScriptSigLayout,
        number: u32,
        extra: u8,
        message: &[u8],
    ) -> Result<Vec<u8>> {
        let message_len = u8::try_from(message.len()).map_err(|_| {
            GenesisError::invalid(format!(
                "Coinbase message is {} bytes, limit is 255",
                message.len()
            ))
        })?;

        let mut script = Vec::with_capacity(message.len() + 10);
        match layout {
            ScriptSigLayout::Devtools => {
                script.extend_from_slice(&number.to_le_bytes());
                script.push(extra);
                script.push(message_len);
                script.extend_from_slice(message);
            }
            ScriptSigLayout::Consensus => {
                Self::push_int(&mut script, i64::from(number));
                Self::push_data(&mut script, &Self::script_num(i64::from(extra)));
                Self::push_data(&mut script, message);
            }
        }
        Ok(script)
    }

    /// Create a pay-to-pubkey scriptPubKey
    /// <pubkey> OP_CHECKSIG
    pub fn p2pk_script_pubkey(pubkey: &[u8]) -> Result<Vec<u8>> {
        Self::validate_pubkey(pubkey)?;

        let mut script = Vec::with_capacity(pubkey.len() + 2);
        // Keys are 33 or 65 bytes, always a direct push
        script.push(pubkey.len() as u8);
        script.extend_from_slice(pubkey);
        script.push(OpCode::OpCheckSig as u8);
        Ok(script)
    }

    /// Reject anything that is not a secp256k1 point (compressed or uncompressed)
    pub fn validate_pubkey(pubkey: &[u8]) -> Result<()> {
        PublicKey::from_slice(pubkey)
            .map(|_| ())
            .map_err(|e| GenesisError::invalid(format!("Invalid public key: {}", e)))
    }

    /// Minimal little-endian number encoding with a sign bit
    pub fn script_num(value: i64) -> Vec<u8> {
        if value == 0 {
            return Vec::new();
        }

        let negative = value < 0;
        let mut abs = value.unsigned_abs();
        let mut out = Vec::new();
        while abs > 0 {
            out.push((abs & 0xff) as u8);
            abs >>= 8;
        }

        // Top bit is the sign; add a byte if the magnitude already uses it
        let last = out.len() - 1;
        if out[last] & 0x80 != 0 {
            out.push(if negative { 0x80 } else { 0x00 });
        } else if negative {
            out[last] |= 0x80;
        }
        out
    }

    /// Push an integer: small values use OP_0/OP_1..OP_16, the rest a data push
    fn push_int(script: &mut Vec<u8>, value: i64) {
        match value {
            0 => script.push(OpCode::Op0 as u8),
            1..=16 => script.push(OpCode::Op1 as u8 + (value as u8 - 1)),
            _ => Self::push_data(script, &Self::script_num(value)),
        }
    }

    /// Push data with the shortest prefix. Callers keep data within 255 bytes.
    fn push_data(script: &mut Vec<u8>, data: &[u8]) {
        if data.len() < OpCode::OpPushData1 as usize {
            script.push(data.len() as u8);
        } else {
            script.push(OpCode::OpPushData1 as u8);
            script.push(data.len() as u8);
        }
        script.extend_from_slice(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secp256k1::{Secp256k1, SecretKey};

    const GENESIS_PUBKEY: &str = "04678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5f";

    #[test]
    fn test_p2pk_script_creation() {
        let pubkey = hex::decode(GENESIS_PUBKEY).unwrap();
        let script = Script::p2pk_script_pubkey(&pubkey).unwrap();

        assert_eq!(script.len(), 67);
        assert_eq!(script[0], 65);
        assert_eq!(&script[1..66], &pubkey[..]);
        assert_eq!(script[66], OpCode::OpCheckSig as u8);
    }

    #[test]
    fn test_compressed_key_accepted() {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(&[0x42; 32]).unwrap();
        let compressed = secret_key.public_key(&secp).serialize();

        let script = Script::p2pk_script_pubkey(&compressed).unwrap();
        assert_eq!(script.len(), 35);
        assert_eq!(script[0], 33);
    }

    #[test]
    fn test_invalid_pubkey_rejected() {
        // Right length, not on the curve
        let mut bogus = vec![0x04];
        bogus.extend_from_slice(&[0x01; 64]);
        assert!(Script::validate_pubkey(&bogus).is_err());

        assert!(Script::p2pk_script_pubkey(&[0x02; 10]).is_err());
    }

    #[test]
    fn test_devtools_script_sig() {
        let script = Script::coinbase_script_sig(ScriptSigLayout::Devtools, 486604799, 4, b"abc").unwrap();
        assert_eq!(script, vec![0xff, 0xff, 0x00, 0x1d, 0x04, 0x03, b'a', b'b', b'c']);
    }

    #[test]
    fn test_consensus_script_sig() {
        let script = Script::coinbase_script_sig(ScriptSigLayout::Consensus, 486604799, 4, b"abc").unwrap();
        assert_eq!(
            script,
            vec![0x04, 0xff, 0xff, 0x00, 0x1d, 0x01, 0x04, 0x03, b'a', b'b', b'c']
        );
    }

    #[test]
    fn test_consensus_long_message_uses_pushdata1() {
        let message = [b'x'; 80];
        let script = Script::coinbase_script_sig(ScriptSigLayout::Consensus, 486604799, 4, &message).unwrap();
        assert_eq!(script[7], OpCode::OpPushData1 as u8);
        assert_eq!(script[8], 80);
        assert_eq!(script.len(), 9 + 80);
    }

    #[test]
    fn test_message_too_long() {
        let message = vec![b'x'; 256];
        let err = Script::coinbase_script_sig(ScriptSigLayout::Devtools, 0, 4, &message).unwrap_err();
        assert!(matches!(err, GenesisError::InvalidParameter(_)));
    }

    #[test]
    fn test_script_num() {
        assert_eq!(Script::script_num(0), Vec::<u8>::new());
        assert_eq!(Script::script_num(4), vec![0x04]);
        assert_eq!(Script::script_num(0x80), vec![0x80, 0x00]);
        assert_eq!(Script::script_num(-1), vec![0x81]);
        assert_eq!(Script::script_num(486604799), vec![0xff, 0xff, 0x00, 0x1d]);
    }

    #[test]
    fn test_small_number_uses_opcode() {
        let script = Script::coinbase_script_sig(ScriptSigLayout::Consensus, 5, 4, b"").unwrap();
        assert_eq!(script[0], 0x55);
    }
}
