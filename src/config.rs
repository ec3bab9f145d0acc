// Genesis parameters: presets and JSON config files

use crate::core::ScriptSigLayout;
use crate::error::{GenesisError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Smallest units per coin
pub const COIN: u64 = 100_000_000;

/// Public key paid by every preset's genesis output
pub const GENESIS_PUBKEY_HEX: &str = "04678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5f";

/// Number literal at the start of the coinbase scriptSig (0x1d00ffff)
pub const SCRIPT_SIG_NUMBER: u32 = 486604799;

/// Numeric field following the literal
pub const SCRIPT_SIG_EXTRA: u8 = 4;

const DEVTOOLS_MESSAGE: &str = "ViceversaChain 18/Dec/2024 Blockchain that counts backwards from 100M to 0";
const NETWORK_MESSAGE: &str = "ViceversaChain is the Blockchain that counts backwards from 100M to 0";

/// Built-in parameter sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Standalone devtools miner defaults
    #[default]
    Devtools,
    /// Main network genesis
    Main,
    /// Test network genesis
    Test,
}

impl Preset {
    /// Nonce already known to solve this preset's header, if any
    pub fn known_nonce(&self) -> Option<u32> {
        match self {
            Preset::Devtools => None,
            Preset::Main => Some(2306512841),
            Preset::Test => Some(540516),
        }
    }
}

/// Frozen inputs of one genesis mining run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenesisParams {
    /// Launch timestamp (unix seconds)
    pub timestamp: u32,
    /// Compact difficulty target
    #[serde(with = "compact_bits")]
    pub bits: u32,
    /// Block version
    pub version: i32,
    /// Message embedded in the coinbase scriptSig
    pub message: String,
    /// Hex-encoded public key paid by the coinbase output
    pub pubkey: String,
    /// Coinbase reward in smallest units
    pub reward: u64,
    #[serde(default = "default_script_sig_number")]
    pub script_sig_number: u32,
    #[serde(default = "default_script_sig_extra")]
    pub script_sig_extra: u8,
    #[serde(default)]
    pub layout: ScriptSigLayout,
}

fn default_script_sig_number() -> u32 {
    SCRIPT_SIG_NUMBER
}

fn default_script_sig_extra() -> u8 {
    SCRIPT_SIG_EXTRA
}

impl Default for GenesisParams {
    fn default() -> Self {
        Self::preset(Preset::Devtools)
    }
}

impl GenesisParams {
    /// Parameters for a built-in preset
    pub fn preset(preset: Preset) -> Self {
        let (timestamp, bits, message, reward, layout) = match preset {
            Preset::Devtools => (1734523200, 0x1d00ffff, DEVTOOLS_MESSAGE, 50 * COIN, ScriptSigLayout::Devtools),
            Preset::Main => (1767462992, 0x1d00ffff, NETWORK_MESSAGE, COIN / 4, ScriptSigLayout::Consensus),
            Preset::Test => (1767465514, 0x1e0377ae, NETWORK_MESSAGE, COIN / 4, ScriptSigLayout::Consensus),
        };

        Self {
            timestamp,
            bits,
            version: 1,
            message: message.to_string(),
            pubkey: GENESIS_PUBKEY_HEX.to_string(),
            reward,
            script_sig_number: SCRIPT_SIG_NUMBER,
            script_sig_extra: SCRIPT_SIG_EXTRA,
            layout,
        }
    }

    /// Load parameters from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading genesis parameters from {}", path.display());
        let data = fs::read_to_string(path)
            .map_err(|e| GenesisError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Save parameters as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decoded public key bytes
    pub fn pubkey_bytes(&self) -> Result<Vec<u8>> {
        let trimmed = self.pubkey.strip_prefix("0x").unwrap_or(&self.pubkey);
        Ok(hex::decode(trimmed)?)
    }
}

/// Parse a compact target written as decimal or `0x`-prefixed hex
pub fn parse_bits(s: &str) -> Result<u32> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex_digits) => u32::from_str_radix(hex_digits, 16),
        None => s.parse::<u32>(),
    };
    parsed.map_err(|e| GenesisError::invalid(format!("Invalid compact bits '{}': {}", s, e)))
}

/// Compact bits are written as `"0x1d00ffff"`; plain numbers are accepted on input
mod compact_bits {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(u32),
        Text(String),
    }

    pub fn serialize<S: Serializer>(bits: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{:08x}", bits))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(n),
            Repr::Text(s) => super::parse_bits(&s).map_err(serde::de::Error::custom),
        }
    }
}
