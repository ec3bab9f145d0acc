// Presentation of mining results
//
// Nothing here touches the search; it only formats a finished result.

use crate::config::COIN;
use crate::consensus::{MiningResult, Target};
use crate::core::GenesisBlock;
use serde::Serialize;

/// Reward expressed in whole coins without trailing zeros: `50`, `0.25`
pub fn format_coins(amount: u64) -> String {
    let whole = amount / COIN;
    let frac = amount % COIN;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{:08}", frac);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Statements to paste into the node's chain parameters
pub fn chainparams_snippet(block: &GenesisBlock) -> String {
    let header = &block.header;
    format!(
        "genesis = CreateGenesisBlock({}, {}, 0x{:08x}, {}, {} * COIN);\n\
         consensus.hashGenesisBlock = genesis.GetHash();\n\
         assert(consensus.hashGenesisBlock == uint256S(\"0x{}\"));\n\
         assert(genesis.hashMerkleRoot == uint256S(\"0x{}\"));\n",
        header.timestamp,
        header.nonce,
        header.bits,
        header.version,
        format_coins(block.transaction.output.value),
        block.hash().to_hex(),
        header.merkle_root.to_hex(),
    )
}

/// Human-readable report for a solved genesis block
pub fn text_report(block: &GenesisBlock, result: &MiningResult) -> String {
    let header = &block.header;
    let rule = "=".repeat(50);
    let mut out = String::new();

    out.push_str(&format!("{}\nGenesis Block Parameters:\n{}\n\n", rule, rule));
    out.push_str(&format!("nTime = {}\n", header.timestamp));
    out.push_str(&format!("nNonce = {}\n", header.nonce));
    out.push_str(&format!("nBits = 0x{:08x}\n\n", header.bits));
    out.push_str(&format!("Genesis Hash:\n  {}\n\n", block.hash()));
    out.push_str(&format!("Merkle Root:\n  {}\n\n", header.merkle_root));
    out.push_str(&format!("{}\n\n", rule));

    out.push_str(&format!("Mining time: {:.2} seconds\n", result.duration.as_secs_f64()));
    out.push_str(&format!("Attempts: {}\n", result.attempts));
    out.push_str(&format!("Hash rate: {:.0} H/s\n", result.hash_rate()));
    if result.time_bumps > 0 {
        out.push_str(&format!("Timestamp advanced {} time(s)\n", result.time_bumps));
    }

    out.push_str("\nCopy these values into src/kernel/chainparams.cpp:\n\n");
    out.push_str(&chainparams_snippet(block));
    out
}

/// Machine-readable report
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    pub timestamp: u32,
    pub nonce: u32,
    pub bits: String,
    pub version: i32,
    pub reward: u64,
    pub target: String,
    pub hash: String,
    pub merkle_root: String,
    pub coinbase_tx: String,
    pub header: String,
    pub attempts: u64,
    pub elapsed_secs: f64,
    pub hash_rate: f64,
    pub time_bumps: u32,
}

impl JsonReport {
    pub fn new(block: &GenesisBlock, result: &MiningResult, target: &Target) -> Self {
        let header = &block.header;
        Self {
            timestamp: header.timestamp,
            nonce: header.nonce,
            bits: format!("0x{:08x}", header.bits),
            version: header.version,
            reward: block.transaction.output.value,
            target: target.to_padded_hex(),
            hash: block.hash().to_hex(),
            merkle_root: header.merkle_root.to_hex(),
            coinbase_tx: hex::encode(block.transaction.serialize()),
            header: hex::encode(header.serialize()),
            attempts: result.attempts,
            elapsed_secs: result.duration.as_secs_f64(),
            hash_rate: result.hash_rate(),
            time_bumps: result.time_bumps,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
