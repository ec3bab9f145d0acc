// Genesis pipeline: build the coinbase, then search for a nonce

use crate::config::GenesisParams;
use crate::consensus::pow::{Miner, MiningResult};
use crate::core::GenesisBlock;
use crate::error::Result;

/// Build the genesis block described by `params` and mine it with `miner`.
/// The returned block carries the solved header.
pub fn mine_genesis(params: &GenesisParams, miner: &Miner) -> Result<(GenesisBlock, MiningResult)> {
    let mut block = GenesisBlock::build(params, miner.options().start_nonce)?;
    log::info!(
        "Genesis merkle root {} (timestamp {}, bits 0x{:08x})",
        block.header.merkle_root,
        block.header.timestamp,
        block.header.bits
    );

    let result = miner.mine(&block.header)?;
    block.header = result.header;
    Ok((block, result))
}

/// Rebuild the genesis block with a known nonce and check its proof of work
pub fn verify_genesis(params: &GenesisParams, nonce: u32) -> Result<(GenesisBlock, bool)> {
    let miner = Miner::new(params.bits)?;
    let block = GenesisBlock::build(params, nonce)?;
    let valid = miner.verify(&block.header);
    Ok((block, valid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use crate::consensus::MinerOptions;

    #[test]
    fn test_verify_main_preset() {
        let params = GenesisParams::preset(Preset::Main);
        let (block, valid) = verify_genesis(&params, 2306512841).unwrap();
        assert!(valid);
        assert_eq!(
            block.hash().to_hex(),
            "00000000ed7c33729f39094d3fa4e362cec181b7f05e3c53adeb097fc784f6bf"
        );

        let (_, valid) = verify_genesis(&params, 2306512840).unwrap();
        assert!(!valid);
    }

    #[test]
    fn test_mine_easy_genesis() {
        let params = GenesisParams {
            bits: 0x207fffff,
            ..GenesisParams::default()
        };
        let miner = Miner::new(params.bits).unwrap();

        let (block, result) = mine_genesis(&params, &miner).unwrap();
        assert_eq!(block.header, result.header);
        assert_eq!(block.hash(), result.hash);
        assert_eq!(result.merkle_root(), block.transaction.txid());
        assert!(miner.verify(&block.header));
    }

    #[test]
    fn test_mine_test_preset_from_nearby_nonce() {
        let params = GenesisParams::preset(Preset::Test);
        let miner = Miner::new(params.bits).unwrap().with_options(MinerOptions {
            start_nonce: 540_000,
            ..MinerOptions::default()
        });

        let (block, result) = mine_genesis(&params, &miner).unwrap();
        assert_eq!(result.nonce, 540516);
        assert_eq!(result.attempts, 517);
        assert_eq!(
            block.hash().to_hex(),
            "0000012a25567a717f50053e3ee5ab5ae5de0c14dba1f91be793438499c6527f"
        );
    }

    #[test]
    #[ignore] // About half a million hashes
    fn test_mine_test_preset_from_zero() {
        let params = GenesisParams::preset(Preset::Test);
        let miner = Miner::new(params.bits).unwrap();

        let (_, result) = mine_genesis(&params, &miner).unwrap();
        assert_eq!(result.nonce, 540516);
    }
}
