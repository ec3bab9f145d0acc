// Merkle root of a single-transaction block

use crate::core::{GenesisTransaction, Hash256};

/// With one transaction the tree has a single leaf, so the root is the txid
pub fn merkle_root(tx: &GenesisTransaction) -> Hash256 {
    tx.txid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash256;
    use crate::core::serialize::LengthPrefix;
    use crate::core::transaction::TxOutput;

    #[test]
    fn test_merkle_root_single_tx() {
        let output = TxOutput::new(5_000_000_000, vec![1, 2, 3]);
        let tx = GenesisTransaction::new(vec![4, 5, 6], output, LengthPrefix::Byte).unwrap();
        assert_eq!(merkle_root(&tx), hash256(tx.serialize()));
    }
}
