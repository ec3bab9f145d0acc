// Sharded nonce search across worker threads
//
// Each worker scans its own contiguous slice of the nonce space against the
// same frozen header template. The first worker to find a solution raises the
// shared stop flag and sends its result; the others notice the flag within one
// batch and return.

use crate::consensus::pow::SearchContext;
use crate::core::Hash256;
use std::ops::RangeInclusive;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::thread;

/// Split `start..=u32::MAX` into at most `workers` disjoint contiguous ranges
pub fn shard(start: u32, workers: usize) -> Vec<RangeInclusive<u32>> {
    let total = u64::from(u32::MAX) - u64::from(start) + 1;
    let workers = (workers.max(1) as u64).min(total);
    let chunk = total.div_ceil(workers);

    (0..workers)
        .map(|i| {
            let first = u64::from(start) + i * chunk;
            let last = (first + chunk - 1).min(u64::from(u32::MAX));
            first as u32..=last as u32
        })
        .collect()
}

/// Run one scanner per shard; first result wins
pub(crate) fn search(ctx: &SearchContext, start: u32, workers: usize) -> Option<(u32, Hash256)> {
    let shards = shard(start, workers);
    let (result_tx, result_rx) = mpsc::channel();

    thread::scope(|scope| {
        for (id, range) in shards.into_iter().enumerate() {
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                log::debug!("Worker {} scanning nonces {}..={}", id, range.start(), range.end());
                if let Some(hit) = ctx.scan(range) {
                    ctx.stop.store(true, Ordering::Relaxed);
                    log::debug!("Worker {} found nonce {}", id, hit.0);
                    // Receiver outlives the scope
                    let _ = result_tx.send(hit);
                }
            });
        }
    });

    drop(result_tx);
    result_rx.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::{Miner, MinerOptions};
    use crate::core::BlockHeader;
    use crate::error::GenesisError;

    #[test]
    fn test_shard_covers_space() {
        let shards = shard(0, 4);
        assert_eq!(shards.len(), 4);
        assert_eq!(*shards[0].start(), 0);
        assert_eq!(*shards[3].end(), u32::MAX);
        for pair in shards.windows(2) {
            assert_eq!(*pair[0].end() as u64 + 1, *pair[1].start() as u64);
        }
    }

    #[test]
    fn test_shard_small_tail() {
        let shards = shard(u32::MAX - 2, 8);
        assert_eq!(shards, vec![u32::MAX - 2..=u32::MAX - 2, u32::MAX - 1..=u32::MAX - 1, u32::MAX..=u32::MAX]);
    }

    #[test]
    fn test_shard_uneven() {
        let shards = shard(u32::MAX - 9, 3);
        let sizes: Vec<u64> = shards
            .iter()
            .map(|r| *r.end() as u64 - *r.start() as u64 + 1)
            .collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn test_parallel_mining_verifies() {
        let bits = 0x1f00ffff;
        let miner = Miner::new(bits).unwrap().with_options(MinerOptions {
            workers: 4,
            ..MinerOptions::default()
        });
        let header = BlockHeader::new(1, Hash256::zero(), Hash256::new([0x22; 32]), 1734523200, bits, 0);

        let result = miner.mine(&header).unwrap();
        assert!(miner.verify(&result.header));
        assert_eq!(result.header.merkle_root, header.merkle_root);
        assert_eq!(result.header.timestamp, header.timestamp);
        assert!(result.attempts >= 1);
    }

    #[test]
    fn test_parallel_exhaustion() {
        let miner = Miner::new(0x03000001).unwrap().with_options(MinerOptions {
            workers: 4,
            start_nonce: u32::MAX - 99,
            ..MinerOptions::default()
        });
        let header = BlockHeader::new(1, Hash256::zero(), Hash256::zero(), 0, 0x03000001, 0);

        let err = miner.mine(&header).unwrap_err();
        assert_eq!(err, GenesisError::ExhaustedSearchSpace { attempts: 100 });
    }
}
