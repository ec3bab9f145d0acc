// Proof of Work search

use crate::consensus::parallel;
use crate::consensus::target::Target;
use crate::core::{BlockHeader, Hash256, HEADER_PREFIX_SIZE, sha256_hash};
use crate::error::{GenesisError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Progress is reported every this many attempts by default
pub const PROGRESS_INTERVAL: u64 = 100_000;

/// Nonces tried between checks of the shared stop flag
const BATCH_SIZE: u64 = 4096;

/// What to do once every nonce has been tried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExhaustionPolicy {
    /// Stop with `ExhaustedSearchSpace`
    #[default]
    Fail,
    /// Advance the timestamp by one second and search the nonce space again
    BumpTime,
}

/// Search tuning that does not affect the mined header fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinerOptions {
    /// Worker threads; 0 = one per logical CPU, 1 = sequential search
    pub workers: usize,
    /// First nonce to try
    pub start_nonce: u32,
    /// Attempts between progress reports
    pub progress_interval: u64,
    pub exhaustion: ExhaustionPolicy,
    /// Upper bound on timestamp bumps under `BumpTime`
    pub max_time_bumps: u32,
}

impl Default for MinerOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            start_nonce: 0,
            progress_interval: PROGRESS_INTERVAL,
            exhaustion: ExhaustionPolicy::Fail,
            max_time_bumps: 3600,
        }
    }
}

impl MinerOptions {
    /// Worker count with 0 resolved to the number of CPUs
    pub fn effective_workers(&self) -> usize {
        match self.workers {
            0 => num_cpus::get().max(1),
            n => n,
        }
    }
}

/// Snapshot handed to the progress observer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Nonces tried since mining started
    pub attempts: u64,
    /// Average hashes per second since mining started
    pub hash_rate: f64,
    /// Timestamp of the header currently being searched
    pub timestamp: u32,
}

/// Progress observer; called from worker threads during parallel search
pub type ProgressFn = dyn Fn(&Progress) + Send + Sync;

/// Header with everything but the nonce frozen.
///
/// The first 64 header bytes form one SHA256 block, so their compression is
/// done once and each attempt only hashes the 16-byte tail.
#[derive(Clone)]
pub struct HeaderTemplate {
    header: BlockHeader,
    midstate: Sha256,
    tail: [u8; 16],
}

impl HeaderTemplate {
    pub fn new(header: &BlockHeader) -> Self {
        let prefix = header.prefix();
        let mut midstate = Sha256::new();
        midstate.update(&prefix[..64]);

        let mut tail = [0u8; 16];
        tail[..12].copy_from_slice(&prefix[64..HEADER_PREFIX_SIZE]);

        Self {
            header: *header,
            midstate,
            tail,
        }
    }

    /// Double hash of the header with `nonce` substituted; no shared state
    #[inline]
    pub fn attempt(&self, nonce: u32) -> Hash256 {
        let mut tail = self.tail;
        tail[12..].copy_from_slice(&nonce.to_le_bytes());

        let mut hasher = self.midstate.clone();
        hasher.update(tail);
        let first = hasher.finalize();
        Hash256::new(sha256_hash(&first))
    }

    /// The frozen header with a concrete nonce
    pub fn header_with_nonce(&self, nonce: u32) -> BlockHeader {
        BlockHeader {
            nonce,
            ..self.header
        }
    }
}

/// State shared by everything scanning one header template
pub(crate) struct SearchContext<'a> {
    pub template: HeaderTemplate,
    pub target: &'a Target,
    pub started: Instant,
    pub attempts: &'a AtomicU64,
    pub stop: &'a AtomicBool,
    pub progress: Option<&'a ProgressFn>,
    pub progress_interval: u64,
}

impl SearchContext<'_> {
    /// Try every nonce in `range`, returning the first that meets the target.
    /// Returns `None` when the range is exhausted or another scanner set `stop`.
    pub fn scan(&self, range: RangeInclusive<u32>) -> Option<(u32, Hash256)> {
        let mut pending = 0u64;

        for nonce in range {
            let hash = self.template.attempt(nonce);
            pending += 1;

            if self.target.is_met_by(&hash) {
                self.record(pending);
                return Some((nonce, hash));
            }

            if pending == BATCH_SIZE {
                self.record(pending);
                pending = 0;
                if self.stop.load(Ordering::Relaxed) {
                    return None;
                }
            }
        }

        self.record(pending);
        None
    }

    fn record(&self, count: u64) {
        if count == 0 {
            return;
        }
        let before = self.attempts.fetch_add(count, Ordering::Relaxed);
        let total = before + count;

        let interval = self.progress_interval.max(1);
        if total / interval > before / interval {
            let reported = total / interval * interval;
            let elapsed = self.started.elapsed().as_secs_f64();
            let progress = Progress {
                attempts: reported,
                hash_rate: if elapsed > 0.0 { total as f64 / elapsed } else { 0.0 },
                timestamp: self.template.header.timestamp,
            };
            match self.progress {
                Some(observer) => observer(&progress),
                None => log::debug!(
                    "Mining attempts: {} ({:.1} KH/s)",
                    progress.attempts,
                    progress.hash_rate / 1000.0
                ),
            }
        }
    }
}

/// Proof of Work miner
pub struct Miner {
    /// Fixed difficulty target
    pub target: Target,
    options: MinerOptions,
    progress: Option<Box<ProgressFn>>,
}

impl Miner {
    /// Create a miner for the compact target `bits`
    pub fn new(bits: u32) -> Result<Self> {
        let target = Target::from_bits(bits)?;
        if target.value().is_zero() {
            return Err(GenesisError::invalid(format!(
                "Compact target 0x{:08x} decodes to zero",
                bits
            )));
        }
        Ok(Self {
            target,
            options: MinerOptions::default(),
            progress: None,
        })
    }

    pub fn with_options(mut self, options: MinerOptions) -> Self {
        self.options = options;
        self
    }

    /// Install a progress observer (replaces the default debug log line)
    pub fn on_progress<F>(mut self, observer: F) -> Self
    where
        F: Fn(&Progress) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(observer));
        self
    }

    pub fn options(&self) -> &MinerOptions {
        &self.options
    }

    /// Find a nonce for `header`. Only the nonce (and, under
    /// `ExhaustionPolicy::BumpTime`, the timestamp) differ in the result.
    pub fn mine(&self, header: &BlockHeader) -> Result<MiningResult> {
        if header.bits != self.target.bits {
            return Err(GenesisError::invalid(format!(
                "Header bits 0x{:08x} do not match miner target 0x{:08x}",
                header.bits, self.target.bits
            )));
        }

        let workers = self.options.effective_workers();
        let started = Instant::now();
        let attempts = AtomicU64::new(0);
        let mut current = *header;
        let mut time_bumps = 0u32;

        log::info!(
            "Mining with target {} from nonce {} on {} worker(s)",
            self.target.to_hex(),
            self.options.start_nonce,
            workers
        );

        loop {
            let stop = AtomicBool::new(false);
            let ctx = SearchContext {
                template: HeaderTemplate::new(&current),
                target: &self.target,
                started,
                attempts: &attempts,
                stop: &stop,
                progress: self.progress.as_deref(),
                progress_interval: self.options.progress_interval,
            };

            let found = if workers <= 1 {
                ctx.scan(self.options.start_nonce..=u32::MAX)
            } else {
                parallel::search(&ctx, self.options.start_nonce, workers)
            };

            if let Some((nonce, hash)) = found {
                let result = MiningResult {
                    header: ctx.template.header_with_nonce(nonce),
                    nonce,
                    hash,
                    attempts: attempts.load(Ordering::Relaxed),
                    duration: started.elapsed(),
                    time_bumps,
                };
                log::info!(
                    "Found nonce {} after {} attempts ({:.0} H/s)",
                    nonce,
                    result.attempts,
                    result.hash_rate()
                );
                return Ok(result);
            }

            let total = attempts.load(Ordering::Relaxed);
            let can_bump = self.options.exhaustion == ExhaustionPolicy::BumpTime
                && time_bumps < self.options.max_time_bumps;
            match current.timestamp.checked_add(1) {
                Some(next) if can_bump => {
                    log::warn!(
                        "Nonce space exhausted at timestamp {}, retrying with {}",
                        current.timestamp,
                        next
                    );
                    current.timestamp = next;
                    time_bumps += 1;
                }
                _ => return Err(GenesisError::ExhaustedSearchSpace { attempts: total }),
            }
        }
    }

    /// Verify that a block header satisfies PoW
    pub fn verify(&self, header: &BlockHeader) -> bool {
        header.bits == self.target.bits && self.target.is_met_by(&header.hash())
    }
}

/// Mining result
#[derive(Debug, Clone, PartialEq)]
pub struct MiningResult {
    /// Solved header
    pub header: BlockHeader,
    /// The nonce that was found
    pub nonce: u32,
    /// The resulting hash
    pub hash: Hash256,
    /// Number of attempts
    pub attempts: u64,
    /// Time taken
    pub duration: Duration,
    /// Times the timestamp was advanced after exhausting the nonce space
    pub time_bumps: u32,
}

impl MiningResult {
    /// Calculate hash rate (hashes per second)
    pub fn hash_rate(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.attempts as f64 / secs
        } else {
            0.0
        }
    }

    pub fn merkle_root(&self) -> Hash256 {
        self.header.merkle_root
    }
}
