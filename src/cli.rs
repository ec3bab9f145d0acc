// CLI commands

use crate::config::{GenesisParams, Preset, parse_bits};
use crate::consensus::{
    ExhaustionPolicy, Miner, MinerOptions, MiningResult, PROGRESS_INTERVAL, Progress, Target, mine_genesis,
    verify_genesis,
};
use crate::core::{GenesisBlock, ScriptSigLayout};
use crate::error::{GenesisError, Result};
use crate::report::{JsonReport, text_report};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

#[derive(Parser)]
#[command(name = "genesis-miner")]
#[command(about = "Mine a genesis block and print its chain parameters", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for a nonce that satisfies the genesis target
    Mine(MineArgs),

    /// Decode a compact difficulty target
    Target {
        /// Compact bits, decimal or 0x-prefixed hex
        #[arg(value_parser = bits_arg)]
        bits: u32,
    },

    /// Build the coinbase and print its merkle root
    Merkle(ParamArgs),

    /// Check a known nonce against the target
    Verify {
        #[command(flatten)]
        params: ParamArgs,
        /// Nonce to check (defaults to the preset's known nonce)
        #[arg(long)]
        nonce: Option<u32>,
    },

    /// Print the resolved genesis parameters as JSON
    Config {
        #[command(flatten)]
        params: ParamArgs,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Genesis parameters: a preset or config file, then per-field overrides
#[derive(Args, Debug, Clone, Default)]
pub struct ParamArgs {
    /// Built-in parameter set
    #[arg(long, value_enum, default_value_t = Preset::Devtools)]
    pub preset: Preset,

    /// JSON parameter file (replaces the preset)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Launch timestamp (unix seconds)
    #[arg(long)]
    pub time: Option<u32>,

    /// Compact difficulty bits, decimal or 0x-prefixed hex
    #[arg(long, value_parser = bits_arg)]
    pub bits: Option<u32>,

    /// Block version
    #[arg(long, allow_hyphen_values = true)]
    pub block_version: Option<i32>,

    /// Coinbase message
    #[arg(long)]
    pub message: Option<String>,

    /// Hex public key paid by the coinbase output
    #[arg(long)]
    pub pubkey: Option<String>,

    /// Reward in smallest units
    #[arg(long)]
    pub reward: Option<u64>,

    /// Coinbase scriptSig layout
    #[arg(long, value_enum)]
    pub layout: Option<ScriptSigLayout>,
}

impl ParamArgs {
    /// Apply the overrides on top of the preset or config file
    pub fn resolve(&self) -> Result<GenesisParams> {
        let mut params = match &self.config {
            Some(path) => GenesisParams::from_file(path)?,
            None => GenesisParams::preset(self.preset),
        };

        if let Some(time) = self.time {
            params.timestamp = time;
        }
        if let Some(bits) = self.bits {
            params.bits = bits;
        }
        if let Some(version) = self.block_version {
            params.version = version;
        }
        if let Some(message) = &self.message {
            params.message = message.clone();
        }
        if let Some(pubkey) = &self.pubkey {
            params.pubkey = pubkey.clone();
        }
        if let Some(reward) = self.reward {
            params.reward = reward;
        }
        if let Some(layout) = self.layout {
            params.layout = layout;
        }

        Ok(params)
    }
}

#[derive(Args, Debug, Clone)]
pub struct MineArgs {
    #[command(flatten)]
    pub params: ParamArgs,

    /// Worker threads (0 = one per CPU)
    #[arg(short, long, default_value_t = 1)]
    pub threads: usize,

    /// First nonce to try
    #[arg(long, default_value_t = 0)]
    pub start_nonce: u32,

    /// Attempts between progress lines
    #[arg(long, default_value_t = PROGRESS_INTERVAL)]
    pub progress_interval: u64,

    /// What to do when every nonce has been tried
    #[arg(long, value_enum, default_value_t = ExhaustionPolicy::Fail)]
    pub on_exhaustion: ExhaustionPolicy,

    /// Maximum timestamp bumps with --on-exhaustion bump-time
    #[arg(long, default_value_t = 3600)]
    pub max_time_bumps: u32,

    /// Result format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl MineArgs {
    pub fn miner_options(&self) -> MinerOptions {
        MinerOptions {
            workers: self.threads,
            start_nonce: self.start_nonce,
            progress_interval: self.progress_interval,
            exhaustion: self.on_exhaustion,
            max_time_bumps: self.max_time_bumps,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn bits_arg(s: &str) -> std::result::Result<u32, String> {
    parse_bits(s).map_err(|e| e.to_string())
}

/// CLI handler
pub struct CliHandler<W: Write> {
    out: W,
}

impl<W: Write> CliHandler<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Handle CLI command
    pub fn handle(&mut self, cli: Cli) -> Result<()> {
        match cli.command {
            Commands::Mine(args) => self.mine(&args),
            Commands::Target { bits } => self.target(bits),
            Commands::Merkle(params) => self.merkle(&params),
            Commands::Verify { params, nonce } => self.verify(&params, nonce),
            Commands::Config { params, output } => self.config(&params, output),
        }
    }

    /// Full pipeline: decode, build, mine, report
    fn mine(&mut self, args: &MineArgs) -> Result<()> {
        let params = args.params.resolve()?;
        let target = Target::from_bits(params.bits)?;
        let text = args.format == OutputFormat::Text;

        let miner = Miner::new(params.bits)?.with_options(args.miner_options());
        let (block, result) = if text {
            writeln!(self.out, "Genesis Block Miner")?;
            writeln!(self.out, "{}\n", "=".repeat(50))?;
            writeln!(self.out, "Timestamp: {}", params.timestamp)?;
            writeln!(self.out, "Target: {}", target.to_hex())?;
            writeln!(self.out, "Difficulty bits: 0x{:08x}", params.bits)?;
            writeln!(self.out, "Expected attempts: {:.0}\n", target.expected_attempts())?;
            writeln!(self.out, "Mining genesis block...")?;
            self.out.flush()?;
            self.mine_with_progress(&params, miner)?
        } else {
            mine_genesis(&params, &miner)?
        };

        if text {
            writeln!(self.out, "\n\nGenesis block mined successfully!\n")?;
            write!(self.out, "{}", text_report(&block, &result))?;
        } else {
            let report = JsonReport::new(&block, &result, &target);
            writeln!(self.out, "{}", report.to_json()?)?;
        }
        Ok(())
    }

    /// Search on a worker thread while progress lines are written to `out`
    fn mine_with_progress(
        &mut self,
        params: &GenesisParams,
        miner: Miner,
    ) -> Result<(GenesisBlock, MiningResult)> {
        let (progress_tx, progress_rx) = mpsc::channel::<Progress>();
        let miner = miner.on_progress(move |p| {
            // Receiver lives until the search thread is joined
            let _ = progress_tx.send(*p);
        });

        thread::scope(|scope| {
            // The miner owns the sender, so the channel closes when the search ends
            let search = scope.spawn(move || mine_genesis(params, &miner));

            for p in progress_rx {
                write!(self.out, "\rTried {} nonces... ({:.0} H/s)", p.attempts, p.hash_rate)?;
                self.out.flush()?;
            }

            search.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic))
        })
    }

    fn target(&mut self, bits: u32) -> Result<()> {
        let target = Target::from_bits(bits)?;
        writeln!(self.out, "Bits: 0x{:08x}", bits)?;
        writeln!(self.out, "Target: {}", target.to_hex())?;
        writeln!(self.out, "Target (padded): {}", target.to_padded_hex())?;
        writeln!(self.out, "Leading zero bits: {}", target.leading_zeros())?;
        writeln!(self.out, "Difficulty: {}", target.difficulty())?;
        Ok(())
    }

    fn merkle(&mut self, args: &ParamArgs) -> Result<()> {
        let params = args.resolve()?;
        let block = GenesisBlock::build(&params, 0)?;
        writeln!(self.out, "Coinbase transaction ({} bytes):", block.transaction.serialize().len())?;
        writeln!(self.out, "  {}", hex::encode(block.transaction.serialize()))?;
        writeln!(self.out, "Merkle root:")?;
        writeln!(self.out, "  {}", block.header.merkle_root)?;
        Ok(())
    }

    fn verify(&mut self, args: &ParamArgs, nonce: Option<u32>) -> Result<()> {
        let nonce = nonce
            .or_else(|| args.config.is_none().then(|| args.preset.known_nonce()).flatten())
            .ok_or_else(|| GenesisError::invalid("No nonce given and the preset has no known nonce"))?;

        let params = args.resolve()?;
        let (block, valid) = verify_genesis(&params, nonce)?;
        writeln!(self.out, "Nonce: {}", nonce)?;
        writeln!(self.out, "Hash: {}", block.hash())?;
        writeln!(self.out, "Merkle root: {}", block.header.merkle_root)?;
        writeln!(self.out, "Valid proof of work: {}", if valid { "yes" } else { "no" })?;

        if !valid {
            return Err(GenesisError::invalid(format!(
                "Nonce {} does not satisfy target 0x{:08x}",
                nonce, params.bits
            )));
        }
        Ok(())
    }

    fn config(&mut self, args: &ParamArgs, output: Option<PathBuf>) -> Result<()> {
        let params = args.resolve()?;
        match output {
            Some(path) => {
                params.save(&path)?;
                log::info!("Wrote genesis parameters to {}", path.display());
            }
            None => writeln!(self.out, "{}", params.to_json()?)?,
        }
        Ok(())
    }
}
