use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use scene_sync::config::{AxisConvention, Config, EnvOverrides};
use scene_sync::logging;
use scene_sync::sequencer::Sequencer;
use scene_sync::sink::ConsoleSink;
use scene_sync::source::{BatchSource, HttpSource, StepSource};

#[derive(Parser, Debug)]
#[command(name = "scene_sync", version, about = "Frame decoder and incremental scene synchronizer for the rescue simulation feed")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Poll a live simulation endpoint step by step
    Run {
        /// Simulation service endpoint (e.g. http://localhost:8585)
        #[arg(long)]
        url: String,
        /// Stop after this many steps
        #[arg(long)]
        max_steps: Option<u32>,
        /// Fetch attempts per step (default: 3)
        #[arg(long)]
        retry_limit: Option<u32>,
        /// Backoff between attempts, in milliseconds (default: 1000)
        #[arg(long)]
        backoff_ms: Option<u64>,
        /// Edge-key axis convention (row-major|swapped)
        #[arg(long)]
        axis: Option<String>,
        /// Log level (trace|debug|info|warn|error)
        #[arg(long)]
        log_level: Option<String>,
    },

    /// Replay a pre-fetched capture file (simulation_data JSON dump)
    Replay {
        /// Path to the capture file
        #[arg(long)]
        file: PathBuf,
        /// Stop after this many steps
        #[arg(long)]
        max_steps: Option<u32>,
        /// Edge-key axis convention (row-major|swapped)
        #[arg(long)]
        axis: Option<String>,
        /// Log level (trace|debug|info|warn|error)
        #[arg(long)]
        log_level: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run { url, max_steps, retry_limit, backoff_ms, axis, log_level } => {
            let mut cfg = Config::default();
            cfg.url = Some(url);
            cfg.max_steps = max_steps;
            if let Some(n) = retry_limit {
                cfg.retry_limit = n;
            }
            if let Some(ms) = backoff_ms {
                cfg.retry_backoff = Duration::from_millis(ms);
            }
            cfg.axis = parse_axis(axis.as_deref())?;
            cfg.log_level = log_level;
            cfg.overlay(EnvOverrides::load());
            logging::init(cfg.log_level.as_deref());

            let url = match &cfg.url {
                Some(u) => u.clone(),
                None => bail!("no endpoint URL configured"),
            };
            println!("Polling {}", url);
            let mut source = HttpSource::new(url);
            run_pipeline(&cfg, &mut source)
        }
        Commands::Replay { file, max_steps, axis, log_level } => {
            let mut cfg = Config::default();
            cfg.batch_file = Some(file.clone());
            cfg.max_steps = max_steps;
            cfg.axis = parse_axis(axis.as_deref())?;
            cfg.log_level = log_level;
            cfg.overlay(EnvOverrides::load());
            logging::init(cfg.log_level.as_deref());

            let mut source = BatchSource::from_file(&file)?;
            println!("Replaying {} ({} steps)", file.display(), source.len());
            run_pipeline(&cfg, &mut source)
        }
    }
}

fn parse_axis(axis: Option<&str>) -> Result<AxisConvention> {
    match axis {
        None => Ok(AxisConvention::default()),
        Some(s) => s.parse::<AxisConvention>().map_err(|e| anyhow::anyhow!(e)),
    }
}

fn run_pipeline(cfg: &Config, source: &mut dyn StepSource) -> Result<()> {
    let mut sink = ConsoleSink;
    let mut seq = Sequencer::new(cfg);
    let stats = seq.run(source, &mut sink);
    println!(
        "Done: {} steps applied, {} skipped, {} decode warnings",
        stats.applied, stats.failed, stats.decode_warnings
    );
    Ok(())
}
