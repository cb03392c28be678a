//! facility-sim - run one facility simulation from a JSON config
//!
//! Writes the per-customer records, the per-tick records and the run summary
//! as JSON files named after the run id.

use anyhow::{bail, Context, Result};
use clap::Parser;
use facility_sim_core::{FacilityConfig, Orchestrator, RunOutcome};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "facility-sim")]
#[command(about = "Tick-driven multi-server facility simulator")]
struct Args {
    /// Path to configuration file (see config.example.json)
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// RNG seed (overrides config)
    #[arg(long)]
    rng_seed: Option<u64>,

    /// Run id used to name output files (overrides config)
    #[arg(long)]
    run_id: Option<String>,

    /// Stop after this many ticks even if the run has not terminated
    #[arg(long)]
    max_ticks: Option<usize>,

    /// Directory for output files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(path: &Path) -> Result<FacilityConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("facility_sim_core=debug,facility_sim=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let mut config = load_config(&args.config)?;
    if let Some(seed) = args.rng_seed {
        config.rng_seed = seed;
    }
    if let Some(run_id) = args.run_id {
        config.run_id = run_id;
    }

    info!(
        run_id = %config.run_id,
        servers = config.servers_num,
        max_total_arrivals = config.max_total_arrivals,
        max_total_admitted = ?config.max_total_admitted,
        seed = config.rng_seed,
        "Configuration loaded"
    );

    let mut orchestrator = Orchestrator::new(config).context("Invalid configuration")?;

    let outcome = match args.max_ticks {
        Some(max_ticks) => orchestrator.run_for(max_ticks)?,
        None => {
            orchestrator.run()?;
            RunOutcome::Terminated
        }
    };

    if !args.output_dir.is_dir() {
        fs::create_dir_all(&args.output_dir).with_context(|| {
            format!("Failed to create output dir: {}", args.output_dir.display())
        })?;
    }

    let run_id = &orchestrator.config().run_id;
    let stats = orchestrator.statistics();
    let summary = orchestrator.summary();

    write_json(
        &args.output_dir.join(format!("{}_customers.json", run_id)),
        stats.customers(),
    )?;
    write_json(
        &args.output_dir.join(format!("{}_ticks.json", run_id)),
        stats.ticks(),
    )?;
    write_json(
        &args.output_dir.join(format!("{}_summary.json", run_id)),
        &summary,
    )?;

    info!(
        ticks = orchestrator.current_tick(),
        departures = stats.num_departures(),
        outcome = ?outcome,
        "Run finished"
    );

    if outcome == RunOutcome::TickLimitReached {
        bail!(
            "run {} did not terminate within {} ticks; partial records written",
            run_id,
            args.max_ticks.unwrap_or_default()
        );
    }

    Ok(())
}
