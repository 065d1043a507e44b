//! Console harness: CLI arguments and the throughput report.
//!
//! The harness is a thin caller over the library. It loads (or falls back
//! to the built-in reference line), applies command-line overrides through
//! the same sanitizers an interactive front end would use, and prints the
//! throughput estimate for every duration mode plus details for the
//! selected one.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use crate::config::{parse_shift_count, parse_shift_minutes, SimulationConfig};
use crate::models::DurationMode;
use crate::scheduler::{Composition, LineKpi};

/// Command-line arguments for `u-flowline`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "u-flowline",
    version,
    about = "Estimate shift throughput of a multi-stage production line.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a TOML simulation config.
    ///
    /// Without it the built-in six-stage reference line is used.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Shift length in minutes (non-positive or unparsable input falls back to 720).
    #[arg(long, value_name = "MINUTES")]
    pub shift_minutes: Option<String>,

    /// Number of shifts in the horizon.
    #[arg(long, value_name = "N")]
    pub shifts: Option<String>,

    /// Duration mode for the detailed report: min, max, or random.
    #[arg(long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Base random seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Carry work in progress across shift boundaries.
    #[arg(long)]
    pub continuous: bool,

    /// Number of job exit times to print.
    #[arg(long, value_name = "N", default_value_t = 20)]
    pub sample: usize,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `U_FLOWLINE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

/// Resolves the run configuration from a file (if any) and CLI overrides.
pub fn resolve_config(args: &CliArgs) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load_from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    if config.stages.is_empty() {
        info!("no stages configured, using the reference line");
        config.stages = SimulationConfig::reference_line();
    }
    if let Some(raw) = &args.shift_minutes {
        config.shift_minutes = parse_shift_minutes(raw);
    }
    if let Some(raw) = &args.shifts {
        config.shifts = parse_shift_count(raw);
    }
    if let Some(raw) = &args.mode {
        config.mode = raw.parse().unwrap_or_default();
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.continuous {
        config.composition = Composition::Continuous;
    }

    Ok(config)
}

/// Runs the harness and prints the report to stdout.
pub fn run(args: CliArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    if let Err(err) = config.validate() {
        warn!(%err, "configuration has problems; estimates may be meaningless");
    }

    println!("Line:");
    for (i, s) in config.stages.iter().enumerate() {
        let peak = s
            .capacity_per_minute(s.min_minutes)
            .map(|c| format!("{:.2} jobs/h", c * 60.0))
            .unwrap_or_else(|| "unbounded".to_string());
        println!(
            "  {:>2}. {:<16} {:>6.1}-{:<6.1} min  x{}  peak {}",
            i + 1,
            s.name,
            s.min_minutes,
            s.max_minutes,
            s.server_count(),
            peak
        );
    }
    println!();

    for mode in DurationMode::all() {
        let outcome = config.composer().with_mode(mode).compose(&config.stages);
        let seed_note = match (mode.is_random(), config.seed) {
            (true, Some(seed)) => format!(" (seed={seed})"),
            _ => String::new(),
        };
        println!(
            "Output per shift ({mode} times): {} jobs{seed_note}",
            outcome.first_shift_completed()
        );
    }

    let composer = config.composer();
    let outcome = composer.compose(&config.stages);
    let shifts = composer.effective_shift_count() as usize;

    println!();
    println!(
        "Mode {}, {:?} composition, {} shift(s) of {} min:",
        config.mode, config.composition, shifts, config.shift_minutes
    );
    for s in &outcome.shifts {
        println!("  Shift {}: {}", s.shift_index + 1, s.completed);
    }
    if outcome.truncated {
        println!("  (job cap of {} reached; schedule truncated)", config.max_jobs);
    }

    let kpi = LineKpi::calculate(
        &outcome.schedule,
        &config.stages,
        config.shift_minutes,
        shifts,
    );
    println!();
    println!("Throughput: {:.2} jobs/h", kpi.throughput_per_hour);
    println!("Avg flow time: {:.1} min", kpi.avg_flow_time);
    println!("Avg utilization: {:.1}%", kpi.avg_utilization * 100.0);
    if let Some(b) = kpi.bottleneck {
        println!(
            "Bottleneck: {} ({:.1}% busy)",
            config.stages[b].name,
            kpi.utilization_by_stage[b] * 100.0
        );
    }

    if args.sample > 0 {
        println!();
        println!("First exit times (min):");
        for (i, (_, t)) in outcome
            .schedule
            .job_exits()
            .iter()
            .take(args.sample)
            .enumerate()
        {
            println!("  {:>2}: {t}", i + 1);
        }
    }

    Ok(())
}
