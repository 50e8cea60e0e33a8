use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use visotraf_core::{
    CountSink, CycleSequence, Direction, IntersectionContainer, IntersectionDriver, SchedulePlan,
    Scheduler, SchedulerConfig,
};
use visotraf_store::{CountLog, ReplaySource};

mod detector;
mod render;

use detector::SyntheticDetector;

const TICK_US: i64 = 1_000_000;

#[derive(Parser, Debug)]
#[command(name = "visotraf", about = "Adaptive signal timing for a four-way intersection")]
struct Cli {
    /// Scheduler config file (TOML); VISOTRAF__* environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print plans as JSON lines
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute one cycle from a single set of counts
    Plan {
        #[arg(long, allow_negative_numbers = true)]
        north: i64,
        #[arg(long, allow_negative_numbers = true)]
        south: i64,
        #[arg(long, allow_negative_numbers = true)]
        east: i64,
        #[arg(long, allow_negative_numbers = true)]
        west: i64,
    },
    /// Feed a recorded count log through the scheduler
    Replay {
        #[arg(long)]
        log: PathBuf,
    },
    /// Drive the scheduler from a seeded synthetic detector, one poll per second
    Simulate {
        #[arg(long, default_value_t = 60)]
        ticks: u32,
        #[arg(long, default_value_t = 7)]
        seed: u64,
        /// Probability that the detector delivers nothing on a poll
        #[arg(long, default_value_t = 0.0)]
        dropout: f64,
        /// Mean count per direction, N,S,E,W
        #[arg(long, value_delimiter = ',', default_values_t = vec![10, 10, 2, 2])]
        means: Vec<u32>,
        /// Append accepted samples to this count log
        #[arg(long)]
        log: Option<PathBuf>,
        /// Print the live phase every second
        #[arg(long)]
        show_phase: bool,
        #[arg(long, default_value = "main")]
        intersection: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Plan { north, south, east, west } => {
            let raw = HashMap::from([
                (Direction::North, north),
                (Direction::South, south),
                (Direction::East, east),
                (Direction::West, west),
            ]);
            let mut scheduler = Scheduler::new(cfg);
            let plan = scheduler
                .tick_raw(&raw, Utc::now().timestamp_micros())
                .context("could not compute a plan")?;
            emit(&plan, cli.json)?;
        }
        Command::Replay { log } => replay(&log, cfg, cli.json)?,
        Command::Simulate { ticks, seed, dropout, means, log, show_phase, intersection } => {
            let means: [u32; 4] = match means.as_slice() {
                [n, s, e, w] => [*n, *s, *e, *w],
                other => bail!("--means takes 4 values (N,S,E,W), got {}", other.len()),
            };
            if !(0.0..=1.0).contains(&dropout) {
                bail!("--dropout must be within [0, 1], got {dropout}");
            }
            let container = IntersectionContainer::new(intersection, cfg);
            let source = SyntheticDetector::new(seed, means, dropout);
            let opts = SimOptions { ticks, show_phase, json: cli.json };
            match log {
                Some(path) => {
                    let sink = CountLog::open(&path)
                        .with_context(|| format!("failed to open count log {}", path.display()))?;
                    simulate(IntersectionDriver::new(container, source, sink), &opts)?;
                }
                None => simulate(IntersectionDriver::new(container, source, Vec::new()), &opts)?,
            }
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SchedulerConfig> {
    match path {
        Some(p) => SchedulerConfig::load(p)
            .with_context(|| format!("failed to load config from {}", p.display())),
        None => Ok(SchedulerConfig::default()),
    }
}

fn emit(plan: &SchedulePlan, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(plan)?);
    } else {
        println!("{}\n", render::plan_text(plan));
    }
    Ok(())
}

fn replay(path: &Path, cfg: SchedulerConfig, json: bool) -> Result<()> {
    let mut source = ReplaySource::from_path(path)
        .with_context(|| format!("failed to read count log {}", path.display()))?;
    let mut scheduler = Scheduler::new(cfg);
    let mut accepted = 0usize;
    while let Some(rec) = source.next_record() {
        let plan = scheduler.tick(&rec.counts, rec.ts_us)?;
        if plan.accepted {
            accepted += 1;
            emit(&plan, json)?;
        }
    }
    log::info!("replayed {} records from {}", accepted, path.display());
    Ok(())
}

struct SimOptions {
    ticks: u32,
    show_phase: bool,
    json: bool,
}

fn simulate<Snk: CountSink>(
    mut driver: IntersectionDriver<SyntheticDetector, Snk>,
    opts: &SimOptions,
) -> Result<()> {
    let start_us = Utc::now().timestamp_micros();
    let mut latest: Option<CycleSequence> = None;
    // running cycle and the time it started
    let mut active: Option<(CycleSequence, i64)> = None;

    for t in 0..i64::from(opts.ticks) {
        let now_us = start_us + t * TICK_US;
        if let Some(plan) = driver.step(now_us)? {
            if plan.accepted {
                emit(&plan, opts.json)?;
            }
            latest = Some(plan.cycle);
        }
        if !opts.show_phase {
            continue;
        }
        let expired = match &active {
            Some((cycle, started)) => elapsed_s(*started, now_us) >= cycle.total_duration_s(),
            None => true,
        };
        if expired {
            if let Some(cycle) = latest.clone() {
                active = Some((cycle, now_us));
            }
        }
        if let Some((cycle, started)) = &active {
            if let Some(pos) = cycle.locate(elapsed_s(*started, now_us)) {
                println!("{}", render::position_text(&pos));
            }
        }
    }
    log::info!(
        "simulation of {} finished after {} ticks",
        driver.intersection.id,
        opts.ticks
    );
    Ok(())
}

fn elapsed_s(from_us: i64, to_us: i64) -> f64 {
    (to_us - from_us) as f64 / 1_000_000.0
}
