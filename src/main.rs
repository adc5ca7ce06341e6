//! Accel Bench CLI
//! Times each built-in baseline against its accelerated twin

use std::path::PathBuf;

use accel_bench::bench::report::{render_json, render_text};
use accel_bench::config::LoggingConfig;
use accel_bench::{workloads, BenchConfig, Comparator, WarmupPolicy};
use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "accel-bench", version, about = "Compare plain and accelerated implementations")]
struct Args {
    /// Config file (defaults to $ACCEL_BENCH_CONFIG or config/accel-bench.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Timed blocks per target
    #[arg(long)]
    repeats: Option<usize>,

    /// Calls per timed block (calibrated when omitted)
    #[arg(long)]
    loops: Option<u64>,

    /// none | measure | discard:N
    #[arg(long)]
    warmup: Option<WarmupPolicy>,

    /// Abort a repeat that takes longer than this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Run a single workload
    #[arg(long)]
    only: Option<String>,

    /// List workloads and exit
    #[arg(long)]
    list: bool,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,
}

fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = if logging.json_output {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

fn load_config(args: &Args) -> anyhow::Result<BenchConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config =
                BenchConfig::load(path).with_context(|| format!("loading {}", path.display()))?;
            config.apply_env_overrides()?;
            config
        }
        None => BenchConfig::from_env()?,
    };
    if let Some(repeats) = args.repeats {
        config.repeats = repeats;
    }
    if let Some(loops) = args.loops {
        config.loops_per_repeat = Some(loops);
    }
    if let Some(warmup) = args.warmup {
        config.warmup = warmup;
    }
    if let Some(timeout) = args.timeout_ms {
        config.repeat_timeout_ms = Some(timeout);
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    if args.list {
        for w in workloads::all() {
            println!("{:<20} {}", w.name, w.description);
        }
        return Ok(());
    }

    let config = load_config(&args)?;
    init_logging(&config.logging)?;

    if let Some(name) = &args.only {
        if workloads::find(name).is_none() {
            bail!("unknown workload `{name}` (see --list)");
        }
    }

    let comparator = Comparator::from_config(&config)?;
    info!(
        repeats = config.repeats,
        loops = ?config.loops_per_repeat,
        warmup = %config.warmup,
        clock_resolution_ns = comparator.measurer().resolution_ns(),
        "Starting comparisons"
    );

    let results = workloads::run_all(&comparator, args.only.as_deref());
    let total = results.len();
    let reports: Vec<_> = results.into_iter().filter_map(|(_, r)| r.ok()).collect();

    if args.json {
        println!("{}", render_json(&reports)?);
    } else {
        print!("{}", render_text(&reports));
    }

    if reports.is_empty() && total > 0 {
        bail!("all {total} comparisons failed");
    }
    Ok(())
}
