//! # Main — CLI Entry Point
//!
//! Parses arguments, initializes structured logging, optionally lowers this
//! process's scheduling priority, and hands off to [`cli::run`] for the
//! k=1..=k_max sweep.
//!
//! ## Global Options
//!
//! - `k_max`: largest k to sweep to (default 200).
//! - `--threads`: worker thread count (0 = `available_parallelism()`).
//! - `--tile-len`: candidates per tile per worker round.
//! - `--batch-tiles`: tiles per batch, before the coordinator rechecks for
//!   early termination.
//! - `--log-format`: `human` (default) or `json`.
//! - `-v`/`--verbose`: raise the default log level (stacks: `-vv` for trace).
//! - `--low-priority`/`--no-low-priority`: lower this process's scheduling
//!   priority so the search doesn't starve interactive work on the host.
//! - `--no-pin`: don't pin worker threads to logical cores.

mod cli;

use anyhow::Result;
use clap::Parser;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "bpgap", about = "Search for m(k) plateau points (Erdos Problem #962)")]
struct Cli {
    /// Largest k to sweep to
    #[arg(default_value_t = 200)]
    k_max: u64,

    /// Number of worker threads (0 = all logical cores)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Candidates per tile, per worker round
    #[arg(long, default_value_t = 65_536)]
    tile_len: u64,

    /// Tiles per batch before the coordinator rechecks the end limit
    #[arg(long, default_value_t = 128)]
    batch_tiles: u64,

    /// Log output format: "human" or "json"
    #[arg(long, default_value = "human", env = "LOG_FORMAT")]
    log_format: String,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Lower this process's scheduling priority (nice) while searching
    #[arg(long, default_value_t = true, overrides_with = "no_low_priority")]
    low_priority: bool,

    /// Disable --low-priority
    #[arg(long)]
    no_low_priority: bool,

    /// Don't pin worker threads to logical cores
    #[arg(long)]
    no_pin: bool,
}

fn init_logging(cli: &Cli) {
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    if cli.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

/// Lower this process's scheduling priority, best-effort, so a long sweep
/// doesn't starve interactive work on the host it's running on.
#[cfg(unix)]
fn lower_priority() {
    // SAFETY: setpriority with PRIO_PROCESS and pid 0 (self) and a plain
    // integer niceness is a well-defined libc call with no memory concerns.
    let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, 10) };
    if rc != 0 {
        tracing::warn!("setpriority failed, running at default priority");
    }
}

#[cfg(not(unix))]
fn lower_priority() {
    tracing::debug!("priority lowering is only implemented on unix; running at default priority");
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let low_priority = cli.low_priority && !cli.no_low_priority;
    if low_priority {
        lower_priority();
    }

    cli::run(&cli)
}
