//! # CLI Execution
//!
//! Extracted from `main.rs` to keep the entry point slim: builds the worker
//! pool, runs the outer sweep, and prints plateau points as they're found.

use std::io::Write;

use anyhow::Result;
use block_prime_gap::pool::WorkerPool;
use block_prime_gap::progress::Progress;
use block_prime_gap::search;
use tracing::info;

use super::Cli;

/// Resolve the requested thread count to an actual worker count: 0 means
/// "all logical processors", and any explicit count is capped to the host
/// total too, since each worker is pinned to a distinct logical core
/// (spec.md §6/§4.6) — an uncapped count would collide threads onto the
/// same core instead of giving each its own.
fn resolve_thread_count(requested: usize) -> usize {
    let host_total = std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1);
    if requested == 0 {
        host_total
    } else {
        requested.min(host_total)
    }
}

/// Run the k=1..=k_max sweep, printing each plateau point to stdout as soon
/// as its epoch resolves rather than buffering the whole sweep.
pub fn run(cli: &Cli) -> Result<()> {
    let threads = resolve_thread_count(cli.threads);

    info!(
        threads,
        k_max = cli.k_max,
        tile_len = cli.tile_len,
        batch_tiles = cli.batch_tiles,
        "block-prime-gap starting"
    );

    // Largest tile any epoch in this sweep will issue, since k only grows
    // as the sweep advances: tile_len + k_max candidates.
    let max_scratch_len = (cli.tile_len + cli.k_max) as usize;
    let pool = WorkerPool::spawn(threads, !cli.no_pin, max_scratch_len)?;
    let progress = Progress::new();
    let reporter_handle = progress.start_reporter();

    println!("# k,m — least m such that every integer in (m, m+k] has a prime factor > k");
    let stdout = std::io::stdout();
    let mut emitted = 0u64;
    let result = search::search_plateaus(&pool, cli.k_max, cli.tile_len, cli.batch_tiles, &progress, |point| {
        let mut handle = stdout.lock();
        let _ = writeln!(handle, "{},{}", point.k, point.m);
        let _ = handle.flush();
        emitted += 1;
    });

    progress.stop();
    let _ = reporter_handle.join();
    pool.shutdown();
    result?;

    info!(plateau_points = emitted, "sweep complete");
    Ok(())
}
