//! # Search — Outer Sweep Over k
//!
//! Drives one [`crate::epoch::Epoch`] per k from 1 to `k_max`, feeding each
//! epoch the previous k's result as its `m_lower` floor — m(k) is
//! non-decreasing in k, so nothing below the last result can possibly be
//! the next one. A [`PlateauPoint`] is emitted only when m actually grows;
//! stretches of k sharing the same m (a "plateau") are collapsed to their
//! first occurrence, matching the spec's plateau-point output.
//!
//! Points are handed to `on_point` as soon as each epoch resolves, not
//! batched up over the whole sweep — a run to a large `k_max` would
//! otherwise produce no output (and discard all progress on an error or an
//! interrupted run) until k=k_max finishes.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use crate::epoch::Epoch;
use crate::error::SearchError;
use crate::pool::WorkerPool;
use crate::progress::Progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlateauPoint {
    pub k: u64,
    pub m: u64,
}

/// Sweep k = 1..=k_max, calling `on_point` with one [`PlateauPoint`] per k
/// where m(k) strictly exceeds m(k-1) (with m(0) taken as 0, so k=1 always
/// emits), as soon as that k's epoch resolves.
pub fn search_plateaus(
    pool: &WorkerPool,
    k_max: u64,
    tile_len: u64,
    batch_tiles: u64,
    progress: &Arc<Progress>,
    mut on_point: impl FnMut(PlateauPoint),
) -> Result<(), SearchError> {
    let mut last_m = 0u64;

    for k in 1..=k_max {
        progress.k.store(k, Ordering::Relaxed);
        progress.m_lower.store(last_m, Ordering::Relaxed);

        let mut epoch = Epoch::new(pool, k);
        let m = epoch.run(last_m, tile_len, batch_tiles)?;
        progress.best_m.store(m, Ordering::Relaxed);

        if k == 1 || m > last_m {
            on_point(PlateauPoint { k, m });
        }
        last_m = m;
    }

    Ok(())
}
