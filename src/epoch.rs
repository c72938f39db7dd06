//! # Epoch — Per-k Coordinator
//!
//! One [`Epoch`] drives the search for a single k to completion: it builds
//! the k-derived immutable [`SharedTables`] once, then hands the pool
//! successive [`Batch`]es of `tile_len * batch_tiles` candidates each until
//! some worker reports a block. Coordinator-side state (`best_m`,
//! `end_limit`) lives in the `Batch`, not the `Epoch`, because a batch is
//! the unit the pool synchronizes on — see [`crate::pool`].
//!
//! A fresh `Arc<SharedTables>` is built on every [`Epoch::run`] call, even
//! for a repeated k. Workers detect "new epoch" by `Arc::ptr_eq` against
//! their last-seen tables, not by comparing k, so two independent `run`
//! calls for the same k (as in an idempotence check) each get a clean
//! `off[]`/`next_base` start rather than silently reusing stale carry state.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use crate::error::SearchError;
use crate::fastmod::FastModEntry;
use crate::pool::WorkerPool;

/// Immutable, k-derived tables shared read-only by every worker for the
/// lifetime of one epoch.
pub struct SharedTables {
    pub k: u64,
    pub primes: Vec<u64>,
    pub fastmod: Vec<FastModEntry>,
    /// `step_mod[i] = stride mod primes[i]`, used by [`crate::tile::sieve_tile`]
    /// to carry `off[i]` forward without a division.
    pub step_mod: Vec<u64>,
    pub tile_len: u64,
    /// `tile_len * worker_count`: the span one round of tiles covers.
    pub stride: u64,
}

/// One coordinator-issued unit of work: a `[m_lower, m_upper]` range split
/// into `tile_len`-sized tiles, one strided sequence per worker.
pub struct Batch {
    pub shared: Arc<SharedTables>,
    pub m_lower: u64,
    pub m_upper: u64,
    best_m: AtomicU64,
    end_limit: AtomicU64,
    active_workers: AtomicUsize,
    done: Mutex<bool>,
    done_cv: Condvar,
}

impl Batch {
    fn new(shared: Arc<SharedTables>, m_lower: u64, m_upper: u64, worker_count: usize) -> Arc<Self> {
        Arc::new(Batch {
            shared,
            m_lower,
            m_upper,
            best_m: AtomicU64::new(u64::MAX),
            end_limit: AtomicU64::new(m_upper),
            active_workers: AtomicUsize::new(worker_count),
            done: Mutex::new(false),
            done_cv: Condvar::new(),
        })
    }

    /// The current ceiling a worker should stop scanning past: once some
    /// worker reports `v`, nothing at or past `v` can be the minimal block,
    /// so later workers narrow their own search window.
    pub fn end_limit(&self) -> u64 {
        self.end_limit.load(Ordering::Acquire)
    }

    /// Report a candidate minimal m. Lock-free: a CAS loop lowers `best_m`
    /// only if `v` beats the current value, then lowers `end_limit` to
    /// `v - 1` the same way. Never blocks, never holds a lock.
    pub fn try_set_best(&self, v: u64) {
        let mut cur = self.best_m.load(Ordering::Acquire);
        while v < cur {
            match self
                .best_m
                .compare_exchange_weak(cur, v, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    let new_limit = v.saturating_sub(1);
                    let mut old_limit = self.end_limit.load(Ordering::Acquire);
                    while new_limit < old_limit {
                        match self.end_limit.compare_exchange_weak(
                            old_limit,
                            new_limit,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                        ) {
                            Ok(_) => break,
                            Err(actual) => old_limit = actual,
                        }
                    }
                    return;
                }
                Err(actual) => cur = actual,
            }
        }
    }

    pub fn best(&self) -> Option<u64> {
        match self.best_m.load(Ordering::Acquire) {
            u64::MAX => None,
            v => Some(v),
        }
    }

    /// Called by a worker once its strided sequence of tiles is exhausted
    /// (its `next_base` has passed the current `end_limit`).
    pub fn mark_worker_done(&self) {
        if self.active_workers.fetch_sub(1, Ordering::AcqRel) == 1 {
            *self.done.lock().unwrap() = true;
            self.done_cv.notify_all();
        }
    }

    /// Block the coordinator until every worker has finished this batch.
    pub fn wait_done(&self) {
        let guard = self.done.lock().unwrap();
        let _guard = self
            .done_cv
            .wait_while(guard, |done| !*done)
            .unwrap();
    }
}

/// Drives the search for one k across as many batches as it takes to find
/// a plateau point. Holds no state itself beyond `k` and a pool borrow —
/// all per-run state is local to [`Epoch::run`].
pub struct Epoch<'p> {
    pool: &'p WorkerPool,
    k: u64,
}

impl<'p> Epoch<'p> {
    pub fn new(pool: &'p WorkerPool, k: u64) -> Self {
        Epoch { pool, k }
    }

    /// Search `[m_lower, ...)` for the least m such that every integer in
    /// `(m, m+k]` has a prime factor `> k`, in batches of `tile_len *
    /// batch_tiles` candidates per worker round.
    pub fn run(&mut self, m_lower: u64, tile_len: u64, batch_tiles: u64) -> Result<u64, SearchError> {
        if tile_len == 0 || batch_tiles == 0 {
            return Err(SearchError::InvalidParameters { tile_len, batch_tiles });
        }

        let k = self.k;
        let worker_count = self.pool.thread_count() as u64;
        let stride = tile_len
            .checked_mul(worker_count)
            .ok_or(SearchError::RangeSaturated { k, m_lower, tile_len, batch_tiles })?;

        let primes = crate::sieve::primes_upto(k);
        let fastmod: Vec<FastModEntry> = primes.iter().map(|&p| FastModEntry::build(p)).collect();
        let step_mod: Vec<u64> = fastmod.iter().map(|e| e.modulo(stride)).collect();
        let shared = Arc::new(SharedTables {
            k,
            primes,
            fastmod,
            step_mod,
            tile_len,
            stride,
        });

        let mut lower = m_lower;
        loop {
            let batch_span = tile_len
                .checked_mul(batch_tiles)
                .ok_or(SearchError::RangeSaturated { k, m_lower: lower, tile_len, batch_tiles })?;
            let upper = lower
                .checked_add(batch_span - 1)
                .ok_or(SearchError::RangeSaturated { k, m_lower: lower, tile_len, batch_tiles })?;

            let batch = Batch::new(Arc::clone(&shared), lower, upper, self.pool.thread_count());
            self.pool.start(Arc::clone(&batch));
            batch.wait_done();

            if let Some(m) = batch.best() {
                debug_assert!(m >= m_lower, "m={m} below this epoch's m_lower={m_lower}");
                return Ok(m);
            }
            lower = upper + 1;
        }
    }
}
