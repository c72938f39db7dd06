//! # Progress — Atomic Search Progress Counters
//!
//! Thread-safe progress tracking shared between the outer sweep ([`crate::search`])
//! and a background status reporter. Uses atomics for lock-free updates from the
//! coordinator thread; there is no per-candidate contention here since only the
//! coordinator (not individual workers) touches these counters, once per epoch.
//!
//! ## Background Reporter
//!
//! A dedicated thread prints progress to stderr every 30 seconds: the current k,
//! its m_lower floor, and the best m found so far. Shuts down cleanly via the
//! `shutdown` atomic flag.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub struct Progress {
    pub k: AtomicU64,
    pub m_lower: AtomicU64,
    pub best_m: AtomicU64,
    start: Instant,
    shutdown: AtomicBool,
}

impl Progress {
    pub fn new() -> Arc<Self> {
        Arc::new(Progress {
            k: AtomicU64::new(0),
            m_lower: AtomicU64::new(0),
            best_m: AtomicU64::new(0),
            start: Instant::now(),
            shutdown: AtomicBool::new(false),
        })
    }

    pub fn start_reporter(self: &Arc<Self>) -> thread::JoinHandle<()> {
        let progress = Arc::clone(self);
        thread::spawn(move || loop {
            thread::sleep(Duration::from_secs(30));
            if progress.shutdown.load(Ordering::Relaxed) {
                break;
            }
            progress.print_status();
        })
    }

    pub fn print_status(&self) {
        let elapsed = self.start.elapsed();
        let k = self.k.load(Ordering::Relaxed);
        let m_lower = self.m_lower.load(Ordering::Relaxed);
        let best_m = self.best_m.load(Ordering::Relaxed);
        let h = elapsed.as_secs() / 3600;
        let m = (elapsed.as_secs() % 3600) / 60;
        let s = elapsed.as_secs() % 60;
        eprintln!(
            "[{:02}:{:02}:{:02}] k: {} | scanning from m={} | best so far m={}",
            h, m, s, k, m_lower, best_m
        );
    }

    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}
