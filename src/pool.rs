//! # WorkerPool — Fixed, Pinned Thread Pool
//!
//! A fixed set of `W` OS threads, created once at startup and parked on a
//! condvar between epochs. Each thread owns its [`crate::tile::WorkerScratch`]
//! and offset table exclusively — the only shared mutable state during an
//! epoch is the handful of atomics on [`crate::epoch::Batch`] (spec §4.6/§5).
//!
//! Grounded on [`crate::progress::Progress`]'s atomic-counters-plus-background-
//! thread idiom for the synchronization primitives, and on the teacher's
//! raw-`libc` FFI block (`pthread_set_qos_class_self_np` in `cli.rs`) for the
//! `// SAFETY: ...` commenting convention used here for core pinning.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use crate::epoch::Batch;
use crate::error::SetupError;
use crate::tile::WorkerScratch;

struct Slot {
    signal: Option<Arc<WakeSignal>>,
    generation: u64,
}

/// Wakeup sent to a parked worker thread: either start processing a batch,
/// or shut down. A tagged variant, not dynamic dispatch (spec §9).
enum WakeSignal {
    Start(Arc<Batch>),
    Stop,
}

struct Channel {
    slot: Mutex<Slot>,
    cv: Condvar,
}

/// A fixed pool of pinned worker threads.
pub struct WorkerPool {
    channel: Arc<Channel>,
    handles: Vec<JoinHandle<()>>,
    thread_count: usize,
}

impl WorkerPool {
    /// Spawn `thread_count` worker threads, each pinned to a distinct
    /// logical core when `pin` is true (best-effort; unsupported platforms
    /// log a warning and run unpinned).
    ///
    /// `max_scratch_len` is the largest tile (`tile_len + k_max`) this pool
    /// will ever be asked to sieve; each worker's scratch buffers are
    /// reserved to that size up front, on the calling thread, so an
    /// allocation failure surfaces here as [`SetupError::ScratchAlloc`]
    /// instead of aborting mid-search on a worker thread (spec.md §7's
    /// "memory allocation" setup-error category).
    pub fn spawn(thread_count: usize, pin: bool, max_scratch_len: usize) -> Result<Self, SetupError> {
        assert!(thread_count > 0, "thread_count must be positive");

        let channel = Arc::new(Channel {
            slot: Mutex::new(Slot { signal: None, generation: 0 }),
            cv: Condvar::new(),
        });

        let mut handles = Vec::with_capacity(thread_count);
        for tid in 0..thread_count {
            let scratch = WorkerScratch::try_with_capacity(max_scratch_len).map_err(|source| {
                SetupError::ScratchAlloc(format!(
                    "worker {tid} scratch of {max_scratch_len} u64 candidates: {source}"
                ))
            })?;
            let channel = Arc::clone(&channel);
            let handle = std::thread::Builder::new()
                .name(format!("bpgap-worker-{tid}"))
                .spawn(move || {
                    if pin {
                        pin_to_core(tid);
                    }
                    worker_loop(tid, &channel, scratch);
                })
                .map_err(|source| SetupError::ThreadSpawn { index: tid, source })?;
            handles.push(handle);
        }

        Ok(WorkerPool { channel, handles, thread_count })
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Wake every worker to process `batch`, without waiting for completion.
    /// The caller awaits `batch.wait_done()` separately.
    pub fn start(&self, batch: Arc<Batch>) {
        self.broadcast(WakeSignal::Start(batch));
    }

    fn broadcast(&self, signal: WakeSignal) {
        let mut slot = self.channel.slot.lock().unwrap();
        slot.signal = Some(Arc::new(signal));
        slot.generation += 1;
        self.channel.cv.notify_all();
    }

    /// Signal all workers to stop and join them. Consumes the pool.
    pub fn shutdown(self) {
        self.broadcast(WakeSignal::Stop);
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}

fn worker_loop(tid: usize, channel: &Channel, mut scratch: WorkerScratch) {
    let mut last_seen_generation = 0u64;
    let mut off: Vec<u64> = Vec::new();
    let mut next_base: u64 = 0;
    let mut last_shared: Option<Arc<crate::epoch::SharedTables>> = None;

    loop {
        let signal = {
            let mut slot = channel.slot.lock().unwrap();
            while slot.generation == last_seen_generation {
                slot = channel.cv.wait(slot).unwrap();
            }
            last_seen_generation = slot.generation;
            slot.signal.clone().expect("signal set whenever generation advances")
        };

        match &*signal {
            WakeSignal::Stop => break,
            WakeSignal::Start(batch) => {
                let reinit = last_shared
                    .as_ref()
                    .map_or(true, |s| !Arc::ptr_eq(s, &batch.shared));
                if reinit {
                    next_base = batch.m_lower + (tid as u64) * batch.shared.tile_len;
                    crate::tile::init_offsets(
                        next_base,
                        &batch.shared.primes,
                        &batch.shared.fastmod,
                        &mut off,
                    );
                    last_shared = Some(Arc::clone(&batch.shared));
                }
                run_batch(tid, batch, &mut next_base, &mut off, &mut scratch);
            }
        }
    }
}

fn run_batch(
    _tid: usize,
    batch: &Arc<Batch>,
    next_base: &mut u64,
    off: &mut [u64],
    scratch: &mut WorkerScratch,
) {
    let shared = &batch.shared;
    let k = shared.k;
    let tile_len = shared.tile_len;

    loop {
        let end_limit = batch.end_limit();
        if *next_base > end_limit {
            break;
        }
        let start_count = tile_len.min(end_limit - *next_base + 1) as usize;
        let l = start_count + k as usize;

        crate::tile::sieve_tile(
            *next_base,
            l,
            &shared.primes,
            &shared.fastmod,
            off,
            &shared.step_mod,
            scratch,
        );

        if let Some(found) = crate::tile::scan_tile(*next_base, start_count, k as usize, &scratch.bad_bits) {
            batch.try_set_best(found);
        }

        *next_base += shared.stride;
    }

    batch.mark_worker_done();
}

/// Pin the calling thread to logical core `core_id`, best-effort.
#[cfg(target_os = "linux")]
fn pin_to_core(core_id: usize) {
    // SAFETY: `cpu_set_t` is a plain-old-data struct and `sched_setaffinity`
    // with a correctly sized, zeroed set and a single bit is well-defined
    // for the calling thread (pid 0 means "self").
    unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(core_id % libc::CPU_SETSIZE as usize, &mut set);
        let rc = libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set);
        if rc != 0 {
            tracing::warn!(core_id, "sched_setaffinity failed, running unpinned");
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn pin_to_core(core_id: usize) {
    tracing::debug!(core_id, "thread pinning is only implemented on linux; running unpinned");
}
