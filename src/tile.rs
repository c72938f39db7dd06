//! # Tile — Windowed Sieve and Scanner
//!
//! One worker's unit of work: strip every prime ≤ k out of a window of
//! candidates (`sieve_tile`), then slide a length-k window across the
//! surviving bits looking for an all-non-smooth block (`scan_tile`).
//!
//! `off[]` carries the "next in-window multiple of p_i" state from one tile
//! to the next without ever computing a modulus: each tile only subtracts
//! `step_mod[i] = stride mod p_i` and branches once (`OffsetCarry`, spec
//! §4.3/§4.4). `Bitset` is the packed-bit survivor map, grounded on
//! [`crate::sieve`]'s antecedent `BitSieve` — reused for the same
//! word/bit-index layout and POPCNT-friendly storage, generalized with the
//! `clear_prefix` a sieve that re-uses its buffer across tiles needs.

use std::collections::TryReserveError;

use crate::fastmod::FastModEntry;

/// Packed bit array, word `i / 64`, bit `i % 64`. A set bit means the
/// candidate at that index is k-smooth.
pub struct Bitset {
    words: Vec<u64>,
    len: usize,
}

impl Bitset {
    pub fn new(len: usize) -> Self {
        Bitset {
            words: vec![0u64; len.div_ceil(64)],
            len,
        }
    }

    /// Build a `Bitset` of `len` bits, reporting allocation failure instead
    /// of aborting the process. Used at [`crate::pool::WorkerPool`]
    /// construction, where the caller surfaces a [`crate::error::SetupError`].
    pub fn try_with_capacity(len: usize) -> Result<Self, TryReserveError> {
        let word_count = len.div_ceil(64);
        let mut words = Vec::new();
        words.try_reserve_exact(word_count)?;
        words.resize(word_count, 0);
        Ok(Bitset { words, len })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Grow to at least `len` bits if not already that large. Never shrinks.
    pub fn ensure_len(&mut self, len: usize) {
        if len > self.len {
            self.words.resize(len.div_ceil(64), 0);
            self.len = len;
        }
    }

    /// Clear bits `[0, prefix)` to 0. `prefix` must be `<= len()`.
    pub fn clear_prefix(&mut self, prefix: usize) {
        debug_assert!(prefix <= self.len);
        for w in &mut self.words[..prefix.div_ceil(64)] {
            *w = 0;
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> bool {
        debug_assert!(index < self.len, "Bitset index out of bounds: {index} >= {}", self.len);
        self.words[index / 64] & (1u64 << (index % 64)) != 0
    }

    #[inline]
    pub fn set(&mut self, index: usize) {
        debug_assert!(index < self.len);
        self.words[index / 64] |= 1u64 << (index % 64);
    }
}

/// Per-worker scratch, retained across epochs and grown monotonically.
pub struct WorkerScratch {
    pub residual: Vec<u64>,
    pub bad_bits: Bitset,
}

impl WorkerScratch {
    pub fn new() -> Self {
        WorkerScratch {
            residual: Vec::new(),
            bad_bits: Bitset::new(0),
        }
    }

    /// Pre-size both buffers to hold `len` candidates, reporting allocation
    /// failure instead of aborting. [`crate::pool::WorkerPool::spawn`] calls
    /// this once per worker, sized to the largest tile the run will ever
    /// need (`tile_len + k_max`), so the steady-state `ensure_capacity`
    /// calls inside the sieve loop are no-ops.
    pub fn try_with_capacity(len: usize) -> Result<Self, TryReserveError> {
        let mut residual = Vec::new();
        residual.try_reserve_exact(len)?;
        residual.resize(len, 0);
        let bad_bits = Bitset::try_with_capacity(len)?;
        Ok(WorkerScratch { residual, bad_bits })
    }

    /// Ensure both buffers can hold at least `len` candidates. Infallible:
    /// by the time a tile is sieved, capacity for the run's largest tile
    /// was already reserved fallibly in [`Self::try_with_capacity`] at pool
    /// construction, so this only grows further if that estimate was wrong.
    pub fn ensure_capacity(&mut self, len: usize) {
        if self.residual.len() < len {
            self.residual.resize(len, 0);
        }
        self.bad_bits.ensure_len(len);
    }
}

impl Default for WorkerScratch {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize `off[i]` for each prime so that `off[i]` is the least index
/// `>= 0` within a window starting at `base+1` divisible by `primes[i]`.
/// `off[i] = (primes[i] - ((base+1) mod primes[i])) mod primes[i]`.
pub fn init_offsets(base: u64, primes: &[u64], fastmod: &[FastModEntry], off: &mut Vec<u64>) {
    off.clear();
    off.reserve(primes.len());
    let base_test0 = base + 1;
    for (p, entry) in primes.iter().zip(fastmod) {
        let r = entry.modulo(base_test0);
        off.push(if r == 0 { 0 } else { p - r });
    }
}

/// Strip every prime `<= k` out of the candidates `base+1 .. base+1+L`,
/// writing survivor residuals into `scratch.residual[..L]` and marking
/// k-smooth positions (residual == 1) in `scratch.bad_bits`.
///
/// `off` is both read (starting offset per prime) and updated in place to
/// the state that should be carried into the *next* tile of this worker's
/// stride (spec §4.3 step 3b — no division is used for the carry).
#[allow(clippy::too_many_arguments)]
pub fn sieve_tile(
    base: u64,
    l: usize,
    primes: &[u64],
    fastmod: &[FastModEntry],
    off: &mut [u64],
    step_mod: &[u64],
    scratch: &mut WorkerScratch,
) {
    scratch.ensure_capacity(l);
    {
        let residual = &mut scratch.residual[..l];
        for (j, slot) in residual.iter_mut().enumerate() {
            *slot = base + 1 + j as u64;
        }
    }
    scratch.bad_bits.clear_prefix(l);

    for (i, &p) in primes.iter().enumerate() {
        let entry = &fastmod[i];
        let mut j = off[i] as usize;
        if p == 2 {
            while j < l {
                let n = &mut scratch.residual[j];
                let tz = n.trailing_zeros();
                *n >>= tz;
                j += 2;
            }
        } else {
            let pu = p as usize;
            while j < l {
                let n = &mut scratch.residual[j];
                while entry.divide_if_divisible(n) {}
                j += pu;
            }
        }
        let sm = step_mod[i];
        off[i] = if off[i] >= sm { off[i] - sm } else { p - (sm - off[i]) };
    }

    for j in 0..l {
        if scratch.residual[j] == 1 {
            scratch.bad_bits.set(j);
        }
    }
}

/// Slide a length-`k` window across `[0, start_count + k)` of `bad_bits`
/// looking for a window with zero set bits (i.e. a block `(m+1..m+k)` with
/// no k-smooth member). Returns the smallest such `m = base + s`, or `None`.
pub fn scan_tile(base: u64, start_count: usize, k: usize, bad_bits: &Bitset) -> Option<u64> {
    if start_count == 0 || k == 0 {
        return None;
    }
    let mut bad = 0usize;
    for j in 0..k {
        if bad_bits.get(j) {
            bad += 1;
        }
    }
    if bad == 0 {
        return Some(base);
    }
    for s in 1..start_count {
        if bad_bits.get(s - 1) {
            bad -= 1;
        }
        if bad_bits.get(s + k - 1) {
            bad += 1;
        }
        if bad == 0 {
            return Some(base + s as u64);
        }
    }
    None
}
