//! # Error Types
//!
//! Two taxonomies: [`SetupError`] for failures standing up the worker pool
//! before any search runs, and [`SearchError`] for failures discovered while
//! driving an [`crate::epoch::Epoch`]. Both are `thiserror` leaves; `main`
//! wraps them in `anyhow::Result` at the top level.

use thiserror::Error;

/// Failures that can occur while constructing a [`crate::pool::WorkerPool`].
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to spawn worker thread {index}")]
    ThreadSpawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to allocate worker scratch space: {0}")]
    ScratchAlloc(String),
}

/// Failures discovered while searching for m(k) within one epoch.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(
        "search range saturated at k={k}: m_lower={m_lower}, tile_len={tile_len}, \
         batch_tiles={batch_tiles} overflow u64 before a plateau was found"
    )]
    RangeSaturated {
        k: u64,
        m_lower: u64,
        tile_len: u64,
        batch_tiles: u64,
    },

    #[error("invalid epoch parameters: tile_len={tile_len}, batch_tiles={batch_tiles} (both must be > 0)")]
    InvalidParameters { tile_len: u64, batch_tiles: u64 },
}
