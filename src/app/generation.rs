//! Generation counter for single-flight searches.
//!
//! Every submitted search takes the next generation number. When its results
//! arrive they are applied only if no newer search has started in the
//! meantime; otherwise they are dropped as superseded.

use std::sync::atomic::{AtomicU64, Ordering};

/// Sequence number handed to one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Monotonic source of [`Generation`]s.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    issued: AtomicU64,
}

impl GenerationCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next generation. The first one is 1.
    pub fn begin(&self) -> Generation {
        Generation(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True if `generation` is still the newest one issued.
    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        self.issued.load(Ordering::SeqCst) == generation.0
    }
}
