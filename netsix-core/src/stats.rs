//! Monotonic statistics counters

use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonic event counter safe for concurrent increment
///
/// Counters are observability only: packet-processing code increments them
/// but never reads them back for control decisions, so relaxed ordering is
/// sufficient.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    /// Create a counter starting at zero
    pub const fn new() -> Self {
        Counter(AtomicU64::new(0))
    }

    /// Add one to the counter
    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the current value
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}
