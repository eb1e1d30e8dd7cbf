//! Published, immutable view of the aggregated document.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

/// Holder for the last published document.
///
/// Readers get either the previous complete snapshot or the new one, never a
/// partially merged state. Starts out empty.
#[derive(Debug)]
pub struct DocSnapshot {
    current: ArcSwap<String>,
    generation: AtomicU64,
}

impl DocSnapshot {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(String::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Current snapshot. Empty until the first publish.
    pub fn load(&self) -> Arc<String> {
        self.current.load_full()
    }

    /// Replace the snapshot.
    pub fn publish(&self, document: String) {
        self.current.store(Arc::new(document));
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// Number of publishes so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl Default for DocSnapshot {
    fn default() -> Self {
        Self::new()
    }
}
