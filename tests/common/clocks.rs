//! Test clocks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lease_lock_core::clock::Clock;

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn at(millis: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(millis)),
        }
    }

    pub fn set(&self, millis: u64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Clock driven by tokio's timer, so paused-time tests see sleeps advance it.
#[derive(Debug, Clone)]
pub struct TokioClock {
    origin: tokio::time::Instant,
    base_millis: u64,
}

impl TokioClock {
    /// Must be called inside the runtime whose time it follows.
    pub fn starting_at(base_millis: u64) -> Self {
        Self {
            origin: tokio::time::Instant::now(),
            base_millis,
        }
    }
}

impl Clock for TokioClock {
    fn now_millis(&self) -> u64 {
        self.base_millis + self.origin.elapsed().as_millis() as u64
    }
}
