//! Global atomic counters for evaluation activity.
//!
//! Counters are bumped at the call site; [`Metrics::flush`] emits the current
//! values as one `tracing::info!` event (the CLI does this once per run).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    judgments_requested: AtomicU64,
    judgments_failed: AtomicU64,
    handles_connected: AtomicU64,
    cycles_evaluated: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            judgments_requested: AtomicU64::new(0),
            judgments_failed: AtomicU64::new(0),
            handles_connected: AtomicU64::new(0),
            cycles_evaluated: AtomicU64::new(0),
        }
    }

    /// A round trip to the judgment capability was started.
    pub fn inc_judgments_requested(&self) {
        self.judgments_requested.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "judgments_requested", "counter incremented");
    }

    /// A phase judgment ended in a `CapabilityError`.
    pub fn inc_judgments_failed(&self) {
        self.judgments_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "judgments_failed", "counter incremented");
    }

    pub fn inc_handles_connected(&self) {
        self.handles_connected.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "handles_connected", "counter incremented");
    }

    pub fn inc_cycles_evaluated(&self) {
        self.cycles_evaluated.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "cycles_evaluated", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            judgments_requested = self.judgments_requested(),
            judgments_failed = self.judgments_failed(),
            handles_connected = self.handles_connected(),
            cycles_evaluated = self.cycles_evaluated(),
        );
    }

    pub fn judgments_requested(&self) -> u64 {
        self.judgments_requested.load(Ordering::Relaxed)
    }

    pub fn judgments_failed(&self) -> u64 {
        self.judgments_failed.load(Ordering::Relaxed)
    }

    pub fn handles_connected(&self) -> u64 {
        self.handles_connected.load(Ordering::Relaxed)
    }

    pub fn cycles_evaluated(&self) -> u64 {
        self.cycles_evaluated.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.judgments_requested.store(0, Ordering::Relaxed);
        self.judgments_failed.store(0, Ordering::Relaxed);
        self.handles_connected.store(0, Ordering::Relaxed);
        self.cycles_evaluated.store(0, Ordering::Relaxed);
    }
}
