use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the ring buffer counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub pushes: u64,
    pub pops: u64,
    pub empty_polls: u64,
    pub publish_spins: u64,
    pub overwrites: u64,
}

/// Thread-safe counters, updated with relaxed atomics.
#[derive(Debug, Default)]
pub(crate) struct Metrics {
    pushes: AtomicU64,
    pops: AtomicU64,
    empty_polls: AtomicU64,
    publish_spins: AtomicU64,
    overwrites: AtomicU64,
}

impl Metrics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn add_push(&self) {
        self.pushes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_pop(&self) {
        self.pops.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_empty_poll(&self) {
        self.empty_polls.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_publish_spins(&self, n: u64) {
        if n > 0 {
            self.publish_spins.fetch_add(n, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn add_overwrite(&self) {
        self.overwrites.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            pushes: self.pushes.load(Ordering::Relaxed),
            pops: self.pops.load(Ordering::Relaxed),
            empty_polls: self.empty_polls.load(Ordering::Relaxed),
            publish_spins: self.publish_spins.load(Ordering::Relaxed),
            overwrites: self.overwrites.load(Ordering::Relaxed),
        }
    }
}
