use crate::invariants::{
    debug_assert_claim_published, debug_assert_published_bounded, debug_assert_slot_in_bounds,
    debug_assert_step,
};
use crate::metrics::Metrics;
use crate::trace::{debug, trace};
use crate::{Backoff, Config, MetricsSnapshot, RingError};
use crossbeam_utils::atomic::AtomicCell;
use crossbeam_utils::CachePadded;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// Three unbounded u64 cursors drive the buffer. Slot index is `ticket & mask`.
// At 10 billion operations/second the counters wrap after ~58 years, so
// wrap-around is treated as non-occurring.
//
//   read ≤ published ≤ write
//
// **Producer (push):**
// 1. `write.fetch_add(1, AcqRel)` hands out ticket `t`. This is the only point
//    where producers contend for slots; tickets are unique.
// 2. Store the value into slot `t & mask` (atomic cell store).
// 3. CAS `published` from `t` to `t + 1` with Release, retrying until it is
//    this ticket's turn. Publication therefore happens in ticket order even
//    when the slot stores complete out of order. Every successful CAS is an
//    RMW, so it extends the release sequence of all earlier publications.
//
// **Consumer (pop / try_pop):**
// 1. Load `read` (r), then `published` with Acquire.
// 2. If `published > r`, CAS `read` from `r` to `r + 1`. A failed CAS means
//    another consumer took `r`; retry with the observed value.
// 3. Take the value out of slot `r & mask`. The Acquire load in step 1
//    synchronizes with the producer's Release CAS, so its store is visible.
//
// Claiming with a checked CAS (not a blind fetch_add) keeps `read` from ever
// passing `published` when several consumers race on the last entry.
//
// ## Overwrite-on-full
//
// Producers never wait for consumers. A ticket `t + capacity` reuses the slot
// of ticket `t` and replaces whatever is still there. Slots are atomic cells
// holding `Option<T>`, and consumers *take* the value, so a lapped slot is
// read at most once: the later ticket finds it vacant.
//
// =============================================================================

/// Lock-free multi-producer multi-consumer ring buffer.
///
/// Producers reserve tickets with a single `fetch_add` and publish in ticket
/// order through the `published` cursor, so consumers observe a single FIFO
/// across all producers. Capacity is a hint to producers, not a bound:
/// pushing past it overwrites the oldest unconsumed entries.
///
/// The stored `T` is meant to be a handle (`Box`, `Arc`, an arena index). When
/// `Option<T>` fits in a native atomic word, slot access is lock-free; see
/// [`RingBuffer::is_lock_free`].
pub struct RingBuffer<T> {
    /// Next ticket handed to a producer
    write: CachePadded<AtomicU64>,
    /// Count of tickets whose slot store is complete and visible
    published: CachePadded<AtomicU64>,
    /// Next ticket handed to a consumer
    read: CachePadded<AtomicU64>,

    metrics: Metrics,
    config: Config,

    /// Fixed-size slot storage; never grows or shrinks.
    slots: Box<[AtomicCell<Option<T>>]>,
}

impl<T> RingBuffer<T> {
    /// Creates an empty ring buffer with `capacity` slots and default settings.
    ///
    /// Fails with [`RingError::InvalidCapacity`] when `capacity` is zero or
    /// not a power of two.
    pub fn new(capacity: usize) -> Result<Self, RingError> {
        Self::with_config(Config::new(capacity))
    }

    /// Creates an empty ring buffer from a full configuration.
    pub fn with_config(config: Config) -> Result<Self, RingError> {
        if let Err(err) = config.validate() {
            debug!(capacity = config.capacity, "rejected ring buffer capacity");
            return Err(err);
        }

        let slots = (0..config.capacity)
            .map(|_| AtomicCell::new(None))
            .collect::<Box<[_]>>();

        debug!(
            capacity = config.capacity,
            wait = ?config.wait,
            metrics = config.enable_metrics,
            lock_free = Self::is_lock_free(),
            "created ring buffer"
        );

        Ok(Self {
            write: CachePadded::new(AtomicU64::new(0)),
            published: CachePadded::new(AtomicU64::new(0)),
            read: CachePadded::new(AtomicU64::new(0)),
            metrics: Metrics::new(),
            config,
            slots,
        })
    }

    /// Returns true if slot loads and stores for this `T` use native atomics
    /// rather than crossbeam's striped fallback locks.
    pub const fn is_lock_free() -> bool {
        AtomicCell::<Option<T>>::is_lock_free()
    }

    // ---------------------------------------------------------------------
    // STATUS (advisory snapshots)
    // ---------------------------------------------------------------------

    /// Returns the number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    #[inline]
    fn slot(&self, ticket: u64) -> &AtomicCell<Option<T>> {
        let idx = (ticket as usize) & self.config.mask();
        debug_assert_slot_in_bounds!(idx, self.slots.len());
        &self.slots[idx]
    }

    /// Returns `write - read`: reserved entries, published or not.
    ///
    /// Stale as soon as it returns under concurrent use. May exceed
    /// [`capacity`](Self::capacity) once producers have lapped consumers.
    #[inline]
    pub fn len(&self) -> usize {
        // read first: write only grows, so the difference cannot go negative
        let read = self.read.load(Ordering::Acquire);
        let write = self.write.load(Ordering::Acquire);
        write.saturating_sub(read) as usize
    }

    /// Returns `published - read`: entries a consumer could claim right now.
    #[inline]
    pub fn available(&self) -> usize {
        let read = self.read.load(Ordering::Acquire);
        let published = self.published.load(Ordering::Acquire);
        published.saturating_sub(read) as usize
    }

    /// Returns true if `read == write`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        let read = self.read.load(Ordering::Acquire);
        self.write.load(Ordering::Acquire) == read
    }

    /// Returns true if `write - read` equals capacity. Once producers lap
    /// the consumers the count exceeds capacity and this reads false again.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Push a value, overwriting the oldest unconsumed entry if the buffer is
    /// full.
    ///
    /// Never waits for consumers. May spin (per the configured
    /// [`WaitStrategy`](crate::WaitStrategy)) until every producer holding an
    /// earlier ticket has published.
    pub fn push(&self, value: T) {
        let ticket = self.write.fetch_add(1, Ordering::AcqRel);

        if self.config.enable_metrics {
            self.metrics.add_push();
            // read ≤ published ≤ ticket until this ticket publishes
            let read = self.read.load(Ordering::Relaxed);
            if ticket.saturating_sub(read) >= self.capacity() as u64 {
                self.metrics.add_overwrite();
            }
        }

        // Any value still here belongs to a lapped ticket and is dropped.
        self.slot(ticket).store(Some(value));

        self.publish(ticket);
    }

    /// Wait for this ticket's turn, then advance `published` past it.
    fn publish(&self, ticket: u64) {
        let next = ticket.wrapping_add(1);
        let mut backoff = Backoff::new(self.config.wait);
        let mut spins = 0u64;

        while self
            .published
            .compare_exchange(ticket, next, Ordering::Release, Ordering::Relaxed)
            .is_err()
        {
            spins += 1;
            backoff.snooze();
        }

        debug_assert_step!("published", ticket, next);
        debug_assert_published_bounded!(next, self.write.load(Ordering::Relaxed));

        if self.config.enable_metrics {
            self.metrics.add_publish_spins(spins);
        }
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Claim the next published read ticket. Returns None if nothing is
    /// published beyond `read`.
    fn claim(&self) -> Option<u64> {
        let mut read = self.read.load(Ordering::Relaxed);
        loop {
            let published = self.published.load(Ordering::Acquire);
            if published <= read {
                return None;
            }

            match self.read.compare_exchange_weak(
                read,
                read.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    debug_assert_claim_published!(read, published);
                    return Some(read);
                }
                Err(actual) => read = actual,
            }
        }
    }

    /// Move the value out of a claimed ticket's slot.
    #[inline]
    fn take(&self, ticket: u64) -> Option<T> {
        let value = self.slot(ticket).take();
        if self.config.enable_metrics && value.is_some() {
            self.metrics.add_pop();
        }
        value
    }

    /// Pop the oldest published value, spinning until one is available.
    ///
    /// Spins forever on a buffer that never receives another push; pair it
    /// with an external stop signal or use [`try_pop`](Self::try_pop) when
    /// latency must be bounded.
    ///
    /// Returns `None` only when overwrite-on-full left the claimed slot
    /// vacant (an earlier, lapped ticket already took the newer value).
    pub fn pop(&self) -> Option<T> {
        let mut backoff = Backoff::new(self.config.wait);
        loop {
            if let Some(ticket) = self.claim() {
                return self.take(ticket);
            }
            backoff.snooze();
        }
    }

    /// Pop the oldest published value without waiting.
    ///
    /// Returns [`RingError::Empty`] as soon as no published entry remains.
    /// Slots vacated by overwrite-on-full are skipped.
    pub fn try_pop(&self) -> Result<T, RingError> {
        while let Some(ticket) = self.claim() {
            if let Some(value) = self.take(ticket) {
                return Ok(value);
            }
        }

        if self.config.enable_metrics {
            self.metrics.add_empty_poll();
        }
        Err(RingError::Empty)
    }

    /// Returns an iterator that pops until the buffer reports empty.
    pub fn drain(&self) -> Drain<'_, T> {
        Drain {
            ring: self,
            drained: 0,
        }
    }

    // ---------------------------------------------------------------------
    // METRICS
    // ---------------------------------------------------------------------

    /// Get a snapshot of metrics if enabled.
    pub fn metrics(&self) -> MetricsSnapshot {
        if self.config.enable_metrics {
            self.metrics.snapshot()
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl<T> fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("read", &self.read.load(Ordering::Relaxed))
            .field("published", &self.published.load(Ordering::Relaxed))
            .field("write", &self.write.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Iterator returned by [`RingBuffer::drain`].
///
/// Each `next` is a [`try_pop`](RingBuffer::try_pop); iteration ends at the
/// first `Empty`. Values pushed concurrently may or may not be included.
#[derive(Debug)]
pub struct Drain<'a, T> {
    ring: &'a RingBuffer<T>,
    drained: usize,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if let Ok(value) = self.ring.try_pop() {
            self.drained += 1;
            Some(value)
        } else {
            trace!(drained = self.drained, "drain reached empty buffer");
            None
        }
    }
}
