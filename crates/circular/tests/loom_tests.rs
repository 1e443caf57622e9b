//! Loom-based concurrency tests for the publication protocol.
//!
//! Run with: `cargo test --features loom --test loom_tests --release`
//!
//! Loom exhaustively explores thread interleavings. `AtomicCell` is not
//! loom-aware, so the protocol is reproduced here with loom atomics: slots
//! are `AtomicU64` where 0 means vacant.

#![cfg(feature = "loom")]

use loom::sync::atomic::{AtomicU64, Ordering};
use loom::sync::Arc;
use loom::thread;

const CAPACITY: u64 = 4;

/// Reduced ring buffer: same cursors, same orderings, small capacity to keep
/// loom's state space manageable.
struct LoomRing {
    write: AtomicU64,
    published: AtomicU64,
    read: AtomicU64,
    slots: [AtomicU64; CAPACITY as usize],
}

impl LoomRing {
    fn new() -> Self {
        Self {
            write: AtomicU64::new(0),
            published: AtomicU64::new(0),
            read: AtomicU64::new(0),
            slots: [
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
            ],
        }
    }

    fn slot(&self, ticket: u64) -> &AtomicU64 {
        &self.slots[(ticket & (CAPACITY - 1)) as usize]
    }

    fn push(&self, value: u64) {
        assert_ne!(value, 0, "0 marks a vacant slot");
        let ticket = self.write.fetch_add(1, Ordering::AcqRel);
        self.slot(ticket).store(value, Ordering::Release);

        while self
            .published
            .compare_exchange(ticket, ticket + 1, Ordering::Release, Ordering::Relaxed)
            .is_err()
        {
            thread::yield_now();
        }
    }

    fn try_pop(&self) -> Option<u64> {
        let mut read = self.read.load(Ordering::Relaxed);
        loop {
            let published = self.published.load(Ordering::Acquire);
            if published <= read {
                return None;
            }
            match self.read.compare_exchange(
                read,
                read + 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    let value = self.slot(read).swap(0, Ordering::AcqRel);
                    if value != 0 {
                        return Some(value);
                    }
                    read += 1;
                }
                Err(actual) => read = actual,
            }
        }
    }
}

/// Two producers race for tickets; a consumer must never see a vacant
/// (unwritten) published slot and must see each value once.
#[test]
fn loom_two_producers_publish_in_order() {
    loom::model(|| {
        let ring = Arc::new(LoomRing::new());

        let producers: Vec<_> = [1u64, 2]
            .into_iter()
            .map(|value| {
                let ring = Arc::clone(&ring);
                thread::spawn(move || ring.push(value))
            })
            .collect();

        let consumer = {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                let mut received = Vec::new();
                for _ in 0..3 {
                    if let Some(v) = ring.try_pop() {
                        received.push(v);
                    }
                    thread::yield_now();
                }
                received
            })
        };

        for p in producers {
            p.join().unwrap();
        }
        let mut received = consumer.join().unwrap();
        while let Some(v) = ring.try_pop() {
            received.push(v);
        }

        received.sort_unstable();
        assert_eq!(received, vec![1, 2]);
        assert_eq!(ring.read.load(Ordering::SeqCst), 2);
        assert_eq!(ring.published.load(Ordering::SeqCst), 2);
    });
}

/// Two consumers race on one published entry: exactly one wins and `read`
/// never passes `published`.
#[test]
fn loom_two_consumers_claim_once() {
    loom::model(|| {
        let ring = Arc::new(LoomRing::new());
        ring.push(7);

        let consumers: Vec<_> = (0..2)
            .map(|_| {
                let ring = Arc::clone(&ring);
                thread::spawn(move || ring.try_pop())
            })
            .collect();

        let results: Vec<_> = consumers.into_iter().map(|c| c.join().unwrap()).collect();
        let wins = results.iter().filter(|r| r.is_some()).count();
        assert_eq!(wins, 1);
        assert!(results.contains(&Some(7)));
        assert_eq!(ring.read.load(Ordering::SeqCst), 1);
    });
}

/// Producer and consumer run concurrently; the consumer only ever observes
/// the written value, never a stale or vacant slot.
#[test]
fn loom_publish_happens_before_consume() {
    loom::model(|| {
        let ring = Arc::new(LoomRing::new());

        let producer = {
            let ring = Arc::clone(&ring);
            thread::spawn(move || ring.push(42))
        };

        let seen = ring.try_pop();
        if let Some(v) = seen {
            assert_eq!(v, 42);
        }

        producer.join().unwrap();
        if seen.is_none() {
            assert_eq!(ring.try_pop(), Some(42));
        }
        assert_eq!(ring.try_pop(), None);
    });
}
