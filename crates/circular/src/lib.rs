//! circular-rs - Lock-Free Circular Buffer with Ordered Publication
//!
//! A fixed-capacity ring buffer shared by any number of producer and consumer
//! threads. Coordination uses only atomic read-modify-write on three cursors:
//!
//! - `write`: producers claim a unique ticket with `fetch_add`
//! - `published`: producers publish in strict ticket order
//! - `read`: consumers claim published tickets with a checked CAS
//!
//! # Key Features
//!
//! - Power-of-two capacity (slot index is `ticket & mask`)
//! - Global FIFO across all producers
//! - Blocking `pop` and non-blocking `try_pop`
//! - Overwrite-on-full: producers never wait for consumers
//! - No `unsafe`: slots are `crossbeam_utils::atomic::AtomicCell`s
//!
//! # Example
//!
//! ```
//! use circular_rs::{RingBuffer, RingError};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let ring = Arc::new(RingBuffer::<Box<u64>>::new(128).unwrap());
//!
//! let producer = {
//!     let ring = Arc::clone(&ring);
//!     thread::spawn(move || {
//!         for i in 0..100 {
//!             ring.push(Box::new(i));
//!         }
//!     })
//! };
//! producer.join().unwrap();
//!
//! let mut expected = 0;
//! while let Ok(item) = ring.try_pop() {
//!     assert_eq!(*item, expected);
//!     expected += 1;
//! }
//! assert_eq!(expected, 100);
//! assert_eq!(ring.try_pop(), Err(RingError::Empty));
//! ```

#![forbid(unsafe_code)]

mod backoff;
mod config;
mod error;
mod invariants;
mod metrics;
mod ring;
pub mod trace;

pub use backoff::Backoff;
pub use config::{
    Config, WaitStrategy, DEFAULT_CAPACITY, HIGH_THROUGHPUT_CONFIG, LOW_LATENCY_CONFIG,
};
pub use error::RingError;
pub use metrics::MetricsSnapshot;
pub use ring::{Drain, RingBuffer};
