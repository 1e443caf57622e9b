use thiserror::Error;

/// Error types for ring buffer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingError {
    /// Capacity was zero or not a power of two.
    #[error("invalid capacity {capacity}: must be a non-zero power of two")]
    InvalidCapacity {
        /// The rejected capacity.
        capacity: usize,
    },
    /// No published entry was available to pop.
    #[error("ring buffer is empty")]
    Empty,
}
