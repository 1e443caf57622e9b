use crate::RingError;

/// How a thread waits while it spins for its publication turn or for data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitStrategy {
    /// Yield to the OS scheduler on every iteration.
    #[default]
    Yield,
    /// Spin with PAUSE hints first, then fall back to yielding.
    ///
    /// Never parks and never gives up; only the cost of each iteration grows.
    Backoff,
}

/// Configuration for [`RingBuffer`](crate::RingBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Number of slots. Must be a non-zero power of two.
    pub capacity: usize,
    /// Wait strategy used by `push` and the blocking `pop`.
    pub wait: WaitStrategy,
    /// Enable metrics collection (slight overhead)
    pub enable_metrics: bool,
}

impl Config {
    /// Creates a configuration with the given capacity and default settings.
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            wait: WaitStrategy::Yield,
            enable_metrics: false,
        }
    }

    /// Returns a copy with the given wait strategy.
    pub const fn with_wait(mut self, wait: WaitStrategy) -> Self {
        self.wait = wait;
        self
    }

    /// Returns a copy with metrics enabled or disabled.
    pub const fn with_metrics(mut self, enable_metrics: bool) -> Self {
        self.enable_metrics = enable_metrics;
        self
    }

    /// Checks that the capacity is a non-zero power of two.
    pub const fn validate(&self) -> Result<(), RingError> {
        if self.capacity.is_power_of_two() {
            Ok(())
        } else {
            Err(RingError::InvalidCapacity {
                capacity: self.capacity,
            })
        }
    }

    /// Returns the mask for index wrapping.
    #[inline]
    pub const fn mask(&self) -> usize {
        self.capacity.wrapping_sub(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Capacity used by [`Config::default`].
pub const DEFAULT_CAPACITY: usize = 1024;

/// Low latency configuration (4K slots, fits in L1 cache)
pub const LOW_LATENCY_CONFIG: Config = Config::new(1 << 12).with_wait(WaitStrategy::Backoff);

/// High throughput configuration (256K slots)
pub const HIGH_THROUGHPUT_CONFIG: Config = Config::new(1 << 18).with_wait(WaitStrategy::Backoff);
