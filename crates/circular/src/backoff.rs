use crate::WaitStrategy;
use std::hint;
use std::thread;

/// Wait loop helper for the spin points of the ring buffer.
///
/// With [`WaitStrategy::Yield`] every call to [`snooze`](Backoff::snooze)
/// yields to the OS. With [`WaitStrategy::Backoff`] the wait progresses
/// Crossbeam-style: spin with PAUSE → yield to OS. It never gives up, since
/// the callers have no failure path for a missed turn.
#[derive(Debug)]
pub struct Backoff {
    strategy: WaitStrategy,
    step: u32,
}

impl Backoff {
    const SPIN_LIMIT: u32 = 6; // 2^6 = 64 spins max before yielding

    /// Creates a new backoff for the given strategy.
    #[inline]
    pub fn new(strategy: WaitStrategy) -> Self {
        Self { strategy, step: 0 }
    }

    /// Light spin with PAUSE hints.
    #[inline]
    fn spin(&mut self) {
        let spins = 1 << self.step.min(Self::SPIN_LIMIT);
        for _ in 0..spins {
            hint::spin_loop();
        }
        self.step += 1;
    }

    /// Wait one iteration according to the strategy.
    #[inline]
    pub fn snooze(&mut self) {
        match self.strategy {
            WaitStrategy::Yield => thread::yield_now(),
            WaitStrategy::Backoff => {
                if self.step <= Self::SPIN_LIMIT {
                    self.spin();
                } else {
                    thread::yield_now();
                }
            }
        }
    }

    /// Returns true once spinning has given way to yielding.
    #[cfg(test)]
    fn is_yielding(&self) -> bool {
        match self.strategy {
            WaitStrategy::Yield => true,
            WaitStrategy::Backoff => self.step > Self::SPIN_LIMIT,
        }
    }

    /// Reset for next wait cycle.
    #[inline]
    pub fn reset(&mut self) {
        self.step = 0;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(WaitStrategy::default())
    }
}
