//! Time management for acquisition timeouts
//!
//! The sampler only needs elapsed time to bound its sample-ready waits, so the
//! clock abstraction is a monotonic millisecond counter:
//! - Hardware tick counter (board crates implement [`TimeSource`])
//! - Mock source for tests, optionally auto-advancing on every read

use core::cell::Cell;

/// Timestamp in milliseconds since device boot
pub type Timestamp = u64;

/// Source of monotonic time
///
/// Implementations typically wrap a SysTick or RTC counter. `now()` must never
/// go backwards; wraparound is the implementation's problem.
pub trait TimeSource {
    /// Current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Milliseconds elapsed since `earlier`
    fn elapsed_since(&self, earlier: Timestamp) -> u64 {
        self.now().saturating_sub(earlier)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Controllable time source for tests
///
/// With a non-zero step, every call to `now()` advances the clock by `step`
/// milliseconds, which lets a polling loop observe time passing without a
/// real timer.
#[derive(Debug, Clone, Default)]
pub struct MockTimeSource {
    timestamp: Cell<Timestamp>,
    step: Timestamp,
}

impl MockTimeSource {
    /// Clock frozen at `start` until advanced
    pub fn new(start: Timestamp) -> Self {
        Self {
            timestamp: Cell::new(start),
            step: 0,
        }
    }

    /// Clock that advances by `step` ms on every read
    pub fn stepping(start: Timestamp, step: Timestamp) -> Self {
        Self {
            timestamp: Cell::new(start),
            step,
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.set(timestamp);
    }

    /// Advance by `ms` milliseconds
    pub fn advance(&self, ms: u64) {
        self.timestamp.set(self.timestamp.get().saturating_add(ms));
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        let now = self.timestamp.get();
        self.timestamp.set(now.saturating_add(self.step));
        now
    }
}

/// System clock measured from first use (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct SystemTime {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemTime {
    /// Start counting from now
    pub fn new() -> Self {
        Self { origin: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for SystemTime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        self.origin.elapsed().as_millis() as Timestamp
    }
}
