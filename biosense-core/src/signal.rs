//! Sample-Ready Signals
//!
//! The pulse-oximeter pulls its interrupt line low whenever a new sample is in
//! its FIFO. The sampler consumes exactly one sample per ready indication, so
//! whatever stands between the pin and the sampler must deliver indications
//! in arrival order and must not lose any.
//!
//! Two sources are provided:
//!
//! - [`LevelTriggered`]: polls an active-low pin. Every poll that finds the
//!   line asserted counts as one indication. The line stays low while the chip
//!   FIFO is non-empty, so a sample is never skipped, only picked up late.
//! - [`ReadyCounter`]: counts edges delivered by an interrupt handler. The ISR
//!   calls [`ReadyCounter::notify`]; the sampler takes one count per sample.
//!
//! Both report through `nb`: `Err(nb::Error::WouldBlock)` while nothing is
//! pending.
//!
//! ```rust
//! use biosense_core::signal::{ReadyCounter, ReadySignal};
//!
//! static PPG_READY: ReadyCounter = ReadyCounter::new(32);
//!
//! // GPIO interrupt handler
//! fn on_ppg_falling_edge() {
//!     PPG_READY.notify();
//! }
//!
//! on_ppg_falling_edge();
//! let mut ready = &PPG_READY;
//! assert!(ready.poll_ready().is_ok());
//! assert!(ready.poll_ready().is_err());
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use embedded_hal::digital::InputPin;

/// Source of sample-ready indications
pub trait ReadySignal {
    /// Error reading the signal
    type Error: core::fmt::Debug;

    /// Consume one pending indication
    ///
    /// - `Ok(())`: a sample is ready; exactly one FIFO read may follow
    /// - `Err(nb::Error::WouldBlock)`: nothing pending yet
    /// - `Err(nb::Error::Other(e))`: the signal could not be read
    fn poll_ready(&mut self) -> nb::Result<(), Self::Error>;
}

impl<T: ReadySignal + ?Sized> ReadySignal for &mut T {
    type Error = T::Error;

    fn poll_ready(&mut self) -> nb::Result<(), Self::Error> {
        (**self).poll_ready()
    }
}

/// Active-low, level-sensed ready pin
#[derive(Debug)]
pub struct LevelTriggered<P> {
    pin: P,
}

impl<P: InputPin> LevelTriggered<P> {
    /// Wrap the interrupt input pin
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Give the pin back
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: InputPin> ReadySignal for LevelTriggered<P> {
    type Error = P::Error;

    fn poll_ready(&mut self) -> nb::Result<(), Self::Error> {
        if self.pin.is_low()? {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

/// Interrupt-fed counter of pending ready indications
///
/// Single producer (the ISR) and single consumer (the sampler). The count is
/// capped at `capacity`, the depth of the chip FIFO: an edge beyond that
/// cannot correspond to a sample the chip still holds, so it is recorded as
/// an overrun instead of being queued.
#[derive(Debug)]
pub struct ReadyCounter {
    pending: AtomicU32,
    overruns: AtomicU32,
    capacity: u32,
}

impl ReadyCounter {
    /// Counter for a FIFO `capacity` samples deep
    pub const fn new(capacity: u32) -> Self {
        Self {
            pending: AtomicU32::new(0),
            overruns: AtomicU32::new(0),
            capacity,
        }
    }

    /// Record one ready edge; call from the interrupt handler
    ///
    /// Returns `false` if the edge was dropped as an overrun.
    pub fn notify(&self) -> bool {
        let queued = self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.capacity).then_some(n + 1)
            })
            .is_ok();
        if !queued {
            self.overruns.fetch_add(1, Ordering::Relaxed);
        }
        queued
    }

    /// Take one pending indication, if any
    pub fn take(&self) -> bool {
        self.pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Indications not yet consumed
    pub fn pending(&self) -> u32 {
        self.pending.load(Ordering::Acquire)
    }

    /// Edges dropped because the counter was at capacity
    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }

    /// Drop pending indications and clear the overrun count
    pub fn reset(&self) {
        self.pending.store(0, Ordering::Release);
        self.overruns.store(0, Ordering::Relaxed);
    }
}

impl ReadySignal for &ReadyCounter {
    type Error = core::convert::Infallible;

    fn poll_ready(&mut self) -> nb::Result<(), Self::Error> {
        if self.take() {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

impl ReadySignal for ReadyCounter {
    type Error = core::convert::Infallible;

    fn poll_ready(&mut self) -> nb::Result<(), Self::Error> {
        let mut this: &ReadyCounter = self;
        this.poll_ready()
    }
}
