//! Error Types for Acquisition and Bring-up
//!
//! ## Design Philosophy
//!
//! Errors here follow the same rules as the rest of the crate's embedded path:
//!
//! 1. **Small Size**: variants carry integers or the driver's own error, never
//!    formatted strings.
//! 2. **No Heap Allocation**: every payload is inline.
//! 3. **Copy where possible**: bring-up failures are `Copy` so they can be
//!    collected into a fixed-capacity report.
//!
//! ## Error Categories
//!
//! ### Acquisition
//! - `SamplerError::Transport`: FIFO read reported a bus or chip error
//! - `SamplerError::ReadyTimeout`: no sample-ready signal within the bound
//! - `SamplerError::Signal`: the ready signal itself could not be read
//! - `SamplerError::InvalidRefresh`: refresh length is zero or larger than
//!   the window
//!
//! ### Routing
//! - `RoutingError::ConflictingRoute`: one source assigned two destinations
//! - `RoutingError::Device`: the chip rejected the route map
//!
//! ### Priorities
//! - `PriorityError::Inversion`: a GPIO port would preempt the biopotential
//!   transport
//! - `PriorityError::Rejected`: the interrupt controller refused assignments
//!
//! ### Bring-up
//! - `StepFailure`: which step failed and why, collected into a
//!   [`BringUpReport`](crate::bringup::BringUpReport)
//!
//! ## Aggregate Status
//!
//! Bring-up callers that only want a single number use
//! [`BringUpReport::status_code`](crate::bringup::BringUpReport::status_code):
//! `0` on success, `-1` if the power stage failed, otherwise the count of
//! failed steps.

use thiserror_no_std::Error;

use crate::routing::{EventSource, InterruptLine};
use crate::traits::HostIrq;

/// Result type for sampler operations
pub type SamplerResult<T, E> = Result<T, SamplerError<E>>;

/// Result type for routing operations
pub type RoutingResult<T, E> = Result<T, RoutingError<E>>;

/// Result type for priority plan operations
pub type PriorityResult<T> = Result<T, PriorityError>;

/// Errors raised while filling or refreshing the sample window
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerError<E> {
    /// The FIFO read failed at the transport or chip level
    #[error("FIFO read failed: {0:?}")]
    Transport(E),

    /// No sample-ready assertion arrived within the configured bound
    #[error("Sample {index} not ready after {waited_ms} ms")]
    ReadyTimeout {
        /// Window slot that was waiting for data
        index: usize,
        /// Time spent waiting before giving up
        waited_ms: u64,
    },

    /// The sample-ready line could not be sampled
    #[error("Sample-ready signal fault")]
    Signal,

    /// The refresh length cannot produce a full window of new data
    #[error("Refresh of {refresh_len} samples invalid for a {capacity}-sample window")]
    InvalidRefresh {
        /// Configured refresh length
        refresh_len: usize,
        /// Window capacity
        capacity: usize,
    },
}

impl<E> SamplerError<E> {
    /// Classify for bring-up and diagnostics reporting
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::ReadyTimeout { .. } => ErrorKind::Timeout,
            Self::Signal => ErrorKind::Signal,
            Self::InvalidRefresh { .. } => ErrorKind::InvalidConfig,
        }
    }
}

/// Errors raised while building or applying an interrupt route map
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingError<E = core::convert::Infallible> {
    /// The same event source was assigned two different destinations
    #[error("Event source {event:?} routed twice")]
    ConflictingRoute {
        /// The source with conflicting assignments
        event: EventSource,
    },

    /// A host interrupt line could not be armed
    #[error("Host line {line:?} could not be armed")]
    HostLine {
        /// The line that failed
        line: InterruptLine,
    },

    /// The biopotential front end rejected the configuration
    #[error("Route map write failed: {0:?}")]
    Device(E),
}

impl<E> RoutingError<E> {
    /// Classify for bring-up and diagnostics reporting
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConflictingRoute { .. } => ErrorKind::ConflictingRoute,
            Self::HostLine { .. } => ErrorKind::HostInterrupt,
            Self::Device(_) => ErrorKind::RegisterWrite,
        }
    }
}

/// Errors raised while building or applying a host interrupt priority plan
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityError {
    /// A GPIO port would be as urgent as, or more urgent than, the
    /// biopotential transport
    #[error("{irq:?} at priority {priority} would preempt the transport at {transport_priority}")]
    Inversion {
        /// The offending interrupt
        irq: HostIrq,
        /// Its planned priority
        priority: u8,
        /// Planned priority of the biopotential transport
        transport_priority: u8,
    },

    /// The plan has no free entries
    #[error("Priority plan full")]
    PlanFull,

    /// The controller rejected one or more assignments
    #[error("{failed} priority assignments rejected")]
    Rejected {
        /// Number of rejected entries
        failed: usize,
    },
}

impl PriorityError {
    /// Classify for bring-up and diagnostics reporting
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Inversion { .. } | Self::PlanFull => ErrorKind::PriorityInversion,
            Self::Rejected { .. } => ErrorKind::HostInterrupt,
        }
    }
}

/// Coarse error classification
///
/// Device error types differ per chip, so bring-up reports keep only the class
/// and the step. The full device error is logged where it happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Power-management IC failed to initialize
    PowerStage,
    /// A configuration register write reported non-zero status
    RegisterWrite,
    /// FIFO or record read failed
    Transport,
    /// Waiting for a sample-ready signal timed out
    Timeout,
    /// Ready signal could not be read
    Signal,
    /// Interrupt priority plan would invert urgency
    PriorityInversion,
    /// Host interrupt controller rejected a request
    HostInterrupt,
    /// Route map was inconsistent
    ConflictingRoute,
    /// Configuration values out of range
    InvalidConfig,
}

/// Identity of a bring-up step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BringUpStep {
    /// PMIC initialization
    PowerInit,
    /// Boost rail enable
    BoostEnable,
    /// Boost rail target voltage
    BoostVoltage,
    /// Host interrupt priority assignment
    InterruptPriority,
    /// Pulse-oximeter soft reset
    PulseOxReset,
    /// Pulse-oximeter FIFO configuration
    PulseOxFifo,
    /// Pulse-oximeter SpO2 configuration
    PulseOxSpo2,
    /// Pulse-oximeter interrupt enables
    PulseOxInterrupts,
    /// Pulse-oximeter LED amplitude
    PulseOxLedAmplitude,
    /// Pulse-oximeter acquisition mode
    PulseOxMode,
    /// Biopotential master clock
    EcgMasterClock,
    /// Biopotential software reset
    EcgReset,
    /// Biopotential interrupt routing
    EcgRouting,
    /// Biopotential calibration subsystem
    EcgCalibration,
    /// ECG channel
    EcgChannel,
    /// Pace detection
    EcgPace,
    /// Bioimpedance channel
    EcgBioz,
    /// R-to-R detector
    EcgRtoR,
    /// Lead bias and master clock frequency
    EcgBiasClock,
    /// Chip-level interrupt enable
    EcgAllowInterrupts,
}

/// One failed bring-up step
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{step:?} failed: {kind:?}")]
pub struct StepFailure {
    /// Which step failed
    pub step: BringUpStep,
    /// Why it failed
    pub kind: ErrorKind,
}

impl StepFailure {
    /// Failure of `step` with the given classification
    pub const fn new(step: BringUpStep, kind: ErrorKind) -> Self {
        Self { step, kind }
    }
}

#[cfg(feature = "defmt")]
impl<E> defmt::Format for SamplerError<E> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Transport(_) => defmt::write!(fmt, "FIFO read failed"),
            Self::ReadyTimeout { index, waited_ms } =>
                defmt::write!(fmt, "Sample {} not ready after {} ms", index, waited_ms),
            Self::Signal => defmt::write!(fmt, "Sample-ready signal fault"),
            Self::InvalidRefresh { refresh_len, capacity } =>
                defmt::write!(fmt, "Refresh of {} invalid for window of {}", refresh_len, capacity),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StepFailure {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "step {} failed: kind {}", self.step as u8, self.kind as u8)
    }
}
