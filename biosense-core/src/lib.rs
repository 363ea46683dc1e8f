//! Acquisition core for biosense
//!
//! Windowed SpO2 / heart-rate sampling from a MAX30101-class pulse-oximeter,
//! interrupt routing for a MAX30001-class ECG / bioimpedance front end, and
//! the bring-up sequence that powers and configures both.
//!
//! Key constraints:
//! - No heap allocation anywhere in the acquisition path
//! - Chips are reached only through the traits in [`traits`]
//! - Bring-up never stops at the first failure; every step is reported
//!
//! ```no_run
//! use biosense_core::{MockTimeSource, OpticalSample, ReadyCounter, VitalSampler};
//! use biosense_core::traits::{EstimationResult, LedChannel, PulseOxFrontEnd};
//!
//! struct Fifo;
//!
//! impl PulseOxFrontEnd for Fifo {
//!     type Error = ();
//!     fn set_mode(&mut self, _: u8) -> Result<(), ()> { Ok(()) }
//!     fn set_fifo_config(&mut self, _: u8) -> Result<(), ()> { Ok(()) }
//!     fn set_spo2_config(&mut self, _: u8) -> Result<(), ()> { Ok(()) }
//!     fn enable_interrupts(&mut self, _: u16) -> Result<(), ()> { Ok(()) }
//!     fn set_led_amplitude(&mut self, _: LedChannel, _: u8) -> Result<(), ()> { Ok(()) }
//!     fn read_fifo(&mut self) -> Result<OpticalSample, ()> { Ok(OpticalSample::new(0, 0)) }
//! }
//!
//! static PPG_READY: ReadyCounter = ReadyCounter::new(32);
//!
//! let estimator = |_ir: &[u32], _red: &[u32]| EstimationResult::default();
//! let mut sampler = VitalSampler::new(Fifo, &PPG_READY, estimator, MockTimeSource::new(0));
//!
//! // Blocks for the first 500 ready indications, then one refresh
//! match sampler.read() {
//!     Ok(vitals) => {} // vitals.spo2, vitals.heart_rate
//!     Err(e) => {}     // transport fault or ready timeout
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(all(test, not(feature = "std")))]
extern crate std;

#[macro_use]
mod macros;

pub mod bringup;
pub mod config;
pub mod constants;
pub mod ecg;
pub mod errors;
pub mod monitor;
pub mod priority;
pub mod pulse_ox;
pub mod routing;
pub mod sampler;
pub mod signal;
pub mod time;
pub mod traits;
pub mod window;

// Public API
pub use bringup::{BringUpReport, PowerConfig};
pub use config::MonitorConfig;
pub use ecg::{EcgConfig, HeartRateRecord};
pub use errors::{
    BringUpStep, ErrorKind, PriorityError, RoutingError, SamplerError, SamplerResult, StepFailure,
};
pub use monitor::{Board, BoardParts, HealthMonitor, VitalSigns};
pub use priority::PriorityPlan;
pub use pulse_ox::PulseOxConfig;
pub use routing::{
    EventSource, InterruptLine, InterruptRouteMap, InterruptRouter, LineMode, LineModes, Route,
};
pub use sampler::{SamplerConfig, SamplerState, VitalSampler};
pub use signal::{LevelTriggered, ReadyCounter, ReadySignal};
pub use time::{MockTimeSource, TimeSource, Timestamp};
pub use window::{OpticalSample, SampleWindow};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
