//! Collaborator traits
//!
//! The acquisition core never touches a bus directly. Each chip and the host
//! interrupt controller sit behind a trait that a board crate implements on
//! top of its register driver:
//!
//! - [`PulseOxFrontEnd`]: MAX30101-class optical front end
//! - [`BiopotentialFrontEnd`]: MAX30001-class ECG / BioZ front end
//! - [`PowerManager`]: PMIC with a boosted output rail
//! - [`InterruptController`]: host NVIC plus GPIO edge configuration
//! - [`VitalsEstimator`]: the HR / SpO2 algorithm, treated as a pure function
//!
//! Every fallible operation returns the driver's own error type, which only
//! has to be `Debug` so it can be logged.

pub mod biopotential;
pub mod estimator;
pub mod host;
pub mod power;
pub mod pulse_ox;

pub use biopotential::BiopotentialFrontEnd;
pub use estimator::{EstimationResult, VitalsEstimator};
pub use host::{HostIrq, InterruptController};
pub use power::PowerManager;
pub use pulse_ox::{LedChannel, PulseOxFrontEnd};
