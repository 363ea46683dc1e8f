//! Constants for biosense Core
//!
//! Centralized firmware constants for the acquisition path. Every numeric value
//! that reaches a register or sizes a buffer is defined here with a note on
//! where it comes from.
//!
//! ## Organization
//!
//! - **Acquisition**: sample window geometry and pulse-oximeter register settings
//! - **Interrupts**: host interrupt priorities and line assignments
//! - **Power**: PMIC boost rail settings

/// Sample window geometry and pulse-oximetry front-end settings.
pub mod acquisition;

/// Host interrupt priorities for the acquisition front ends.
pub mod interrupts;

/// Power-management IC settings.
pub mod power;

pub use acquisition::{
    REFRESH_LEN, SAMPLE_RATE_HZ, WINDOW_CAPACITY, WINDOW_SECONDS,
    DEFAULT_READY_TIMEOUT_MS, PULSE_OX_RESET_SETTLE_MS,
};

pub use interrupts::{BIOPOTENTIAL_TRANSPORT_PRIORITY, GPIO_PORT_COUNT, GPIO_PORT_PRIORITY};

pub use power::{BOOST_TARGET_MV, POWER_STAGE_FAILURE_STATUS};
