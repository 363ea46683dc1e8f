//! Monitor Configuration
//!
//! Everything [`HealthMonitor`](crate::monitor::HealthMonitor) needs, grouped
//! per subsystem. `Default` reproduces the shipped firmware settings; with the
//! `serde` feature a board can load overrides from JSON, and any field left
//! out keeps its default.
//!
//! ```rust
//! use biosense_core::config::MonitorConfig;
//!
//! let config = MonitorConfig::default();
//! assert_eq!(config.sampler.refresh_len, 100);
//! assert_eq!(config.power.boost_mv, 4500);
//! assert_eq!(config.pulse_ox.red_amplitude, 0x24);
//! ```

use crate::bringup::PowerConfig;
use crate::ecg::EcgConfig;
use crate::priority::PriorityPlan;
use crate::pulse_ox::PulseOxConfig;
use crate::sampler::SamplerConfig;

/// Complete monitor configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MonitorConfig {
    /// Window refresh and wait bounds
    pub sampler: SamplerConfig,
    /// Pulse-oximeter registers
    pub pulse_ox: PulseOxConfig,
    /// PMIC boost rail
    pub power: PowerConfig,
    /// Host interrupt priorities
    pub priorities: PriorityPlan,
    /// Biopotential front end and interrupt routing
    pub ecg: EcgConfig,
}

impl MonitorConfig {
    /// Replace the sampler settings
    pub fn with_sampler(mut self, sampler: SamplerConfig) -> Self {
        self.sampler = sampler;
        self
    }

    /// Replace the pulse-oximeter settings
    pub fn with_pulse_ox(mut self, pulse_ox: PulseOxConfig) -> Self {
        self.pulse_ox = pulse_ox;
        self
    }

    /// Replace the PMIC settings
    pub fn with_power(mut self, power: PowerConfig) -> Self {
        self.power = power;
        self
    }

    /// Replace the priority plan
    pub fn with_priorities(mut self, priorities: PriorityPlan) -> Self {
        self.priorities = priorities;
        self
    }

    /// Replace the biopotential settings
    pub fn with_ecg(mut self, ecg: EcgConfig) -> Self {
        self.ecg = ecg;
        self
    }
}
