//! Bring-up Sequencing
//!
//! Power, host interrupt priorities and front-end configuration, in the order
//! the board needs them. Every step runs even if an earlier one failed; each
//! failure is recorded in a [`BringUpReport`] and the caller decides what to
//! do with it.
//!
//! ```text
//! init_power ──► apply_priorities ──► configure_pulse_ox
//!     │                                     reset ─ settle ─ FIFO ─ SpO2 ─ IRQ ─ LED1 ─ LED2 ─ mode
//!     └─ PMIC down: status -1, boost skipped, sequence continues
//!
//! init_ecg: clock ─ reset ─ routes ─ CAL ─ ECG ─ PACE ─ BIOZ ─ RTOR ─ bias/FMSTR ─ allow IRQ
//! ```

use core::fmt;

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::constants::power::{BOOST_TARGET_MV, POWER_STAGE_FAILURE_STATUS};
use crate::ecg::EcgConfig;
use crate::errors::{BringUpStep, ErrorKind, StepFailure};
use crate::priority::PriorityPlan;
use crate::pulse_ox::{ModeConfig, PulseOxConfig};
use crate::routing::InterruptRouter;
use crate::traits::{
    BiopotentialFrontEnd, InterruptController, LedChannel, PowerManager, PulseOxFrontEnd,
};

/// Failures a single report can hold
///
/// One more than the number of distinct steps, so a full sequence never
/// overflows.
pub const MAX_STEP_FAILURES: usize = 24;

/// Outcome of one or more bring-up sequences
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BringUpReport {
    failures: Vec<StepFailure, MAX_STEP_FAILURES>,
    power_failed: bool,
    dropped: usize,
}

impl BringUpReport {
    /// Empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed step
    pub fn record(&mut self, step: BringUpStep, kind: ErrorKind) {
        log_warn!("bring-up step {:?} failed: {:?}", step, kind);
        if step == BringUpStep::PowerInit {
            self.power_failed = true;
        }
        if self.failures.push(StepFailure::new(step, kind)).is_err() {
            self.dropped += 1;
        }
    }

    /// Record `result` against `step` if it failed
    pub fn check<E: fmt::Debug>(&mut self, step: BringUpStep, result: Result<(), E>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                log_warn!("{:?}: {:?}", step, e);
                self.record(step, ErrorKind::RegisterWrite);
                false
            }
        }
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: &BringUpReport) {
        for failure in &other.failures {
            if self.failures.push(*failure).is_err() {
                self.dropped += 1;
            }
        }
        self.power_failed |= other.power_failed;
        self.dropped += other.dropped;
    }

    /// Recorded failures in the order they happened
    pub fn failures(&self) -> &[StepFailure] {
        &self.failures
    }

    /// Whether `step` failed
    pub fn step_failed(&self, step: BringUpStep) -> bool {
        self.failures.iter().any(|f| f.step == step)
    }

    /// Number of failed steps, including any that did not fit
    pub fn error_count(&self) -> usize {
        self.failures.len() + self.dropped
    }

    /// Whether the PMIC failed to initialize
    pub fn power_failed(&self) -> bool {
        self.power_failed
    }

    /// No step failed
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// Single-number outcome
    ///
    /// `0` on success, `-1` if the PMIC failed to initialize, otherwise the
    /// number of failed steps.
    pub fn status_code(&self) -> i32 {
        if self.power_failed {
            POWER_STAGE_FAILURE_STATUS
        } else {
            i32::try_from(self.error_count()).unwrap_or(i32::MAX)
        }
    }

    /// `Ok` if nothing failed, otherwise the report itself
    pub fn into_result(self) -> Result<(), BringUpReport> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for BringUpReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bring-up status {} ({} failed steps)", self.status_code(), self.error_count())
    }
}

/// PMIC boost rail settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PowerConfig {
    /// Turn the boost converter on
    pub boost_enabled: bool,
    /// Boost target voltage (mV)
    pub boost_mv: u16,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self { boost_enabled: true, boost_mv: BOOST_TARGET_MV }
    }
}

/// Initialize the PMIC and program the boost rail
///
/// If the chip itself fails to initialize, the boost is left alone and the
/// report is marked as a power-stage failure.
pub fn init_power<P: PowerManager>(pmic: &mut P, config: &PowerConfig, report: &mut BringUpReport) {
    if let Err(e) = pmic.init() {
        log_warn!("PMIC init failed: {:?}", e);
        report.record(BringUpStep::PowerInit, ErrorKind::PowerStage);
        return;
    }

    report.check(BringUpStep::BoostEnable, pmic.set_boost_enabled(config.boost_enabled));
    if config.boost_enabled {
        report.check(BringUpStep::BoostVoltage, pmic.set_boost_voltage(config.boost_mv));
    }
    log_debug!("PMIC up, boost {} at {} mV", config.boost_enabled, config.boost_mv);
}

/// Write the host interrupt priority plan
pub fn apply_priorities<H: InterruptController>(
    host: &mut H,
    plan: &PriorityPlan,
    report: &mut BringUpReport,
) {
    if let Err(e) = plan.apply(host) {
        log_warn!("interrupt priorities: {}", e);
        report.record(BringUpStep::InterruptPriority, e.kind());
    }
}

/// Reset and configure the pulse-oximeter, finishing in acquisition mode
pub fn configure_pulse_ox<D, W>(
    device: &mut D,
    delay: &mut W,
    config: &PulseOxConfig,
    report: &mut BringUpReport,
) where
    D: PulseOxFrontEnd,
    W: DelayNs,
{
    report.check(BringUpStep::PulseOxReset, device.set_mode(ModeConfig::reset().bits()));
    delay.delay_ms(config.reset_settle_ms);

    report.check(BringUpStep::PulseOxFifo, device.set_fifo_config(config.fifo.bits()));
    report.check(BringUpStep::PulseOxSpo2, device.set_spo2_config(config.spo2.bits()));
    report.check(BringUpStep::PulseOxInterrupts, device.enable_interrupts(config.interrupts.bits()));
    report.check(
        BringUpStep::PulseOxLedAmplitude,
        device.set_led_amplitude(LedChannel::Red, config.red_amplitude),
    );
    report.check(
        BringUpStep::PulseOxLedAmplitude,
        device.set_led_amplitude(LedChannel::Infrared, config.ir_amplitude),
    );
    report.check(BringUpStep::PulseOxMode, device.set_mode(ModeConfig::run(config.mode).bits()));
}

/// Bring up the biopotential front end and its interrupt routing
pub fn init_ecg<D, H>(
    device: &mut D,
    host: &mut H,
    router: &mut InterruptRouter,
    config: &EcgConfig,
    report: &mut BringUpReport,
) where
    D: BiopotentialFrontEnd,
    H: InterruptController,
{
    report.check(BringUpStep::EcgMasterClock, device.start_master_clock());
    report.check(BringUpStep::EcgReset, device.software_reset());

    if let Err(e) = router.configure(device, host, config.routes, config.line_modes) {
        log_warn!("interrupt routing: {}", e);
        report.record(BringUpStep::EcgRouting, e.kind());
    }

    report.check(BringUpStep::EcgCalibration, device.init_calibration(&config.calibration));
    report.check(BringUpStep::EcgChannel, device.init_ecg(&config.channel));
    report.check(BringUpStep::EcgPace, device.init_pace(&config.pace));
    report.check(BringUpStep::EcgBioz, device.init_bioz(&config.bioz));
    report.check(BringUpStep::EcgRtoR, device.init_rtor(&config.rtor));
    report.check(BringUpStep::EcgBiasClock, device.init_bias_clock(&config.bias_clock));
    report.check(BringUpStep::EcgAllowInterrupts, device.allow_interrupts(true));
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pmic {
        init_ok: bool,
        boost_calls: u8,
    }

    impl PowerManager for Pmic {
        type Error = ();

        fn init(&mut self) -> Result<(), ()> {
            if self.init_ok { Ok(()) } else { Err(()) }
        }

        fn set_boost_enabled(&mut self, _: bool) -> Result<(), ()> {
            self.boost_calls += 1;
            Ok(())
        }

        fn set_boost_voltage(&mut self, _: u16) -> Result<(), ()> {
            self.boost_calls += 1;
            Ok(())
        }
    }

    #[test]
    fn status_code_scheme() {
        let mut report = BringUpReport::new();
        assert_eq!(report.status_code(), 0);

        report.record(BringUpStep::PulseOxFifo, ErrorKind::RegisterWrite);
        report.record(BringUpStep::PulseOxMode, ErrorKind::RegisterWrite);
        assert_eq!(report.status_code(), 2);

        report.record(BringUpStep::PowerInit, ErrorKind::PowerStage);
        assert_eq!(report.status_code(), -1);
        assert_eq!(report.error_count(), 3);
    }

    #[test]
    fn pmic_failure_skips_boost() {
        let mut pmic = Pmic { init_ok: false, boost_calls: 0 };
        let mut report = BringUpReport::new();

        init_power(&mut pmic, &PowerConfig::default(), &mut report);

        assert_eq!(pmic.boost_calls, 0);
        assert!(report.power_failed());
        assert_eq!(report.status_code(), -1);
    }

    #[test]
    fn healthy_pmic_programs_boost() {
        let mut pmic = Pmic { init_ok: true, boost_calls: 0 };
        let mut report = BringUpReport::new();

        init_power(&mut pmic, &PowerConfig::default(), &mut report);

        assert_eq!(pmic.boost_calls, 2);
        assert!(report.is_ok());
    }

    #[test]
    fn overflow_is_still_counted() {
        let mut report = BringUpReport::new();
        for _ in 0..MAX_STEP_FAILURES + 3 {
            report.record(BringUpStep::EcgPace, ErrorKind::RegisterWrite);
        }
        assert_eq!(report.failures().len(), MAX_STEP_FAILURES);
        assert_eq!(report.error_count(), MAX_STEP_FAILURES + 3);
    }

    #[test]
    fn merge_keeps_power_flag() {
        let mut a = BringUpReport::new();
        let mut b = BringUpReport::new();
        b.record(BringUpStep::PowerInit, ErrorKind::PowerStage);

        a.merge(&b);
        assert!(a.power_failed());
        assert!(a.step_failed(BringUpStep::PowerInit));
        assert!(a.clone().into_result().is_err());
    }
}
