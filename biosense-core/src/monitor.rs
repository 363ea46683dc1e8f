//! Health Monitor Facade
//!
//! [`HealthMonitor`] ties the sampler, the bring-up sequence and interrupt
//! routing to one board. A board supplies its peripherals once, through
//! [`Board`] and [`BoardParts`], and the monitor owns them from then on.
//!
//! ```text
//!  init()      ─► PMIC ─► NVIC priorities ─► pulse-ox registers   ─► BringUpReport
//!  init_ecg()  ─► biopotential clock/reset/routes/subsystems      ─► BringUpReport
//!  read_spo2() ─► VitalSampler::read                              ─► VitalSigns
//!  read_ecg()  ─► heart-rate record                               ─► 8 bytes
//! ```

use embedded_hal::delay::DelayNs;

use crate::bringup::{self, BringUpReport};
use crate::config::MonitorConfig;
use crate::ecg::{HeartRateRecord, HEART_RATE_RECORD_LEN};
use crate::errors::SamplerResult;
use crate::routing::{EventSource, InterruptLine, InterruptRouter};
use crate::sampler::VitalSampler;
use crate::signal::ReadySignal;
use crate::time::TimeSource;
use crate::traits::{
    BiopotentialFrontEnd, EstimationResult, InterruptController, PowerManager, PulseOxFrontEnd,
    VitalsEstimator,
};

/// Peripheral types of one board
pub trait Board {
    /// PMIC
    type Power: PowerManager;
    /// Optical front end
    type PulseOx: PulseOxFrontEnd;
    /// ECG / bioimpedance front end
    type Biopotential: BiopotentialFrontEnd;
    /// Host interrupt controller
    type Host: InterruptController;
    /// Optical sample-ready signal
    type Ready: ReadySignal;
    /// Blocking delay
    type Delay: DelayNs;
    /// Millisecond clock
    type Clock: TimeSource;
}

/// Peripheral instances handed to [`HealthMonitor::new`]
pub struct BoardParts<B: Board> {
    /// PMIC
    pub power: B::Power,
    /// Optical front end
    pub pulse_ox: B::PulseOx,
    /// ECG / bioimpedance front end
    pub biopotential: B::Biopotential,
    /// Host interrupt controller
    pub host: B::Host,
    /// Optical sample-ready signal
    pub ready: B::Ready,
    /// Blocking delay
    pub delay: B::Delay,
    /// Millisecond clock
    pub clock: B::Clock,
}

/// Latest oxygen saturation and heart rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VitalSigns {
    /// SpO2 percentage
    pub spo2: u32,
    /// Beats per minute
    pub heart_rate: u32,
}

impl From<EstimationResult> for VitalSigns {
    fn from(result: EstimationResult) -> Self {
        Self { spo2: result.spo2, heart_rate: result.heart_rate }
    }
}

type PulseOxError<B> = <<B as Board>::PulseOx as PulseOxFrontEnd>::Error;
type BiopotentialError<B> = <<B as Board>::Biopotential as BiopotentialFrontEnd>::Error;

/// Pulse-ox / ECG acquisition for one board
pub struct HealthMonitor<B: Board, V> {
    power: B::Power,
    biopotential: B::Biopotential,
    host: B::Host,
    delay: B::Delay,
    sampler: VitalSampler<B::PulseOx, B::Ready, V, B::Clock>,
    router: InterruptRouter,
    config: MonitorConfig,
}

impl<B: Board, V: VitalsEstimator> HealthMonitor<B, V> {
    /// Take ownership of the board peripherals
    pub fn new(parts: BoardParts<B>, estimator: V, config: MonitorConfig) -> Self {
        let sampler = VitalSampler::new(parts.pulse_ox, parts.ready, estimator, parts.clock)
            .with_config(config.sampler);
        Self {
            power: parts.power,
            biopotential: parts.biopotential,
            host: parts.host,
            delay: parts.delay,
            sampler,
            router: InterruptRouter::new(),
            config,
        }
    }

    /// PMIC, host interrupt priorities and the pulse-oximeter
    pub fn init(&mut self) -> BringUpReport {
        let mut report = BringUpReport::new();
        bringup::init_power(&mut self.power, &self.config.power, &mut report);
        bringup::apply_priorities(&mut self.host, &self.config.priorities, &mut report);
        bringup::configure_pulse_ox(
            self.sampler.device_mut(),
            &mut self.delay,
            &self.config.pulse_ox,
            &mut report,
        );
        log_info!("init: {}", report);
        report
    }

    /// Biopotential front end and its interrupt routing
    pub fn init_ecg(&mut self) -> BringUpReport {
        let mut report = BringUpReport::new();
        bringup::init_ecg(
            &mut self.biopotential,
            &mut self.host,
            &mut self.router,
            &self.config.ecg,
            &mut report,
        );
        log_info!("init_ecg: {}", report);
        report
    }

    /// Refresh the optical window and return SpO2 and heart rate
    ///
    /// The first call blocks for a full window (about 5 s), later calls for
    /// one refresh (about 1 s).
    pub fn read_spo2(&mut self) -> SamplerResult<VitalSigns, PulseOxError<B>> {
        self.sampler.read().map(VitalSigns::from)
    }

    /// Latest heart-rate record from the biopotential front end
    pub fn heart_rate_record(&mut self) -> Result<HeartRateRecord, BiopotentialError<B>> {
        self.biopotential.read_heart_rate()
    }

    /// Copy the latest heart-rate record into `out` in native byte order
    ///
    /// Returns the number of bytes written, always the record size.
    pub fn read_ecg(
        &mut self,
        out: &mut [u8; HEART_RATE_RECORD_LEN],
    ) -> Result<usize, BiopotentialError<B>> {
        let record = self.heart_rate_record()?;
        *out = record.to_ne_bytes();
        Ok(HEART_RATE_RECORD_LEN)
    }

    /// Route an asserted biopotential line to its event handlers
    pub fn dispatch<F>(&self, line: InterruptLine, status: u32, handler: F) -> usize
    where
        F: FnMut(EventSource),
    {
        self.router.dispatch(line, status, handler)
    }

    /// The optical sampler
    pub fn sampler(&self) -> &VitalSampler<B::PulseOx, B::Ready, V, B::Clock> {
        &self.sampler
    }

    /// Interrupt routing state
    pub fn router(&self) -> &InterruptRouter {
        &self.router
    }

    /// Configuration in use
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Host interrupt controller
    pub fn host_mut(&mut self) -> &mut B::Host {
        &mut self.host
    }

    /// Biopotential front end
    pub fn biopotential_mut(&mut self) -> &mut B::Biopotential {
        &mut self.biopotential
    }
}
