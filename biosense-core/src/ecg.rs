//! Biopotential Front-End Configuration and Records
//!
//! Subsystem configurations for the MAX30001 and the heart-rate record it
//! reports. Field names follow the register fields in the datasheet; the
//! defaults are the settings the health-monitor firmware runs with
//! (ECG at 512 sps with R-to-R detection, BioZ at 64 sps, pace detection on,
//! 32.768 kHz master clock).

use crate::routing::{InterruptRouteMap, LineMode, LineModes};

/// Size of [`HeartRateRecord`] in bytes
pub const HEART_RATE_RECORD_LEN: usize = core::mem::size_of::<HeartRateRecord>();

/// Calibration source (`CNFG_CAL`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationConfig {
    /// `EN_VCAL`: calibration source enabled
    pub enable: u8,
    /// `VMODE`: bipolar (1) or unipolar (0)
    pub vmode: u8,
    /// `VMAG`: 0.5 mV (1) or 0.25 mV (0)
    pub vmag: u8,
    /// `FCAL`: calibration frequency select
    pub fcal: u8,
    /// `THIGH`: pulse high time
    pub thigh: u16,
    /// `FIFTY`: force 50% duty cycle
    pub fifty: u8,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self { enable: 0b1, vmode: 0b1, vmag: 0b1, fcal: 0b011, thigh: 0x7FF, fifty: 0b0 }
    }
}

/// ECG channel (`CNFG_ECG`, `CNFG_EMUX`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EcgChannelConfig {
    /// `EN_ECG`
    pub enable: u8,
    /// `OPENP`: isolate ECGP input
    pub open_p: u8,
    /// `OPENN`: isolate ECGN input
    pub open_n: u8,
    /// `POL`: invert input polarity
    pub polarity: u8,
    /// `CALP_SEL`: calibration routing to ECGP
    pub cal_p_sel: u8,
    /// `CALN_SEL`: calibration routing to ECGN
    pub cal_n_sel: u8,
    /// `EFIT`: FIFO interrupt threshold
    pub fifo_threshold: u8,
    /// `RATE`: sample rate select
    pub rate: u8,
    /// `GAIN`: channel gain select
    pub gain: u8,
    /// `DHPF`: digital high-pass filter
    pub dhpf: u8,
    /// `DLPF`: digital low-pass filter
    pub dlpf: u8,
}

impl Default for EcgChannelConfig {
    fn default() -> Self {
        Self {
            enable: 0b1,
            open_p: 0b1,
            open_n: 0b1,
            polarity: 0b0,
            cal_p_sel: 0b10,
            cal_n_sel: 0b11,
            fifo_threshold: 0x1F,
            rate: 0b00,
            gain: 0b00,
            dhpf: 0b0,
            dlpf: 0b01,
        }
    }
}

/// Pace detection (`CNFG_PACE`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaceConfig {
    /// `EN_PACE`
    pub enable: u8,
    /// `CLR_PEDGE`: clear-on-read behavior of `PEDGE`
    pub clear_edge: u8,
    /// `POL`: pace polarity
    pub polarity: u8,
    /// `GN_DIFF_OFF`: differentiator gain off
    pub gain_diff_off: u8,
    /// `GAIN`
    pub gain: u8,
    /// `AOUT_LBW`: analog output low bandwidth
    pub aout_lbw: u8,
    /// `AOUT`: analog output select
    pub aout: u8,
    /// `DACP`: positive threshold
    pub dac_p: u8,
    /// `DACN`: negative threshold
    pub dac_n: u8,
}

impl Default for PaceConfig {
    fn default() -> Self {
        Self {
            enable: 0b1,
            clear_edge: 0b0,
            polarity: 0b0,
            gain_diff_off: 0b1,
            gain: 0x0,
            aout_lbw: 0b0,
            aout: 0b00,
            dac_p: 0b0,
            dac_n: 0b0,
        }
    }
}

/// Bioimpedance channel (`CNFG_BIOZ`, `CNFG_BMUX`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BiozConfig {
    /// `EN_BIOZ`
    pub enable: u8,
    /// `OPENP`
    pub open_p: u8,
    /// `OPENN`
    pub open_n: u8,
    /// `CALP_SEL`
    pub cal_p_sel: u8,
    /// `CALN_SEL`
    pub cal_n_sel: u8,
    /// `CG_MODE`: current generator mode
    pub cg_mode: u8,
    /// `BFIT`: FIFO interrupt threshold
    pub fifo_threshold: u8,
    /// `RATE`
    pub rate: u8,
    /// `AHPF`: analog high-pass filter
    pub ahpf: u8,
    /// `EXT_RBIAS`: external bias resistor
    pub ext_rbias: u8,
    /// `GAIN`
    pub gain: u8,
    /// `DHPF`
    pub dhpf: u8,
    /// `DLPF`
    pub dlpf: u8,
    /// `FCGEN`: current generator frequency
    pub fcgen: u8,
    /// `CGMON`: current generator monitor
    pub cg_monitor: u8,
    /// `CGMAG`: current generator magnitude
    pub cg_magnitude: u8,
    /// `PHOFF`: demodulation phase offset
    pub phase_offset: u8,
}

impl Default for BiozConfig {
    fn default() -> Self {
        Self {
            enable: 0b1,
            open_p: 0b1,
            open_n: 0b1,
            cal_p_sel: 0b10,
            cal_n_sel: 0b11,
            cg_mode: 0b00,
            fifo_threshold: 7,
            rate: 0b0,
            ahpf: 0b010,
            ext_rbias: 0b0,
            gain: 0b10,
            dhpf: 0b00,
            dlpf: 0b00,
            fcgen: 2,
            cg_monitor: 0b0,
            cg_magnitude: 0b111,
            phase_offset: 0b0000,
        }
    }
}

/// R-to-R detector (`CNFG_RTOR1`, `CNFG_RTOR2`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RtoRConfig {
    /// `EN_RTOR`
    pub enable: u8,
    /// `WNDW`: averaging window width
    pub window: u8,
    /// `GAIN`: detector gain (0b1111 = auto)
    pub gain: u8,
    /// `PAVG`: peak averaging weight
    pub peak_avg: u8,
    /// `PTSF`: peak threshold scale factor
    pub peak_scale: u8,
    /// `HOFF`: hold-off interval
    pub hold_off: u8,
    /// `RAVG`: interval averaging weight
    pub interval_avg: u8,
    /// `RHSF`: hold-off scale factor
    pub hold_off_scale: u8,
    /// `CLR_RRINT`: RRINT clear behavior
    pub clear_rrint: u8,
}

impl Default for RtoRConfig {
    fn default() -> Self {
        Self {
            enable: 0b1,
            window: 0b0011,
            gain: 0b1111,
            peak_avg: 0b00,
            peak_scale: 0b0011,
            hold_off: 0b000001,
            interval_avg: 0b00,
            hold_off_scale: 0b000,
            clear_rrint: 0b01,
        }
    }
}

/// Lead bias and master clock frequency (`CNFG_GEN`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BiasClockConfig {
    /// `EN_RBIAS`: bias on ECG (01) or BioZ (10) inputs
    pub enable_rbias: u8,
    /// `RBIASV`: bias resistor value
    pub rbias_value: u8,
    /// `RBIASP`: bias the positive input
    pub rbias_p: u8,
    /// `RBIASN`: bias the negative input
    pub rbias_n: u8,
    /// `FMSTR`: master clock frequency select
    pub fmstr: u8,
}

impl Default for BiasClockConfig {
    fn default() -> Self {
        Self { enable_rbias: 0b01, rbias_value: 0b10, rbias_p: 0b1, rbias_n: 0b1, fmstr: 0b00 }
    }
}

/// Master clock frequency for an `FMSTR` code, in Hz
pub fn master_clock_hz(fmstr: u8) -> f32 {
    match fmstr & 0b11 {
        0b00 => 32_768.0,
        0b01 | 0b10 => 32_000.0,
        _ => 31_968.78,
    }
}

/// Everything written to the biopotential front end at bring-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EcgConfig {
    /// Interrupt routing
    pub routes: InterruptRouteMap,
    /// Output signaling modes
    ///
    /// Defaults to open-drain without the internal pull-up (`0b10`), one
    /// bit off the `0b11` that vendor drivers write for `ODNR`.
    pub line_modes: LineModes,
    /// Calibration source
    pub calibration: CalibrationConfig,
    /// ECG channel
    pub channel: EcgChannelConfig,
    /// Pace detection
    pub pace: PaceConfig,
    /// Bioimpedance channel
    pub bioz: BiozConfig,
    /// R-to-R detector
    pub rtor: RtoRConfig,
    /// Bias and master clock
    pub bias_clock: BiasClockConfig,
}

impl Default for EcgConfig {
    fn default() -> Self {
        Self {
            routes: InterruptRouteMap::firmware_default(),
            line_modes: LineModes::uniform(LineMode::OpenDrainNoPullup),
            calibration: CalibrationConfig::default(),
            channel: EcgChannelConfig::default(),
            pace: PaceConfig::default(),
            bioz: BiozConfig::default(),
            rtor: RtoRConfig::default(),
            bias_clock: BiasClockConfig::default(),
        }
    }
}

impl EcgConfig {
    /// Replace the route map
    pub fn with_routes(mut self, routes: InterruptRouteMap) -> Self {
        self.routes = routes;
        self
    }

    /// Replace the line modes
    pub fn with_line_modes(mut self, modes: LineModes) -> Self {
        self.line_modes = modes;
        self
    }
}

/// Latest heart-rate data from the R-to-R detector
///
/// `repr(C)` so the byte image handed to a BLE characteristic is two native
/// words, R-to-R first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct HeartRateRecord {
    /// R-to-R interval in detector ticks
    pub rtor: u32,
    /// `FMSTR` code the interval was measured with
    pub fmstr: u32,
}

impl HeartRateRecord {
    /// Native-layout byte image
    pub fn to_ne_bytes(&self) -> [u8; HEART_RATE_RECORD_LEN] {
        let mut out = [0u8; HEART_RATE_RECORD_LEN];
        out[..4].copy_from_slice(&self.rtor.to_ne_bytes());
        out[4..].copy_from_slice(&self.fmstr.to_ne_bytes());
        out
    }

    /// Interval in milliseconds; one tick is 256 master clock periods
    pub fn interval_ms(&self) -> Option<f32> {
        if self.rtor == 0 {
            return None;
        }
        Some(self.rtor as f32 * 256_000.0 / master_clock_hz(self.fmstr as u8))
    }

    /// Instantaneous heart rate
    pub fn heart_rate_bpm(&self) -> Option<f32> {
        self.interval_ms().map(|ms| 60_000.0 / ms)
    }
}
