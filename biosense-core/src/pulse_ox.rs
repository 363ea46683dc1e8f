//! Pulse-Oximeter Register Configuration
//!
//! Typed views of the MAX30101 configuration registers written at bring-up.
//! Each type encodes to the exact register byte handed to
//! [`PulseOxFrontEnd`](crate::traits::PulseOxFrontEnd).
//!
//! ```text
//! MODE_CONFIG (0x09)   SHDN[7]  RESET[6]  MODE[2:0]
//! FIFO_CONFIG (0x08)   SMP_AVE[7:5]  FIFO_ROLLOVER_EN[4]  FIFO_A_FULL[3:0]
//! SPO2_CONFIG (0x0A)   SPO2_ADC_RGE[6:5]  SPO2_SR[4:2]  LED_PW[1:0]
//! INT_ENABLE_1 (0x02)  A_FULL_EN[7]  PPG_RDY_EN[6]  ALC_OVF_EN[5]
//! INT_ENABLE_2 (0x03)  DIE_TEMP_RDY_EN[1]
//! ```

use crate::constants::acquisition::{
    FIFO_ALMOST_FULL_SAMPLES, LED_AMPLITUDE, PULSE_OX_FIFO_DEPTH, PULSE_OX_RESET_SETTLE_MS,
};

/// Acquisition mode (`MODE[2:0]`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum LedMode {
    /// Red LED only
    HeartRate = 0b010,
    /// Red and infrared
    Spo2 = 0b011,
    /// Time-slotted multi-LED
    MultiLed = 0b111,
}

/// `MODE_CONFIG` contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeConfig {
    /// Enter power-save mode
    pub shutdown: bool,
    /// Trigger a soft reset
    pub reset: bool,
    /// Acquisition mode
    pub mode: Option<LedMode>,
}

impl ModeConfig {
    /// Soft reset request, all other bits clear
    pub const fn reset() -> Self {
        Self { shutdown: false, reset: true, mode: None }
    }

    /// Running in `mode`
    pub const fn run(mode: LedMode) -> Self {
        Self { shutdown: false, reset: false, mode: Some(mode) }
    }

    /// Register byte
    pub const fn bits(self) -> u8 {
        let mode = match self.mode {
            Some(m) => m as u8,
            None => 0,
        };
        ((self.shutdown as u8) << 7) | ((self.reset as u8) << 6) | (mode & 0b111)
    }
}

/// Samples averaged into one FIFO entry (`SMP_AVE`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SampleAverage {
    /// No averaging
    None = 0b000,
    /// 2 samples
    Avg2 = 0b001,
    /// 4 samples
    Avg4 = 0b010,
    /// 8 samples
    Avg8 = 0b011,
    /// 16 samples
    Avg16 = 0b100,
    /// 32 samples
    Avg32 = 0b101,
}

/// `FIFO_CONFIG` contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FifoConfig {
    /// On-chip averaging
    pub sample_average: SampleAverage,
    /// Overwrite old samples when full
    pub rollover: bool,
    /// Queued samples that raise the almost-full interrupt
    ///
    /// Clamped to 17..=32; the register can only express 0..=15 free slots.
    pub almost_full_samples: u8,
}

impl FifoConfig {
    /// Register byte
    pub fn bits(&self) -> u8 {
        let queued = self
            .almost_full_samples
            .clamp(PULSE_OX_FIFO_DEPTH - 15, PULSE_OX_FIFO_DEPTH);
        let free_slots = PULSE_OX_FIFO_DEPTH - queued;
        ((self.sample_average as u8) << 5) | ((self.rollover as u8) << 4) | (free_slots & 0x0F)
    }
}

impl Default for FifoConfig {
    fn default() -> Self {
        Self {
            sample_average: SampleAverage::Avg2,
            rollover: false,
            almost_full_samples: FIFO_ALMOST_FULL_SAMPLES,
        }
    }
}

/// ADC full-scale range (`SPO2_ADC_RGE`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum AdcRange {
    /// 2048 nA
    Na2048 = 0b00,
    /// 4096 nA
    Na4096 = 0b01,
    /// 8192 nA
    Na8192 = 0b10,
    /// 16384 nA
    Na16384 = 0b11,
}

/// Sample rate (`SPO2_SR`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SampleRate {
    /// 50 sps
    Sps50 = 0b000,
    /// 100 sps
    Sps100 = 0b001,
    /// 200 sps
    Sps200 = 0b010,
    /// 400 sps
    Sps400 = 0b011,
    /// 800 sps
    Sps800 = 0b100,
    /// 1000 sps
    Sps1000 = 0b101,
    /// 1600 sps
    Sps1600 = 0b110,
    /// 3200 sps
    Sps3200 = 0b111,
}

impl SampleRate {
    /// Samples per second
    pub const fn hz(self) -> u16 {
        match self {
            Self::Sps50 => 50,
            Self::Sps100 => 100,
            Self::Sps200 => 200,
            Self::Sps400 => 400,
            Self::Sps800 => 800,
            Self::Sps1000 => 1000,
            Self::Sps1600 => 1600,
            Self::Sps3200 => 3200,
        }
    }
}

/// LED pulse width and ADC resolution (`LED_PW`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PulseWidth {
    /// 69 µs, 15-bit
    Us69 = 0b00,
    /// 118 µs, 16-bit
    Us118 = 0b01,
    /// 215 µs, 17-bit
    Us215 = 0b10,
    /// 411 µs, 18-bit
    Us411 = 0b11,
}

/// `SPO2_CONFIG` contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spo2Config {
    /// ADC full-scale range
    pub adc_range: AdcRange,
    /// Sample rate
    pub sample_rate: SampleRate,
    /// LED pulse width
    pub pulse_width: PulseWidth,
}

impl Spo2Config {
    /// Register byte
    pub const fn bits(&self) -> u8 {
        ((self.adc_range as u8) << 5) | ((self.sample_rate as u8) << 2) | (self.pulse_width as u8)
    }
}

impl Default for Spo2Config {
    fn default() -> Self {
        Self {
            adc_range: AdcRange::Na4096,
            sample_rate: SampleRate::Sps100,
            pulse_width: PulseWidth::Us411,
        }
    }
}

/// `INT_ENABLE_1` / `INT_ENABLE_2` contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterruptEnables {
    /// FIFO almost full
    pub almost_full: bool,
    /// New sample in FIFO
    pub ppg_ready: bool,
    /// Ambient light cancellation overflow
    pub ambient_overflow: bool,
    /// Die temperature conversion done
    pub die_temp_ready: bool,
}

impl InterruptEnables {
    /// `INT_ENABLE_1` in the high byte, `INT_ENABLE_2` in the low byte
    pub const fn bits(&self) -> u16 {
        let en1 = ((self.almost_full as u8) << 7)
            | ((self.ppg_ready as u8) << 6)
            | ((self.ambient_overflow as u8) << 5);
        let en2 = (self.die_temp_ready as u8) << 1;
        ((en1 as u16) << 8) | en2 as u16
    }
}

impl Default for InterruptEnables {
    fn default() -> Self {
        Self {
            almost_full: true,
            ppg_ready: true,
            ambient_overflow: false,
            die_temp_ready: false,
        }
    }
}

/// Everything written to the pulse-oximeter at bring-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PulseOxConfig {
    /// Delay after soft reset before the next write (ms)
    pub reset_settle_ms: u32,
    /// FIFO setup
    pub fifo: FifoConfig,
    /// Sample rate, pulse width, ADC range
    pub spo2: Spo2Config,
    /// Interrupt enables
    pub interrupts: InterruptEnables,
    /// Red LED amplitude
    pub red_amplitude: u8,
    /// Infrared LED amplitude
    pub ir_amplitude: u8,
    /// Mode entered last, which starts acquisition
    pub mode: LedMode,
}

impl Default for PulseOxConfig {
    fn default() -> Self {
        Self {
            reset_settle_ms: PULSE_OX_RESET_SETTLE_MS,
            fifo: FifoConfig::default(),
            spo2: Spo2Config::default(),
            interrupts: InterruptEnables::default(),
            red_amplitude: LED_AMPLITUDE,
            ir_amplitude: LED_AMPLITUDE,
            mode: LedMode::Spo2,
        }
    }
}

impl PulseOxConfig {
    /// Same amplitude on both LEDs
    pub fn with_led_amplitude(mut self, amplitude: u8) -> Self {
        self.red_amplitude = amplitude;
        self.ir_amplitude = amplitude;
        self
    }

    /// Replace the SpO2 register settings
    pub fn with_spo2(mut self, spo2: Spo2Config) -> Self {
        self.spo2 = spo2;
        self
    }
}
