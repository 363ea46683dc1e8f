//! Acquisition Constants
//!
//! Window geometry for the SpO2 sampler and the MAX30101 settings applied at
//! bring-up. Register field encodings follow the MAX30101 datasheet
//! (rev 3, tables 1-11).

// ===== WINDOW GEOMETRY =====

/// Optical sample rate (samples per second).
///
/// Matches the `SPO2_SR` setting programmed at bring-up.
pub const SAMPLE_RATE_HZ: usize = 100;

/// Seconds of signal held in the estimation window.
pub const WINDOW_SECONDS: usize = 5;

/// Number of paired (red, ir) samples in the estimation window.
///
/// 5 seconds at 100 sps. The estimator needs several full pulse periods to
/// resolve heart rates down to ~40 bpm.
pub const WINDOW_CAPACITY: usize = SAMPLE_RATE_HZ * WINDOW_SECONDS;

/// Samples replaced on every refresh (one second of new signal).
pub const REFRESH_LEN: usize = SAMPLE_RATE_HZ;

const _: () = assert!(REFRESH_LEN <= WINDOW_CAPACITY, "refresh cannot exceed window");

// ===== TIMING =====

/// Default bound on a single sample-ready wait (milliseconds).
///
/// At 100 sps a sample is due every 10 ms. One full second without a
/// sample means the front end stopped converting or the ready line is stuck.
pub const DEFAULT_READY_TIMEOUT_MS: u64 = 1000;

/// Settle time after a MAX30101 soft reset before touching registers (ms).
pub const PULSE_OX_RESET_SETTLE_MS: u32 = 100;

// ===== MAX30101 SETTINGS =====

/// Depth of the MAX30101 sample FIFO.
pub const PULSE_OX_FIFO_DEPTH: u8 = 32;

/// Queued samples that trigger the FIFO almost-full interrupt.
///
/// The chip encodes this as the number of free slots left (`FIFO_A_FULL`),
/// so 17 queued samples is programmed as 32 - 17 = 15.
///
/// Older board firmware stored 17 straight into the 4-bit field, which the
/// chip truncates to `1` (interrupt at 31 queued samples). This crate writes
/// the free-slot count `15` instead, so the almost-full interrupt fires at 17.
pub const FIFO_ALMOST_FULL_SAMPLES: u8 = 17;

/// `SMP_AVE` code: 2 samples averaged per FIFO entry.
pub const SAMPLE_AVERAGE_CODE: u8 = 0b001;

/// `LED_PW` code: 411 µs pulse width, 18-bit ADC resolution.
pub const LED_PULSE_WIDTH_CODE: u8 = 0b11;

/// `SPO2_SR` code: 100 samples per second.
pub const SPO2_SAMPLE_RATE_CODE: u8 = 0b001;

/// `SPO2_ADC_RGE` code: 4096 nA full scale.
pub const SPO2_ADC_RANGE_CODE: u8 = 0b01;

/// LED pulse amplitude for both channels (~7 mA at 0.2 mA/LSB).
pub const LED_AMPLITUDE: u8 = 0x24;

/// `MODE` code for SpO2 acquisition (red + ir LEDs).
pub const SPO2_MODE_CODE: u8 = 0b011;
