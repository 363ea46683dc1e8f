//! Biopotential front-end interface

use crate::ecg::{
    BiasClockConfig, BiozConfig, CalibrationConfig, EcgChannelConfig, HeartRateRecord,
    PaceConfig, RtoRConfig,
};
use crate::routing::RouteRegisters;

/// Register-level access to a MAX30001-class ECG / bioimpedance front end
///
/// Subsystem init methods take typed configs whose fields mirror the chip's
/// register fields one to one; the driver packs them.
pub trait BiopotentialFrontEnd {
    /// Transport or chip error
    type Error: core::fmt::Debug;

    /// Start the 32.768 kHz FCLK the chip derives all timing from
    fn start_master_clock(&mut self) -> Result<(), Self::Error>;

    /// Software reset; all registers return to power-on defaults
    fn software_reset(&mut self) -> Result<(), Self::Error>;

    /// Write `EN_INT` and `EN_INT2`
    fn write_interrupt_routes(&mut self, routes: RouteRegisters) -> Result<(), Self::Error>;

    /// Configure and start the calibration source
    fn init_calibration(&mut self, config: &CalibrationConfig) -> Result<(), Self::Error>;

    /// Configure and start the ECG channel
    fn init_ecg(&mut self, config: &EcgChannelConfig) -> Result<(), Self::Error>;

    /// Configure and start pace detection
    fn init_pace(&mut self, config: &PaceConfig) -> Result<(), Self::Error>;

    /// Configure and start the bioimpedance channel
    fn init_bioz(&mut self, config: &BiozConfig) -> Result<(), Self::Error>;

    /// Configure and start the R-to-R detector
    fn init_rtor(&mut self, config: &RtoRConfig) -> Result<(), Self::Error>;

    /// Configure lead bias and the master clock frequency selection
    fn init_bias_clock(&mut self, config: &BiasClockConfig) -> Result<(), Self::Error>;

    /// Gate the chip's interrupt outputs
    fn allow_interrupts(&mut self, allow: bool) -> Result<(), Self::Error>;

    /// Latest R-to-R record
    fn read_heart_rate(&mut self) -> Result<HeartRateRecord, Self::Error>;
}
