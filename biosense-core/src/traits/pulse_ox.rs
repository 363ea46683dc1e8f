//! Pulse-oximetry front-end interface

use crate::window::OpticalSample;

/// LED amplitude channels on the optical front end
///
/// Discriminants are the MAX30101 `LEDx_PA` register addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LedChannel {
    /// LED1, red (660 nm)
    Red = 0x0C,
    /// LED2, infrared (880 nm)
    Infrared = 0x0D,
    /// LED3, green (537 nm)
    Green = 0x0E,
    /// Proximity pilot
    Pilot = 0x10,
}

impl LedChannel {
    /// Register address for this channel's amplitude
    pub const fn register(self) -> u8 {
        self as u8
    }
}

/// Register-level access to a MAX30101-class optical front end
///
/// Configuration methods take the fully encoded register byte; see
/// [`crate::pulse_ox`] for the typed builders that produce them.
pub trait PulseOxFrontEnd {
    /// Transport or chip error
    type Error: core::fmt::Debug;

    /// Write `MODE_CONFIG` (also used for the soft reset bit)
    fn set_mode(&mut self, bits: u8) -> Result<(), Self::Error>;

    /// Write `FIFO_CONFIG`
    fn set_fifo_config(&mut self, bits: u8) -> Result<(), Self::Error>;

    /// Write `SPO2_CONFIG`
    fn set_spo2_config(&mut self, bits: u8) -> Result<(), Self::Error>;

    /// Write `INT_ENABLE_1` (high byte) and `INT_ENABLE_2` (low byte)
    fn enable_interrupts(&mut self, bits: u16) -> Result<(), Self::Error>;

    /// Write one LED pulse amplitude register
    fn set_led_amplitude(&mut self, channel: LedChannel, amplitude: u8) -> Result<(), Self::Error>;

    /// Pop the oldest paired sample from the chip FIFO
    fn read_fifo(&mut self) -> Result<OpticalSample, Self::Error>;
}

impl<T: PulseOxFrontEnd + ?Sized> PulseOxFrontEnd for &mut T {
    type Error = T::Error;

    fn set_mode(&mut self, bits: u8) -> Result<(), Self::Error> {
        (**self).set_mode(bits)
    }

    fn set_fifo_config(&mut self, bits: u8) -> Result<(), Self::Error> {
        (**self).set_fifo_config(bits)
    }

    fn set_spo2_config(&mut self, bits: u8) -> Result<(), Self::Error> {
        (**self).set_spo2_config(bits)
    }

    fn enable_interrupts(&mut self, bits: u16) -> Result<(), Self::Error> {
        (**self).enable_interrupts(bits)
    }

    fn set_led_amplitude(&mut self, channel: LedChannel, amplitude: u8) -> Result<(), Self::Error> {
        (**self).set_led_amplitude(channel, amplitude)
    }

    fn read_fifo(&mut self) -> Result<OpticalSample, Self::Error> {
        (**self).read_fifo()
    }
}
