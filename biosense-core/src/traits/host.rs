//! Host interrupt controller interface

use crate::routing::InterruptLine;

/// Host interrupt request sources whose priority bring-up assigns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HostIrq {
    /// GPIO port interrupt (one vector per port)
    GpioPort(u8),
    /// SPI peripheral interrupt
    Spi(u8),
}

/// Host-side interrupt control
///
/// Covers the NVIC priority table and the two GPIO pins wired to the
/// biopotential front end's interrupt outputs.
pub trait InterruptController {
    /// Controller error
    type Error: core::fmt::Debug;

    /// Assign a priority (lower number is more urgent)
    fn set_priority(&mut self, irq: HostIrq, priority: u8) -> Result<(), Self::Error>;

    /// Stop delivering interrupts from `line`
    fn mask(&mut self, line: InterruptLine);

    /// Resume delivering interrupts from `line`
    fn unmask(&mut self, line: InterruptLine);

    /// Configure `line` as a pulled-up input firing on the falling edge and
    /// install its handler. Called only while the line is masked.
    fn arm(&mut self, line: InterruptLine) -> Result<(), Self::Error>;
}
