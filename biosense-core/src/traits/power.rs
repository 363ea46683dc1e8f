//! Power-management IC interface

/// PMIC with a boosted high-voltage output rail (MAX14720-class)
pub trait PowerManager {
    /// Transport or chip error
    type Error: core::fmt::Debug;

    /// Probe and initialize the chip
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Switch the boost converter on or off
    fn set_boost_enabled(&mut self, enabled: bool) -> Result<(), Self::Error>;

    /// Program the boost target voltage in millivolts
    fn set_boost_voltage(&mut self, millivolts: u16) -> Result<(), Self::Error>;
}
