//! Power-Management Constants

/// Target voltage of the boosted HVOUT rail (millivolts).
///
/// Drives the pulse-oximeter LED supply. The MAX14720 boost range is
/// 2.5 V to 5.0 V in 100 mV steps.
pub const BOOST_TARGET_MV: u16 = 4500;

/// Aggregate bring-up status when the PMIC itself fails to initialize.
pub const POWER_STAGE_FAILURE_STATUS: i32 = -1;
