//! Heart-rate / SpO2 estimator interface

/// Output of one estimator run
///
/// Validity flags are advisory. A result with both flags false is still a
/// result; it means the window did not contain a usable pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EstimationResult {
    /// Oxygen saturation, percent
    pub spo2: u32,
    /// `spo2` is trustworthy
    pub spo2_valid: bool,
    /// Heart rate, beats per minute
    pub heart_rate: u32,
    /// `heart_rate` is trustworthy
    pub heart_rate_valid: bool,
}

/// Pure, stateless HR / SpO2 estimator over a window of optical samples
///
/// `ir` and `red` always have the same length. Any closure with the matching
/// signature is an estimator.
pub trait VitalsEstimator {
    /// Estimate over the window
    fn estimate(&self, ir: &[u32], red: &[u32]) -> EstimationResult;
}

impl<F> VitalsEstimator for F
where
    F: Fn(&[u32], &[u32]) -> EstimationResult,
{
    fn estimate(&self, ir: &[u32], red: &[u32]) -> EstimationResult {
        self(ir, red)
    }
}
