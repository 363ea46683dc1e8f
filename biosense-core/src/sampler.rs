//! Windowed Vital-Sign Sampler
//!
//! ## Overview
//!
//! [`VitalSampler`] keeps a 5-second window of paired red/infrared samples
//! from the pulse-oximeter FIFO and re-runs the HR / SpO2 estimator over it
//! once per second of new data.
//!
//! ```text
//!            ready ─┐                      ┌──────────── window (500) ───────────┐
//!  PPG FIFO ────────┴─► read_fifo() ─push─►│ oldest ............ newest          │
//!                                          └──────────────┬──────────────────────┘
//!                                                         └─► estimator ─► EstimationResult
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized ──first read()──► Priming ──500 samples + estimate──► Steady
//!       ▲                            │
//!       └──────── wait/read error ───┘
//! ```
//!
//! Once `Steady`, the sampler never primes again. Every `read()` slides out
//! the oldest 100 samples, drains 100 new ones, and re-estimates.
//!
//! ## Ordering
//!
//! One FIFO read follows each ready indication, in the order the indications
//! arrive. The window is filled strictly from the tail, so slot order equals
//! arrival order.
//!
//! ## Interrupted Refills
//!
//! If a refill stops early (transport error or timeout), the window is left
//! holding the retained samples plus however many new ones arrived. The next
//! `read()` sees a window that is not full, skips the slide, and tops it up.
//! The window is therefore always a gapless run of the most recent samples.

use crate::constants::acquisition::{DEFAULT_READY_TIMEOUT_MS, REFRESH_LEN, WINDOW_CAPACITY};
use crate::errors::{SamplerError, SamplerResult};
use crate::signal::ReadySignal;
use crate::time::TimeSource;
use crate::traits::{EstimationResult, PulseOxFrontEnd, VitalsEstimator};
use crate::window::SampleWindow;

/// Sampler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplerState {
    /// Window never filled
    #[default]
    Uninitialized,
    /// Initial fill in progress
    Priming,
    /// Window full and estimated at least once
    Steady,
}

/// Sampler tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SamplerConfig {
    /// Samples replaced per refresh
    pub refresh_len: usize,
    /// Bound on each sample-ready wait; `None` waits forever
    pub ready_timeout_ms: Option<u64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            refresh_len: REFRESH_LEN,
            ready_timeout_ms: Some(DEFAULT_READY_TIMEOUT_MS),
        }
    }
}

impl SamplerConfig {
    /// Set the refresh length
    pub fn with_refresh_len(mut self, refresh_len: usize) -> Self {
        self.refresh_len = refresh_len;
        self
    }

    /// Set the ready timeout
    pub fn with_ready_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.ready_timeout_ms = timeout_ms;
        self
    }

    /// Check the refresh length against a window of `capacity` samples
    ///
    /// A refresh must replace at least one sample and at most the whole
    /// window.
    pub fn validate<E>(&self, capacity: usize) -> SamplerResult<(), E> {
        if self.refresh_len == 0 || self.refresh_len > capacity {
            return Err(SamplerError::InvalidRefresh {
                refresh_len: self.refresh_len,
                capacity,
            });
        }
        Ok(())
    }
}

/// Sliding-window HR / SpO2 sampler
///
/// Owns the optical front end, its ready signal, the estimator and a clock
/// for wait timeouts. `N` is the window capacity.
pub struct VitalSampler<D, S, V, T, const N: usize = WINDOW_CAPACITY> {
    device: D,
    ready: S,
    estimator: V,
    clock: T,
    window: SampleWindow<N>,
    state: SamplerState,
    latest: Option<EstimationResult>,
    config: SamplerConfig,
    refreshes: u32,
}

impl<D, S, V, T> VitalSampler<D, S, V, T>
where
    D: PulseOxFrontEnd,
    S: ReadySignal,
    V: VitalsEstimator,
    T: TimeSource,
{
    /// Sampler over the standard 500-sample window with the default
    /// configuration
    pub fn new(device: D, ready: S, estimator: V, clock: T) -> Self {
        Self::with_capacity(device, ready, estimator, clock)
    }
}

impl<D, S, V, T, const N: usize> VitalSampler<D, S, V, T, N>
where
    D: PulseOxFrontEnd,
    S: ReadySignal,
    V: VitalsEstimator,
    T: TimeSource,
{
    /// Sampler over an `N`-sample window with the default configuration
    pub fn with_capacity(device: D, ready: S, estimator: V, clock: T) -> Self {
        Self {
            device,
            ready,
            estimator,
            clock,
            window: SampleWindow::new(),
            state: SamplerState::Uninitialized,
            latest: None,
            config: SamplerConfig::default(),
            refreshes: 0,
        }
    }

    /// Replace the configuration
    ///
    /// The refresh length is checked on every [`read`](Self::read); see
    /// [`SamplerConfig::validate`].
    pub fn with_config(mut self, config: SamplerConfig) -> Self {
        self.config = config;
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> SamplerState {
        self.state
    }

    /// The sample window
    pub fn window(&self) -> &SampleWindow<N> {
        &self.window
    }

    /// Most recent estimate, if any
    pub fn latest(&self) -> Option<EstimationResult> {
        self.latest
    }

    /// Completed refreshes since priming
    pub fn refreshes(&self) -> u32 {
        self.refreshes
    }

    /// Configuration in use
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Optical front end, for bring-up
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Give back the owned parts
    pub fn release(self) -> (D, S, V, T) {
        (self.device, self.ready, self.estimator, self.clock)
    }

    /// Fill the window from empty and run the first estimate
    ///
    /// No-op once `Steady`: returns the cached result without touching the
    /// window. On failure the window is discarded and the sampler returns to
    /// `Uninitialized`, so the next call starts over.
    pub fn prime(&mut self) -> SamplerResult<EstimationResult, D::Error> {
        if let (SamplerState::Steady, Some(result)) = (self.state, self.latest) {
            return Ok(result);
        }

        self.state = SamplerState::Priming;
        self.window.clear();
        log_debug!("priming {}-sample window", N);

        if let Err(e) = self.fill() {
            self.window.clear();
            self.state = SamplerState::Uninitialized;
            return Err(e);
        }

        let result = self.estimate();
        self.state = SamplerState::Steady;
        log_info!("sampler primed: HR={} SpO2={}", result.heart_rate, result.spo2);
        Ok(result)
    }

    /// Refresh the window and return a new estimate
    ///
    /// Primes first if needed. Then slides out `refresh_len` samples, drains
    /// replacements one per ready indication, and re-estimates over the full
    /// window. A refresh length of zero or above `N` is rejected before any
    /// sample is drained.
    pub fn read(&mut self) -> SamplerResult<EstimationResult, D::Error> {
        self.config.validate::<D::Error>(N)?;
        if self.state != SamplerState::Steady {
            self.prime()?;
        }

        if self.window.is_full() {
            self.window.slide(self.config.refresh_len);
        }
        self.fill()?;

        let result = self.estimate();
        self.refreshes = self.refreshes.wrapping_add(1);

        if let Some(newest) = self.window.last() {
            log_debug!(
                "red={}, ir={}, HR={}, HRvalid={}, SpO2={}, SPO2Valid={}",
                newest.red,
                newest.ir,
                result.heart_rate,
                result.heart_rate_valid,
                result.spo2,
                result.spo2_valid
            );
        }
        Ok(result)
    }

    /// Drain samples until the window is full
    fn fill(&mut self) -> SamplerResult<(), D::Error> {
        while !self.window.is_full() {
            let index = self.window.len();
            self.wait_ready(index)?;
            let sample = self.device.read_fifo().map_err(|e| {
                log_warn!("FIFO read for slot {} failed: {:?}", index, e);
                SamplerError::Transport(e)
            })?;
            // Cannot be full here: checked by the loop condition
            let _ = self.window.push(sample);
        }
        Ok(())
    }

    /// Spin on the ready signal until it yields one indication
    fn wait_ready(&mut self, index: usize) -> SamplerResult<(), D::Error> {
        let start = self.clock.now();
        loop {
            match self.ready.poll_ready() {
                Ok(()) => return Ok(()),
                Err(nb::Error::WouldBlock) => {}
                Err(nb::Error::Other(e)) => {
                    log_warn!("ready signal fault at slot {}: {:?}", index, e);
                    return Err(SamplerError::Signal);
                }
            }

            if let Some(limit) = self.config.ready_timeout_ms {
                let waited_ms = self.clock.elapsed_since(start);
                if waited_ms >= limit {
                    log_warn!("slot {} not ready after {} ms", index, waited_ms);
                    return Err(SamplerError::ReadyTimeout { index, waited_ms });
                }
            }
            core::hint::spin_loop();
        }
    }

    fn estimate(&mut self) -> EstimationResult {
        let result = self.estimator.estimate(self.window.ir(), self.window.red());
        self.latest = Some(result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::MockTimeSource;
    use crate::traits::LedChannel;
    use crate::window::OpticalSample;
    use core::convert::Infallible;

    /// FIFO that hands out 0, 1, 2, ... on both channels
    struct CountingFifo {
        next: u32,
    }

    impl PulseOxFrontEnd for CountingFifo {
        type Error = Infallible;

        fn set_mode(&mut self, _: u8) -> Result<(), Infallible> { Ok(()) }
        fn set_fifo_config(&mut self, _: u8) -> Result<(), Infallible> { Ok(()) }
        fn set_spo2_config(&mut self, _: u8) -> Result<(), Infallible> { Ok(()) }
        fn enable_interrupts(&mut self, _: u16) -> Result<(), Infallible> { Ok(()) }
        fn set_led_amplitude(&mut self, _: LedChannel, _: u8) -> Result<(), Infallible> { Ok(()) }

        fn read_fifo(&mut self) -> Result<OpticalSample, Infallible> {
            let n = self.next;
            self.next += 1;
            Ok(OpticalSample::new(n, n))
        }
    }

    struct AlwaysReady;

    impl ReadySignal for AlwaysReady {
        type Error = Infallible;
        fn poll_ready(&mut self) -> nb::Result<(), Infallible> {
            Ok(())
        }
    }

    struct NeverReady;

    impl ReadySignal for NeverReady {
        type Error = Infallible;
        fn poll_ready(&mut self) -> nb::Result<(), Infallible> {
            Err(nb::Error::WouldBlock)
        }
    }

    fn newest(_ir: &[u32], red: &[u32]) -> EstimationResult {
        EstimationResult {
            spo2: red.len() as u32,
            spo2_valid: true,
            heart_rate: red.last().copied().unwrap_or(0),
            heart_rate_valid: true,
        }
    }

    #[test]
    fn small_window_slides_by_refresh_len() {
        let mut sampler: VitalSampler<_, _, _, _, 10> = VitalSampler::with_capacity(
            CountingFifo { next: 0 },
            AlwaysReady,
            newest,
            MockTimeSource::new(0),
        )
        .with_config(SamplerConfig::default().with_refresh_len(4));

        assert_eq!(sampler.prime().unwrap().heart_rate, 9);
        let result = sampler.read().unwrap();

        assert_eq!(result.heart_rate, 13);
        assert_eq!(sampler.window().red(), &[4, 5, 6, 7, 8, 9, 10, 11, 12, 13]);
    }

    #[test]
    fn timeout_during_priming_resets_state() {
        let mut sampler: VitalSampler<_, _, _, _, 10> = VitalSampler::with_capacity(
            CountingFifo { next: 0 },
            NeverReady,
            newest,
            MockTimeSource::stepping(0, 5),
        );

        let err = sampler.prime().unwrap_err();
        assert!(matches!(err, SamplerError::ReadyTimeout { index: 0, .. }));
        assert_eq!(sampler.state(), SamplerState::Uninitialized);
        assert!(sampler.window().is_empty());
    }

    #[test]
    fn prime_when_steady_is_cached() {
        let mut sampler: VitalSampler<_, _, _, _, 10> = VitalSampler::with_capacity(
            CountingFifo { next: 0 },
            AlwaysReady,
            newest,
            MockTimeSource::new(0),
        );

        let first = sampler.prime().unwrap();
        let again = sampler.prime().unwrap();

        assert_eq!(first, again);
        assert_eq!(sampler.device_mut().next, 10);
    }

    #[test]
    fn refresh_len_outside_the_window_is_rejected() {
        for refresh_len in [0, 11] {
            let mut sampler: VitalSampler<_, _, _, _, 10> = VitalSampler::with_capacity(
                CountingFifo { next: 0 },
                AlwaysReady,
                newest,
                MockTimeSource::new(0),
            )
            .with_config(SamplerConfig::default().with_refresh_len(refresh_len));

            let err = sampler.read().unwrap_err();

            assert_eq!(err, SamplerError::InvalidRefresh { refresh_len, capacity: 10 });
            assert_eq!(sampler.state(), SamplerState::Uninitialized);
            assert_eq!(sampler.device_mut().next, 0);
        }
    }

    #[test]
    fn whole_window_refresh_is_allowed() {
        let config = SamplerConfig::default().with_refresh_len(10);
        assert_eq!(config.validate::<()>(10), Ok(()));

        let mut sampler: VitalSampler<_, _, _, _, 10> = VitalSampler::with_capacity(
            CountingFifo { next: 0 },
            AlwaysReady,
            newest,
            MockTimeSource::new(0),
        )
        .with_config(config);

        sampler.read().unwrap();
        assert_eq!(sampler.window().red(), &[10, 11, 12, 13, 14, 15, 16, 17, 18, 19]);
    }
}
