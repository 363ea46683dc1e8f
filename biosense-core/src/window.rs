//! Fixed-Capacity Sliding Window of Optical Samples
//!
//! ## Overview
//!
//! The SpO2 estimator consumes the red and infrared channels as two separate
//! contiguous slices, so the window stores them as parallel arrays rather than
//! an array of pairs. Capacity is a const generic; the sampler uses
//! [`WINDOW_CAPACITY`](crate::constants::WINDOW_CAPACITY) (500).
//!
//! ## Sliding
//!
//! Unlike a ring buffer, the window is kept in chronological order starting at
//! index 0 so the estimator can read it without unwrapping:
//!
//! ```text
//! before slide(100):  [ s0 .. s99 | s100 ........ s499 ]   len = 500
//! after  slide(100):  [ s100 ........ s499 | ------- ]     len = 400
//! after 100 pushes:   [ s100 ........ s499 | n0 .. n99 ]   len = 500
//! ```
//!
//! `slide` is a pair of `copy_within` calls, so a refresh costs one memmove per
//! channel regardless of how many samples are retained.

/// One paired reading from the pulse-oximetry FIFO
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpticalSample {
    /// Red LED channel (18-bit ADC count)
    pub red: u32,
    /// Infrared LED channel (18-bit ADC count)
    pub ir: u32,
}

impl OpticalSample {
    /// Build from raw channel counts
    pub const fn new(red: u32, ir: u32) -> Self {
        Self { red, ir }
    }
}

/// Ordered, fixed-capacity window of optical samples
///
/// ## Internal Invariants
///
/// - `len <= N`
/// - slots `0..len` hold samples in arrival order; slots `len..N` are stale
#[derive(Clone)]
pub struct SampleWindow<const N: usize> {
    red: [u32; N],
    ir: [u32; N],
    len: usize,
}

impl<const N: usize> SampleWindow<N> {
    /// Empty window
    pub const fn new() -> Self {
        Self {
            red: [0; N],
            ir: [0; N],
            len: 0,
        }
    }

    /// Total capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of samples held
    pub fn len(&self) -> usize {
        self.len
    }

    /// No samples held
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Window holds exactly `N` samples
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Free slots at the tail
    pub fn remaining(&self) -> usize {
        N - self.len
    }

    /// Append a sample at the tail
    ///
    /// Returns the sample back if the window is already full; the window
    /// never overwrites on its own.
    pub fn push(&mut self, sample: OpticalSample) -> Result<(), OpticalSample> {
        if self.len == N {
            return Err(sample);
        }
        self.red[self.len] = sample.red;
        self.ir[self.len] = sample.ir;
        self.len += 1;
        Ok(())
    }

    /// Discard the oldest `count` samples and move the rest to the front
    ///
    /// `count` larger than the current length empties the window.
    pub fn slide(&mut self, count: usize) {
        if count >= self.len {
            self.len = 0;
            return;
        }
        self.red.copy_within(count..self.len, 0);
        self.ir.copy_within(count..self.len, 0);
        self.len -= count;
    }

    /// Forget all samples
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Sample at logical index (0 = oldest)
    pub fn get(&self, index: usize) -> Option<OpticalSample> {
        if index >= self.len {
            return None;
        }
        Some(OpticalSample::new(self.red[index], self.ir[index]))
    }

    /// Oldest sample
    pub fn first(&self) -> Option<OpticalSample> {
        self.get(0)
    }

    /// Most recent sample
    pub fn last(&self) -> Option<OpticalSample> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    /// Red channel, oldest first
    pub fn red(&self) -> &[u32] {
        &self.red[..self.len]
    }

    /// Infrared channel, oldest first
    pub fn ir(&self) -> &[u32] {
        &self.ir[..self.len]
    }

    /// Iterate over paired samples from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = OpticalSample> + '_ {
        self.red()
            .iter()
            .zip(self.ir())
            .map(|(&red, &ir)| OpticalSample::new(red, ir))
    }
}

impl<const N: usize> Default for SampleWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for SampleWindow<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SampleWindow")
            .field("len", &self.len)
            .field("capacity", &N)
            .field("first", &self.first())
            .field("last", &self.last())
            .finish()
    }
}
