//! Sample generator trait.
//!
//! Generators stand in for a capture device: the stream pulls one sample per
//! frame from a [`Signal`] and feeds it to every channel.

/// Anything that can produce a stream of samples.
///
/// Implementations must be cheap and allocation-free in `next_sample`, since
/// the playback callback calls it once per frame.
pub trait Signal {
    /// Generates the next sample, typically in `[-1.0, 1.0]`.
    fn next_sample(&mut self) -> f64;

    /// Fills `buffer` with consecutive samples.
    ///
    /// Default implementation calls `next_sample()` for each element.
    fn process(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }
}

/// A signal that always returns the same value.
///
/// # Examples
///
/// ```
/// use biquad_live::{ConstantSignal, Signal};
///
/// let mut dc = ConstantSignal::<44100>(0.5);
/// assert_eq!(dc.next_sample(), 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantSignal<const SAMPLE_RATE: u32>(pub f64);

impl<const SAMPLE_RATE: u32> Signal for ConstantSignal<SAMPLE_RATE> {
    fn next_sample(&mut self) -> f64 {
        self.0
    }

    fn process(&mut self, buffer: &mut [f64]) {
        buffer.fill(self.0);
    }
}

impl<const SAMPLE_RATE: u32> From<f64> for ConstantSignal<SAMPLE_RATE> {
    fn from(value: f64) -> Self {
        ConstantSignal::<SAMPLE_RATE>(value)
    }
}

impl<const SAMPLE_RATE: u32> crate::AudioSignal<SAMPLE_RATE> for ConstantSignal<SAMPLE_RATE> {}
