//! Sine wave test source.

use crate::{AudioSignal, Signal};
use std::f64::consts::PI;

/// A sine oscillator with continuous phase across calls.
///
/// # Type Parameters
///
/// * `SAMPLE_RATE` - Sample rate in Hz (e.g., 44100 for CD quality)
#[derive(Debug, Clone)]
pub struct SineOscillator<const SAMPLE_RATE: u32> {
    /// Current phase (0.0 to 1.0)
    phase: f64,
    /// Phase increment per sample (frequency / sample_rate)
    phase_increment: f64,
}

impl<const SAMPLE_RATE: u32> SineOscillator<SAMPLE_RATE> {
    /// Creates a sine at `frequency` Hz starting at phase zero.
    ///
    /// ```
    /// use biquad_live::{Signal, SineOscillator};
    ///
    /// let mut osc = SineOscillator::<44100>::new(440.0);
    /// assert_eq!(osc.next_sample(), 0.0);
    /// ```
    pub fn new(frequency: f64) -> Self {
        Self {
            phase: 0.0,
            phase_increment: frequency / SAMPLE_RATE as f64,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.phase_increment * SAMPLE_RATE as f64
    }
}

impl<const SAMPLE_RATE: u32> Signal for SineOscillator<SAMPLE_RATE> {
    fn next_sample(&mut self) -> f64 {
        let sample = (self.phase * 2.0 * PI).sin();

        // Wrap to [0.0, 1.0)
        self.phase += self.phase_increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        sample
    }
}

impl<const SAMPLE_RATE: u32> AudioSignal<SAMPLE_RATE> for SineOscillator<SAMPLE_RATE> {}
