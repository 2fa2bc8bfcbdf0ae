//! Sample-rate-aware signals.

use crate::Signal;

/// A [`Signal`] generated at a fixed sample rate carried in its type.
///
/// Generators at different rates are different types, so a 48 kHz source
/// cannot be handed to a 44.1 kHz stream by accident.
///
/// # Examples
///
/// ```
/// use biquad_live::{AudioSignal, SineOscillator};
///
/// let osc: SineOscillator<44100> = SineOscillator::new(440.0);
/// assert_eq!(osc.sample_rate(), 44100.0);
/// ```
pub trait AudioSignal<const SAMPLE_RATE: u32>: Signal {
    /// Sample rate in Hz.
    fn sample_rate(&self) -> f64 {
        SAMPLE_RATE as f64
    }
}
