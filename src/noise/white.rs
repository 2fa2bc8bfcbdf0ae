//! White noise test source.

use crate::Signal;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A white noise generator.
///
/// Each sample is uniformly distributed in `[-1.0, 1.0]`, giving equal power
/// across the band. Useful for hearing the filter without a capture device.
///
/// The default RNG is `Send`, so the generator can move into an audio
/// callback.
pub struct WhiteNoise<R: Rng = StdRng> {
    rng: R,
}

impl WhiteNoise<StdRng> {
    /// Creates a generator seeded from the OS entropy source.
    ///
    /// # Examples
    ///
    /// ```
    /// use biquad_live::{Signal, WhiteNoise};
    ///
    /// let mut noise = WhiteNoise::new();
    /// let sample = noise.next_sample();
    /// assert!((-1.0..=1.0).contains(&sample));
    /// ```
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for WhiteNoise<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> WhiteNoise<R> {
    /// Creates a generator with a custom RNG, e.g. a seeded one for tests.
    ///
    /// ```
    /// use biquad_live::{Signal, WhiteNoise};
    /// use rand::SeedableRng;
    ///
    /// let rng = rand::rngs::StdRng::seed_from_u64(42);
    /// let mut noise = WhiteNoise::with_rng(rng);
    /// let sample = noise.next_sample();
    /// ```
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Signal for WhiteNoise<R> {
    fn next_sample(&mut self) -> f64 {
        self.rng.gen_range(-1.0..=1.0)
    }
}
