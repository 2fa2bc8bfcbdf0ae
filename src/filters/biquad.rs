//! Biquad filter core.
//!
//! The recurrence is the canonical direct form II: one intermediate value `v`
//! per sample, with the two previous intermediates held in [`FilterState`].
//!
//! ```text
//! v[n] = x[n] - a1*v[n-1] - a2*v[n-2]
//! y[n] = b0*v[n] + b1*v[n-1] + b2*v[n-2]
//! ```

use super::FilterCoefficients;

/// The two most recent intermediate values of one biquad signal path.
///
/// A state belongs to exactly one stream of samples. Feeding two channels
/// through the same state mixes their histories.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterState {
    /// Intermediate value at n-1
    pub v1: f64,
    /// Intermediate value at n-2
    pub v2: f64,
}

impl FilterState {
    /// Zeroed state.
    pub const ZERO: Self = Self { v1: 0.0, v2: 0.0 };

    /// Filters one sample and advances the state in place.
    #[inline]
    pub fn process(&mut self, x: f64, coeffs: &FilterCoefficients) -> f64 {
        let v = x - coeffs.a1 * self.v1 - coeffs.a2 * self.v2;
        let y = coeffs.b0 * v + coeffs.b1 * self.v1 + coeffs.b2 * self.v2;

        // Shift only after y has read the old history
        self.v2 = self.v1;
        self.v1 = v;

        y
    }
}

/// Filters one sample, returning the output and the advanced state.
///
/// Value-semantics form of [`FilterState::process`].
#[inline]
pub fn process(x: f64, state: FilterState, coeffs: &FilterCoefficients) -> (f64, FilterState) {
    let mut next = state;
    let y = next.process(x, coeffs);
    (y, next)
}

/// A single-channel biquad: one coefficient set and one state.
///
/// # Examples
///
/// ```
/// use biquad_live::filters::{design_low_pass, Biquad, BUTTERWORTH_Q};
///
/// let mut filter = Biquad::new(design_low_pass(400.0, 44100.0, BUTTERWORTH_Q));
/// let y = filter.process(1.0);
/// assert!(y > 0.0 && y < 0.01);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Biquad {
    coefficients: FilterCoefficients,
    state: FilterState,
}

impl Biquad {
    /// Creates a filter with zeroed state.
    pub fn new(coefficients: FilterCoefficients) -> Self {
        Self {
            coefficients,
            state: FilterState::ZERO,
        }
    }

    /// Replaces the coefficients. The state is kept so a parameter change
    /// does not click.
    pub fn set_coefficients(&mut self, coefficients: FilterCoefficients) {
        self.coefficients = coefficients;
    }

    pub fn coefficients(&self) -> &FilterCoefficients {
        &self.coefficients
    }

    pub fn state(&self) -> FilterState {
        self.state
    }

    #[inline]
    pub fn process(&mut self, x: f64) -> f64 {
        self.state.process(x, &self.coefficients)
    }

    /// Filters a buffer in place.
    pub fn process_buffer(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{BUTTERWORTH_Q, design_low_pass};

    /// Direct form I evaluation of the same transfer function.
    fn direct_form_one(coeffs: &FilterCoefficients, input: &[f64]) -> Vec<f64> {
        let (mut x1, mut x2, mut y1, mut y2) = (0.0, 0.0, 0.0, 0.0);
        input
            .iter()
            .map(|&x0| {
                let y0 = coeffs.b0 * x0 + coeffs.b1 * x1 + coeffs.b2 * x2
                    - coeffs.a1 * y1
                    - coeffs.a2 * y2;
                x2 = x1;
                x1 = x0;
                y2 = y1;
                y1 = y0;
                y0
            })
            .collect()
    }

    #[test]
    fn test_first_sample_is_b0_times_input() {
        let coeffs = design_low_pass(400.0, 44100.0, BUTTERWORTH_Q);
        let (y, state) = process(1.0, FilterState::ZERO, &coeffs);
        assert_eq!(y, coeffs.b0);
        assert_eq!(state.v1, 1.0);
        assert_eq!(state.v2, 0.0);
    }

    #[test]
    fn test_state_shift_order() {
        let coeffs = FilterCoefficients {
            b0: 0.5,
            b1: 0.25,
            b2: 0.125,
            a1: -0.5,
            a2: 0.25,
        };
        let mut state = FilterState { v1: 2.0, v2: 4.0 };
        let y = state.process(1.0, &coeffs);

        // v = 1 + 0.5*2 - 0.25*4 = 1
        // y = 0.5*1 + 0.25*2 + 0.125*4 = 1.5
        assert_eq!(y, 1.5);
        assert_eq!(state, FilterState { v1: 1.0, v2: 2.0 });
    }

    #[test]
    fn test_impulse_matches_direct_form_one() {
        let coeffs = design_low_pass(1200.0, 48000.0, 2.0);
        let mut input = vec![0.0; 256];
        input[0] = 1.0;

        let expected = direct_form_one(&coeffs, &input);
        let mut filter = Biquad::new(coeffs);
        for (n, (&x, &want)) in input.iter().zip(expected.iter()).enumerate() {
            let got = filter.process(x);
            assert!((got - want).abs() < 1e-12, "sample {}: {} vs {}", n, got, want);
        }
    }

    #[test]
    fn test_identity_passes_through() {
        let mut filter = Biquad::new(FilterCoefficients::IDENTITY);
        for &x in &[0.3, -1.0, 0.0, 0.75] {
            assert_eq!(filter.process(x), x);
        }
    }

    #[test]
    fn test_set_coefficients_keeps_state() {
        let mut filter = Biquad::new(design_low_pass(400.0, 44100.0, BUTTERWORTH_Q));
        filter.process(1.0);
        filter.process(0.5);
        let before = filter.state();

        filter.set_coefficients(design_low_pass(2000.0, 44100.0, BUTTERWORTH_Q));
        assert_eq!(filter.state(), before);
    }

    #[test]
    fn test_process_buffer_matches_per_sample() {
        let coeffs = design_low_pass(800.0, 44100.0, BUTTERWORTH_Q);
        let input: Vec<f64> = (0..64).map(|n| ((n as f64) * 0.3).sin()).collect();

        let mut a = Biquad::new(coeffs);
        let per_sample: Vec<f64> = input.iter().map(|&x| a.process(x)).collect();

        let mut b = Biquad::new(coeffs);
        let mut buffer = input.clone();
        b.process_buffer(&mut buffer);

        assert_eq!(buffer, per_sample);
    }

    #[test]
    fn test_high_q_stays_bounded() {
        let coeffs = design_low_pass(1000.0, 44100.0, 5.0);
        let mut filter = Biquad::new(coeffs);
        for n in 0..10000 {
            let x = (2.0 * std::f64::consts::PI * 440.0 * n as f64 / 44100.0).sin();
            let y = filter.process(x);
            assert!(y.is_finite(), "Filter became unstable");
            assert!(y.abs() < 10.0, "Output amplitude too high: {}", y);
        }
    }
}
