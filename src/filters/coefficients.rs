//! Low-pass biquad coefficient design.
//!
//! Coefficients follow Robert Bristow-Johnson's Audio EQ Cookbook and are
//! normalized by `a0`, so the stored set only carries `b0, b1, b2, a1, a2`.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use crate::FilterError;

/// Quality factor giving a maximally flat (Butterworth) pass band.
pub const BUTTERWORTH_Q: f64 = FRAC_1_SQRT_2;

/// Normalized biquad coefficients (`a0` is implicitly 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterCoefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl FilterCoefficients {
    /// Coefficients that pass the input through unchanged.
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Gain of the filter at 0 Hz, `(b0 + b1 + b2) / (1 + a1 + a2)`.
    pub fn dc_gain(&self) -> f64 {
        (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2)
    }

    /// Returns true if both poles lie strictly inside the unit circle.
    pub fn is_stable(&self) -> bool {
        self.a2.abs() < 1.0 && self.a1.abs() < 1.0 + self.a2
    }

    /// Magnitude of the frequency response at `freq` Hz.
    ///
    /// Evaluates `|H(e^jw)|` directly from the transfer function.
    pub fn magnitude_at(&self, freq: f64, sample_rate: f64) -> f64 {
        let w = 2.0 * PI * freq / sample_rate;
        let (sin1, cos1) = w.sin_cos();
        let (sin2, cos2) = (2.0 * w).sin_cos();

        let num_re = self.b0 + self.b1 * cos1 + self.b2 * cos2;
        let num_im = -(self.b1 * sin1 + self.b2 * sin2);
        let den_re = 1.0 + self.a1 * cos1 + self.a2 * cos2;
        let den_im = -(self.a1 * sin1 + self.a2 * sin2);

        (num_re.hypot(num_im)) / (den_re.hypot(den_im))
    }
}

impl Default for FilterCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Designs a low-pass biquad.
///
/// No range checks are made: a cutoff outside `(0, sample_rate / 2)` or a
/// non-positive `q` yields a set with no low-pass meaning (and `q == 0`
/// yields NaN). Use [`try_design_low_pass`] when the inputs come from a user.
///
/// # Examples
///
/// ```
/// use biquad_live::filters::{design_low_pass, BUTTERWORTH_Q};
///
/// let coeffs = design_low_pass(400.0, 44100.0, BUTTERWORTH_Q);
/// assert_eq!(coeffs.b0, coeffs.b2);
/// assert!((coeffs.dc_gain() - 1.0).abs() < 1e-9);
/// ```
pub fn design_low_pass(cutoff_hz: f64, sample_rate: f64, q: f64) -> FilterCoefficients {
    let w0 = 2.0 * PI * cutoff_hz / sample_rate;
    let (sin_w0, cos_w0) = (w0.sin(), w0.cos());
    let alpha = sin_w0 / (2.0 * q);

    let b0 = (1.0 - cos_w0) / 2.0;
    let b1 = 1.0 - cos_w0;
    let b2 = (1.0 - cos_w0) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_w0;
    let a2 = 1.0 - alpha;

    FilterCoefficients {
        b0: b0 / a0,
        b1: b1 / a0,
        b2: b2 / a0,
        a1: a1 / a0,
        a2: a2 / a0,
    }
}

/// Designs a low-pass biquad after checking that the parameters describe a
/// real low-pass response.
pub fn try_design_low_pass(
    cutoff_hz: f64,
    sample_rate: f64,
    q: f64,
) -> Result<FilterCoefficients, FilterError> {
    let params = LowPassParams::new(cutoff_hz, q, sample_rate)?;
    Ok(params.design(sample_rate))
}

/// A validated cutoff / Q pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPassParams {
    cutoff_hz: f64,
    q: f64,
}

impl LowPassParams {
    /// Validates `cutoff_hz` and `q` against `sample_rate`.
    pub fn new(cutoff_hz: f64, q: f64, sample_rate: f64) -> Result<Self, FilterError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(FilterError::InvalidSampleRate(sample_rate));
        }
        let nyquist_hz = sample_rate / 2.0;
        if !cutoff_hz.is_finite() || cutoff_hz <= 0.0 || cutoff_hz >= nyquist_hz {
            return Err(FilterError::InvalidCutoff {
                cutoff_hz,
                nyquist_hz,
            });
        }
        if !q.is_finite() || q <= 0.0 {
            return Err(FilterError::InvalidQ(q));
        }
        Ok(Self { cutoff_hz, q })
    }

    pub fn cutoff_hz(&self) -> f64 {
        self.cutoff_hz
    }

    pub fn q(&self) -> f64 {
        self.q
    }

    /// Designs the coefficients for these parameters.
    pub fn design(&self, sample_rate: f64) -> FilterCoefficients {
        design_low_pass(self.cutoff_hz, sample_rate, self.q)
    }
}
