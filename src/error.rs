//! Error types for filter design and parameter validation.

use thiserror::Error;

/// Errors produced when filter parameters fall outside the range in which a
/// low-pass biquad has a physical meaning.
///
/// The unchecked designer never returns these; they come from the `try_*`
/// constructors, [`ChannelFilters::update_parameters`](crate::ChannelFilters::update_parameters)
/// and [`Settings::validate`](crate::Settings::validate).
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum FilterError {
    /// The sample rate is zero, negative or not finite.
    #[error("invalid sample rate {0} Hz")]
    InvalidSampleRate(f64),
    /// The cutoff is not strictly between 0 Hz and the Nyquist frequency.
    #[error("cutoff {cutoff_hz} Hz must lie between 0 Hz and Nyquist ({nyquist_hz} Hz)")]
    InvalidCutoff { cutoff_hz: f64, nyquist_hz: f64 },
    /// The quality factor is zero, negative or not finite.
    #[error("quality factor {0} must be a positive, finite number")]
    InvalidQ(f64),
    /// A block or latency setting is unusable.
    #[error("invalid stream setting: {0}")]
    InvalidSetting(&'static str),
}
