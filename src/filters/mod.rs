//! Low-pass biquad filtering.
//!
//! - [`design_low_pass`] turns a cutoff, sample rate and Q into
//!   [`FilterCoefficients`].
//! - [`FilterState`] / [`Biquad`] run the per-sample recurrence for one
//!   signal path.
//! - [`ChannelFilters`] keeps one state per channel of an interleaved stream
//!   and recomputes coefficients only when parameters change.

mod biquad;
mod coefficients;
mod multichannel;

pub use self::biquad::{Biquad, FilterState, process};
pub use self::coefficients::{
    BUTTERWORTH_Q, FilterCoefficients, LowPassParams, design_low_pass, try_design_low_pass,
};
pub use self::multichannel::{ChannelFilters, StereoLowPass};
