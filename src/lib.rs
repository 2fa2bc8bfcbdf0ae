//! biquad-live - a real-time stereo low-pass biquad.
//!
//! The crate is built in layers:
//! - [`filters`]: coefficient design and the per-sample biquad recurrence,
//!   with one state per channel
//! - [`realtime`]: the lock-free ring, shared controls and the context the
//!   audio callback runs
//! - [`device`] (feature `device`): cpal device selection and the filtered
//!   capture/playback stream
//! - [`render`] (feature `wav`): the same filter applied offline to WAV files
//!
//! # Examples
//!
//! ```
//! use biquad_live::{StereoLowPass, BUTTERWORTH_Q};
//!
//! let mut filter = StereoLowPass::try_low_pass(44100.0, 400.0, BUTTERWORTH_Q).unwrap();
//! let mut block = [1.0f32, -1.0, 0.0, 0.0];
//! filter.process_interleaved(&mut block);
//! assert!(block[0] > 0.0 && block[1] < 0.0);
//! ```

pub mod config;
mod error;
pub mod filters;
pub mod noise;
pub mod oscillators;
pub mod realtime;
mod signals;

#[cfg(feature = "device")]
pub mod device;
#[cfg(feature = "wav")]
pub mod render;

// Re-export commonly used types at the crate root
pub use config::Settings;
pub use error::FilterError;
pub use filters::{
    BUTTERWORTH_Q, Biquad, ChannelFilters, FilterCoefficients, FilterState, StereoLowPass,
    design_low_pass, try_design_low_pass,
};
pub use noise::WhiteNoise;
pub use oscillators::SineOscillator;
pub use realtime::{FilterControl, InputSource, ProcessContext};
pub use signals::{AudioSignal, ConstantSignal, Signal};
