//! Signal generator traits.
//!
//! - `Signal` for anything producing samples
//! - `AudioSignal` for signals tied to a sample rate
//! - `ConstantSignal` for a fixed value

mod audio;
mod signal;

pub use audio::AudioSignal;
pub use signal::{ConstantSignal, Signal};
