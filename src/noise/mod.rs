//! Noise generators.

mod white;

pub use white::WhiteNoise;
