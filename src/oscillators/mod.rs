//! Oscillators used as test input.

mod sine;

pub use sine::SineOscillator;
