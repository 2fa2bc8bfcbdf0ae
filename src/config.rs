//! Stream configuration.
//!
//! The live path runs a fixed format: 44.1 kHz, stereo, 256-frame blocks.
//! Only the cutoff, Q and ring latency are adjustable.

use crate::FilterError;
use crate::filters::{BUTTERWORTH_Q, LowPassParams};

/// Sample rate of the live stream in Hz.
pub const SAMPLE_RATE: u32 = 44100;
/// Frames requested per audio callback.
pub const BLOCK_LEN: usize = 256;
/// Interleaved channels of the live stream.
pub const CHANNELS: usize = 2;
/// Cutoff used when none is given.
pub const DEFAULT_CUTOFF_HZ: f64 = 400.0;
/// Capture-to-playback buffering in milliseconds.
pub const DEFAULT_LATENCY_MS: f64 = 20.0;

/// Settings for one filtered stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub sample_rate: u32,
    /// Frames per block
    pub block_len: usize,
    pub cutoff_hz: f64,
    pub q: f64,
    pub latency_ms: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            block_len: BLOCK_LEN,
            cutoff_hz: DEFAULT_CUTOFF_HZ,
            q: BUTTERWORTH_Q,
            latency_ms: DEFAULT_LATENCY_MS,
        }
    }
}

impl Settings {
    /// Default settings with the given cutoff.
    pub fn with_cutoff(cutoff_hz: f64) -> Self {
        Self {
            cutoff_hz,
            ..Self::default()
        }
    }

    /// Checks every field, returning the first problem found.
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.block_len == 0 {
            return Err(FilterError::InvalidSetting("block length must be non-zero"));
        }
        if !self.latency_ms.is_finite() || self.latency_ms < 0.0 {
            return Err(FilterError::InvalidSetting(
                "latency must be a non-negative number of milliseconds",
            ));
        }
        LowPassParams::new(self.cutoff_hz, self.q, self.sample_rate_hz())?;
        Ok(())
    }

    pub fn sample_rate_hz(&self) -> f64 {
        f64::from(self.sample_rate)
    }

    /// Interleaved samples in one block.
    pub fn block_samples(&self) -> usize {
        self.block_len * CHANNELS
    }

    /// Interleaved samples of silence to queue before playback starts.
    pub fn latency_samples(&self) -> usize {
        let frames = (self.latency_ms / 1000.0 * self.sample_rate_hz()).round() as usize;
        frames * CHANNELS
    }

    /// Capacity of the capture ring: the latency plus room for a few blocks
    /// of jitter between the two callbacks.
    pub fn ring_capacity(&self) -> usize {
        self.latency_samples() + 4 * self.block_samples()
    }
}
