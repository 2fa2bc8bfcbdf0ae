//! Parameters and meters shared between the control thread and the audio
//! callback.
//!
//! Everything is an atomic so neither side ever blocks. Setters run on the
//! control thread, validate and log; the callback only loads and stores.

use std::sync::atomic::{AtomicU64, Ordering};

use atomic_float::{AtomicF32, AtomicF64};
use tracing::{debug, info};

use crate::FilterError;
use crate::filters::LowPassParams;

/// Shared control block for one filtered stream. Hold it in an `Arc`.
#[derive(Debug)]
pub struct FilterControl {
    sample_rate: f64,
    cutoff_hz: AtomicF64,
    q: AtomicF64,
    /// Peak absolute output of the most recent block
    peak: AtomicF32,
    blocks: AtomicU64,
    underruns: AtomicU64,
    overruns: AtomicU64,
}

impl FilterControl {
    /// Creates a control block after validating the initial parameters.
    pub fn new(sample_rate: f64, cutoff_hz: f64, q: f64) -> Result<Self, FilterError> {
        LowPassParams::new(cutoff_hz, q, sample_rate)?;
        Ok(Self {
            sample_rate,
            cutoff_hz: AtomicF64::new(cutoff_hz),
            q: AtomicF64::new(q),
            peak: AtomicF32::new(0.0),
            blocks: AtomicU64::new(0),
            underruns: AtomicU64::new(0),
            overruns: AtomicU64::new(0),
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn cutoff_hz(&self) -> f64 {
        self.cutoff_hz.load(Ordering::Relaxed)
    }

    pub fn q(&self) -> f64 {
        self.q.load(Ordering::Relaxed)
    }

    /// Current `(cutoff_hz, q)` as seen by the callback.
    pub fn params(&self) -> (f64, f64) {
        (self.cutoff_hz(), self.q())
    }

    /// Requests a new cutoff. The audio thread picks it up on its next block.
    pub fn set_cutoff(&self, cutoff_hz: f64) -> Result<(), FilterError> {
        LowPassParams::new(cutoff_hz, self.q(), self.sample_rate)?;
        let previous = self.cutoff_hz.swap(cutoff_hz, Ordering::Relaxed);
        info!(previous, cutoff_hz, "cutoff changed");
        Ok(())
    }

    /// Requests a new quality factor.
    pub fn set_q(&self, q: f64) -> Result<(), FilterError> {
        LowPassParams::new(self.cutoff_hz(), q, self.sample_rate)?;
        let previous = self.q.swap(q, Ordering::Relaxed);
        info!(previous, q, "quality factor changed");
        Ok(())
    }

    /// Multiplies the cutoff by `factor`, clamping into the valid range.
    /// Returns the cutoff actually applied.
    pub fn scale_cutoff(&self, factor: f64) -> Result<f64, FilterError> {
        let nyquist = self.sample_rate / 2.0;
        let upper = nyquist * 0.99;
        let target = (self.cutoff_hz() * factor).clamp(upper.min(1.0), upper);
        self.set_cutoff(target)?;
        Ok(target)
    }

    /// Publishes parameters without validation.
    #[cfg(test)]
    pub(crate) fn store_unchecked(&self, cutoff_hz: f64, q: f64) {
        self.cutoff_hz.store(cutoff_hz, Ordering::Relaxed);
        self.q.store(q, Ordering::Relaxed);
    }

    pub(crate) fn record_block(&self, peak: f32, missing_samples: usize) {
        self.peak.store(peak, Ordering::Relaxed);
        self.blocks.fetch_add(1, Ordering::Relaxed);
        if missing_samples > 0 {
            self.underruns.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_overrun(&self) {
        self.overruns.fetch_add(1, Ordering::Relaxed);
    }

    /// Peak absolute output of the last processed block.
    pub fn peak(&self) -> f32 {
        self.peak.load(Ordering::Relaxed)
    }

    /// Blocks processed so far.
    pub fn blocks(&self) -> u64 {
        self.blocks.load(Ordering::Relaxed)
    }

    /// Blocks that had to be padded with silence because capture lagged.
    pub fn underruns(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }

    /// Capture callbacks that found the ring full and dropped samples.
    pub fn overruns(&self) -> u64 {
        self.overruns.load(Ordering::Relaxed)
    }

    /// Logs the counters; call from the control thread.
    pub fn log_summary(&self) {
        debug!(
            blocks = self.blocks(),
            underruns = self.underruns(),
            overruns = self.overruns(),
            "stream counters"
        );
    }
}
