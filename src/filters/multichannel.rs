//! One low-pass biquad per channel over interleaved blocks.

use super::{FilterCoefficients, FilterState, LowPassParams, design_low_pass};
use crate::FilterError;

/// A bank of low-pass filters sharing one coefficient set, with an independent
/// [`FilterState`] for each channel.
///
/// Interleaved sample `i` of a block goes through the state of channel
/// `i % CHANNELS`. Blocks are expected to hold whole frames; a trailing
/// partial frame only advances the leading channels.
#[derive(Debug, Clone)]
pub struct ChannelFilters<const CHANNELS: usize> {
    sample_rate: f64,
    cutoff_hz: f64,
    q: f64,
    coefficients: FilterCoefficients,
    states: [FilterState; CHANNELS],
}

/// Two-channel low-pass, the configuration used by the live stream.
pub type StereoLowPass = ChannelFilters<2>;

impl<const CHANNELS: usize> ChannelFilters<CHANNELS> {
    /// Creates the bank without validating the parameters.
    pub fn low_pass(sample_rate: f64, cutoff_hz: f64, q: f64) -> Self {
        Self {
            sample_rate,
            cutoff_hz,
            q,
            coefficients: design_low_pass(cutoff_hz, sample_rate, q),
            states: [FilterState::ZERO; CHANNELS],
        }
    }

    /// Creates the bank after validating the parameters.
    pub fn try_low_pass(sample_rate: f64, cutoff_hz: f64, q: f64) -> Result<Self, FilterError> {
        LowPassParams::new(cutoff_hz, q, sample_rate)?;
        Ok(Self::low_pass(sample_rate, cutoff_hz, q))
    }

    /// Applies a new cutoff and Q.
    ///
    /// Coefficients are recomputed only if either value differs from the
    /// current one; the return value says whether that happened. Channel
    /// states are kept. Invalid values leave the filter untouched.
    ///
    /// Performs no allocation, so it may be called from the audio callback.
    pub fn update_parameters(&mut self, cutoff_hz: f64, q: f64) -> Result<bool, FilterError> {
        if cutoff_hz == self.cutoff_hz && q == self.q {
            return Ok(false);
        }
        let params = LowPassParams::new(cutoff_hz, q, self.sample_rate)?;
        self.coefficients = params.design(self.sample_rate);
        self.cutoff_hz = cutoff_hz;
        self.q = q;
        Ok(true)
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Current `(cutoff_hz, q)`.
    pub fn params(&self) -> (f64, f64) {
        (self.cutoff_hz, self.q)
    }

    pub fn coefficients(&self) -> &FilterCoefficients {
        &self.coefficients
    }

    /// State of one channel. Panics if `channel >= CHANNELS`.
    pub fn state(&self, channel: usize) -> FilterState {
        self.states[channel]
    }

    /// Filters one frame, one sample per channel.
    #[inline]
    pub fn process_frame(&mut self, frame: [f64; CHANNELS]) -> [f64; CHANNELS] {
        let mut out = frame;
        for (sample, state) in out.iter_mut().zip(self.states.iter_mut()) {
            *sample = state.process(*sample, &self.coefficients);
        }
        out
    }

    /// Filters an interleaved block in place.
    pub fn process_interleaved(&mut self, block: &mut [f32]) {
        for frame in block.chunks_mut(CHANNELS) {
            for (sample, state) in frame.iter_mut().zip(self.states.iter_mut()) {
                *sample = state.process(f64::from(*sample), &self.coefficients) as f32;
            }
        }
    }

    /// Filters `input` into `output`. Both are interleaved; only the common
    /// length is processed.
    pub fn process_into(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len());
        for (in_frame, out_frame) in input.chunks(CHANNELS).zip(output.chunks_mut(CHANNELS)) {
            for ((x, y), state) in in_frame
                .iter()
                .zip(out_frame.iter_mut())
                .zip(self.states.iter_mut())
            {
                *y = state.process(f64::from(*x), &self.coefficients) as f32;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{BUTTERWORTH_Q, Biquad};

    #[test]
    fn test_channels_do_not_share_history() {
        let mut stereo = StereoLowPass::low_pass(44100.0, 400.0, BUTTERWORTH_Q);
        // Impulse on the left, silence on the right
        let mut block = vec![0.0f32; 64];
        block[0] = 1.0;
        stereo.process_interleaved(&mut block);

        for right in block.iter().skip(1).step_by(2) {
            assert_eq!(*right, 0.0);
        }
        assert_eq!(stereo.state(1), FilterState::ZERO);
        assert_ne!(stereo.state(0), FilterState::ZERO);
    }

    #[test]
    fn test_each_channel_matches_mono_filter() {
        let coeffs_src = StereoLowPass::low_pass(44100.0, 900.0, BUTTERWORTH_Q);
        let mut stereo = coeffs_src.clone();
        let mut left = Biquad::new(*coeffs_src.coefficients());
        let mut right = Biquad::new(*coeffs_src.coefficients());

        let frames = 300;
        let mut block: Vec<f32> = (0..frames * 2)
            .map(|i| if i % 2 == 0 { ((i / 2) as f32 * 0.1).sin() } else { 0.5 })
            .collect();
        let input = block.clone();
        stereo.process_interleaved(&mut block);

        for frame in 0..frames {
            let l = left.process(f64::from(input[frame * 2])) as f32;
            let r = right.process(f64::from(input[frame * 2 + 1])) as f32;
            assert_eq!(block[frame * 2], l);
            assert_eq!(block[frame * 2 + 1], r);
        }
    }

    #[test]
    fn test_block_boundaries_are_seamless() {
        let mut whole = StereoLowPass::low_pass(44100.0, 1500.0, BUTTERWORTH_Q);
        let mut split = whole.clone();
        let input: Vec<f32> = (0..512).map(|i| ((i * 7 % 13) as f32 - 6.0) / 6.0).collect();

        let mut a = input.clone();
        whole.process_interleaved(&mut a);

        let mut b = input.clone();
        let (first, second) = b.split_at_mut(256);
        split.process_interleaved(first);
        split.process_interleaved(second);

        assert_eq!(a, b);
    }

    #[test]
    fn test_process_into_matches_in_place() {
        let mut a = StereoLowPass::low_pass(44100.0, 400.0, BUTTERWORTH_Q);
        let mut b = a.clone();
        let input: Vec<f32> = (0..128).map(|i| (i as f32 * 0.05).cos()).collect();

        let mut in_place = input.clone();
        a.process_interleaved(&mut in_place);

        let mut output = vec![0.0f32; input.len()];
        b.process_into(&input, &mut output);

        assert_eq!(in_place, output);
    }

    #[test]
    fn test_update_parameters_only_on_change() {
        let mut filters = StereoLowPass::low_pass(44100.0, 400.0, BUTTERWORTH_Q);
        assert_eq!(filters.update_parameters(400.0, BUTTERWORTH_Q), Ok(false));
        assert_eq!(filters.update_parameters(800.0, BUTTERWORTH_Q), Ok(true));
        assert_eq!(filters.params(), (800.0, BUTTERWORTH_Q));
        assert_eq!(
            *filters.coefficients(),
            design_low_pass(800.0, 44100.0, BUTTERWORTH_Q)
        );
    }

    #[test]
    fn test_update_parameters_keeps_state() {
        let mut filters = StereoLowPass::low_pass(44100.0, 400.0, BUTTERWORTH_Q);
        filters.process_frame([1.0, -1.0]);
        let left = filters.state(0);
        let right = filters.state(1);

        filters.update_parameters(1000.0, 1.0).unwrap();
        assert_eq!(filters.state(0), left);
        assert_eq!(filters.state(1), right);
    }

    #[test]
    fn test_update_parameters_rejects_invalid() {
        let mut filters = StereoLowPass::low_pass(44100.0, 400.0, BUTTERWORTH_Q);
        let before = *filters.coefficients();
        assert!(filters.update_parameters(30000.0, BUTTERWORTH_Q).is_err());
        assert!(filters.update_parameters(400.0, -1.0).is_err());
        assert_eq!(*filters.coefficients(), before);
        assert_eq!(filters.params(), (400.0, BUTTERWORTH_Q));
    }

    #[test]
    fn test_try_low_pass_validates() {
        assert!(StereoLowPass::try_low_pass(44100.0, 400.0, BUTTERWORTH_Q).is_ok());
        assert!(StereoLowPass::try_low_pass(44100.0, 0.0, BUTTERWORTH_Q).is_err());
    }

    #[test]
    fn test_partial_frame_keeps_channel_alignment() {
        let mut odd = ChannelFilters::<2>::low_pass(44100.0, 400.0, BUTTERWORTH_Q);
        let mut block = [1.0f32, 0.0, 1.0];
        odd.process_interleaved(&mut block);
        // Two samples went through the left state, one through the right
        assert_ne!(odd.state(0).v2, 0.0);
        assert_eq!(odd.state(1), FilterState { v1: 0.0, v2: 0.0 });
    }
}
