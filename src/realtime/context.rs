//! Per-stream processing context handed to the playback callback.

use std::sync::Arc;

use super::{FilterControl, RingConsumer};
use crate::Signal;
use crate::filters::ChannelFilters;

/// Where the unfiltered samples of a block come from.
pub enum InputSource {
    /// Interleaved samples queued by a capture callback.
    Capture(RingConsumer),
    /// A mono generator, duplicated into every channel of a frame.
    Generator(Box<dyn Signal + Send>),
}

impl InputSource {
    /// Wraps a generator.
    pub fn generator(signal: impl Signal + Send + 'static) -> Self {
        InputSource::Generator(Box::new(signal))
    }

    /// Fills `block` with interleaved input for `channels` channels and
    /// returns how many samples could not be supplied. Missing samples are
    /// zeroed.
    fn fill(&mut self, block: &mut [f32], channels: usize) -> usize {
        match self {
            InputSource::Capture(consumer) => {
                let read = consumer.pop_slice(block);
                block[read..].fill(0.0);
                block.len() - read
            }
            InputSource::Generator(signal) => {
                for frame in block.chunks_mut(channels) {
                    let sample = signal.next_sample() as f32;
                    frame.fill(sample);
                }
                0
            }
        }
    }
}

/// Everything the playback callback needs, owned by the callback closure.
///
/// Built when the stream opens and dropped when it closes. The scratch buffer
/// is allocated up front; [`process_block`](Self::process_block) never
/// allocates, locks or logs.
pub struct ProcessContext<const CHANNELS: usize> {
    filters: ChannelFilters<CHANNELS>,
    input: InputSource,
    scratch: Vec<f32>,
    control: Arc<FilterControl>,
}

impl<const CHANNELS: usize> ProcessContext<CHANNELS> {
    /// Creates a context whose filters start at the control's parameters.
    ///
    /// `max_block_samples` sizes the scratch buffer; larger output buffers are
    /// processed in pieces of that size.
    pub fn new(control: Arc<FilterControl>, input: InputSource, max_block_samples: usize) -> Self {
        let (cutoff_hz, q) = control.params();
        let filters = ChannelFilters::low_pass(control.sample_rate(), cutoff_hz, q);
        // Keep the scratch frame-aligned so every piece starts on channel 0
        let frames = max_block_samples.div_ceil(CHANNELS).max(1);
        Self {
            filters,
            input,
            scratch: vec![0.0; frames * CHANNELS],
            control,
        }
    }

    pub fn filters(&self) -> &ChannelFilters<CHANNELS> {
        &self.filters
    }

    pub fn control(&self) -> &Arc<FilterControl> {
        &self.control
    }

    /// Produces one block of filtered, interleaved output.
    pub fn process_block(&mut self, output: &mut [f32]) {
        self.process_block_as(output, |sample| sample);
    }

    /// Like [`process_block`](Self::process_block), converting each filtered
    /// sample into the device's sample type.
    ///
    /// The whole of `output` counts as one block for the meters, however many
    /// scratch-sized pieces it takes.
    pub fn process_block_as<T>(&mut self, output: &mut [T], convert: impl Fn(f32) -> T) {
        let (cutoff_hz, q) = self.control.params();
        let updated = self.filters.update_parameters(cutoff_hz, q);
        // Setters validate before publishing; on error the old coefficients stay
        debug_assert!(
            updated.is_ok(),
            "unvalidated parameters reached the audio thread: {:?}",
            updated
        );

        let mut peak = 0.0f32;
        let mut missing = 0;
        let chunk = self.scratch.len();
        for out in output.chunks_mut(chunk) {
            let scratch = &mut self.scratch[..out.len()];
            missing += self.input.fill(scratch, CHANNELS);
            self.filters.process_interleaved(scratch);
            for (dst, &src) in out.iter_mut().zip(scratch.iter()) {
                peak = peak.max(src.abs());
                *dst = convert(src);
            }
        }
        self.control.record_block(peak, missing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{BUTTERWORTH_Q, StereoLowPass};
    use crate::realtime::SampleRing;
    use crate::{ConstantSignal, SineOscillator};

    fn control(cutoff: f64) -> Arc<FilterControl> {
        Arc::new(FilterControl::new(44100.0, cutoff, BUTTERWORTH_Q).unwrap())
    }

    #[test]
    fn test_capture_block_is_filtered_per_channel() {
        let (mut tx, rx) = SampleRing::with_capacity(1024);
        let input: Vec<f32> = (0..512)
            .map(|i| if i % 2 == 0 { 1.0 } else { -0.5 })
            .collect();
        tx.push_slice(&input);

        let mut context = ProcessContext::<2>::new(control(400.0), InputSource::Capture(rx), 512);
        let mut output = vec![0.0f32; 512];
        context.process_block(&mut output);

        let mut reference = StereoLowPass::low_pass(44100.0, 400.0, BUTTERWORTH_Q);
        let mut expected = input.clone();
        reference.process_interleaved(&mut expected);
        assert_eq!(output, expected);
        assert_eq!(context.control().underruns(), 0);
        assert_eq!(context.control().blocks(), 1);
    }

    #[test]
    fn test_underrun_pads_with_silence() {
        let (mut tx, rx) = SampleRing::with_capacity(64);
        tx.push_slice(&[1.0, 1.0]);
        let control = control(400.0);
        let mut context =
            ProcessContext::<2>::new(Arc::clone(&control), InputSource::Capture(rx), 16);

        let mut output = vec![0.0f32; 16];
        context.process_block(&mut output);
        assert_eq!(control.underruns(), 1);
        // First frame saw the impulse; the padded frames only ring out
        assert!(output[0] > 0.0);
        assert!(output.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_parameter_change_reaches_filters() {
        let control = control(400.0);
        let mut context = ProcessContext::<2>::new(
            Arc::clone(&control),
            InputSource::generator(ConstantSignal::<44100>(0.0)),
            64,
        );
        control.set_cutoff(2500.0).unwrap();

        let mut output = vec![0.0f32; 64];
        context.process_block(&mut output);
        assert_eq!(context.filters().params(), (2500.0, BUTTERWORTH_Q));
    }

    #[test]
    fn test_large_output_is_chunked() {
        let sine = || InputSource::generator(SineOscillator::<44100>::new(300.0));
        let mut small = ProcessContext::<2>::new(control(1000.0), sine(), 64);
        let mut large = ProcessContext::<2>::new(control(1000.0), sine(), 4096);

        let mut a = vec![0.0f32; 1000];
        let mut b = vec![0.0f32; 1000];
        small.process_block(&mut a);
        large.process_block(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_generator_feeds_every_channel() {
        let mut context = ProcessContext::<2>::new(
            control(400.0),
            InputSource::generator(ConstantSignal::<44100>(1.0)),
            512,
        );
        let mut output = vec![0.0f32; 512];
        context.process_block(&mut output);
        for frame in output.chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }
        assert!(context.control().peak() > 0.0);
    }

    #[test]
    fn test_chunked_output_counts_as_one_block() {
        let (mut tx, rx) = SampleRing::with_capacity(64);
        tx.push_slice(&[0.5; 10]);
        let control = control(400.0);
        let mut context =
            ProcessContext::<2>::new(Arc::clone(&control), InputSource::Capture(rx), 16);

        let mut output = vec![0.0f32; 1000];
        context.process_block(&mut output);
        assert_eq!(control.blocks(), 1);
        assert_eq!(control.underruns(), 1);
        let peak = output.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
        assert_eq!(control.peak(), peak);
    }

    #[test]
    fn test_process_block_as_converts_samples() {
        let sine = || InputSource::generator(SineOscillator::<44100>::new(300.0));
        let mut reference = ProcessContext::<2>::new(control(1000.0), sine(), 64);
        let mut converted = ProcessContext::<2>::new(control(1000.0), sine(), 64);

        let mut expected = vec![0.0f32; 512];
        reference.process_block(&mut expected);
        let mut output = vec![0i32; 512];
        converted.process_block_as(&mut output, |s| (s * 1000.0).round() as i32);

        for (&actual, &sample) in output.iter().zip(&expected) {
            assert_eq!(actual, (sample * 1000.0).round() as i32);
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unvalidated parameters")]
    fn test_rejected_update_is_loud_in_debug() {
        let control = control(400.0);
        let mut context = ProcessContext::<2>::new(
            Arc::clone(&control),
            InputSource::generator(ConstantSignal::<44100>(0.0)),
            64,
        );
        control.store_unchecked(-5.0, BUTTERWORTH_Q);
        let mut output = vec![0.0f32; 64];
        context.process_block(&mut output);
    }
}
