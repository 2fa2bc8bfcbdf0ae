//! Offline rendering of WAV files through the channel filters.
//!
//! Runs the same block-by-block path as the live stream, which makes the
//! filter audible without an audio device and reproducible in tests.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use thiserror::Error;
use tracing::info;

use crate::FilterError;
use crate::config::BLOCK_LEN;
use crate::filters::ChannelFilters;

/// Errors from offline rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("WAV I/O failed: {0}")]
    Wav(#[from] hound::Error),
    #[error("unsupported channel count {0}; only mono and stereo files are filtered")]
    UnsupportedChannels(u16),
    #[error("unsupported sample format: {bits}-bit {format:?}")]
    UnsupportedFormat { bits: u16, format: SampleFormat },
    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// What a render produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSummary {
    pub sample_rate: u32,
    pub channels: u16,
    pub frames: usize,
    /// Peak absolute value of the filtered output
    pub peak: f32,
}

/// Filters `input` into a 32-bit float WAV at `output`.
///
/// The cutoff must lie below the input file's Nyquist frequency.
pub fn render_wav(
    input: &Path,
    output: &Path,
    cutoff_hz: f64,
    q: f64,
) -> Result<RenderSummary, RenderError> {
    let mut reader = WavReader::open(input)?;
    let spec = reader.spec();
    let samples = read_samples(&mut reader, spec)?;

    let out_spec = WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let sample_rate = f64::from(spec.sample_rate);

    let (filtered, peak) = match spec.channels {
        1 => {
            let filters = ChannelFilters::<1>::try_low_pass(sample_rate, cutoff_hz, q)?;
            filter_blocks(filters, samples)
        }
        2 => {
            let filters = ChannelFilters::<2>::try_low_pass(sample_rate, cutoff_hz, q)?;
            filter_blocks(filters, samples)
        }
        other => return Err(RenderError::UnsupportedChannels(other)),
    };

    let mut writer = WavWriter::create(output, out_spec)?;
    for &sample in &filtered {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    let summary = RenderSummary {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        frames: filtered.len() / usize::from(spec.channels),
        peak,
    };
    info!(
        input = %input.display(),
        output = %output.display(),
        frames = summary.frames,
        cutoff_hz,
        "rendered file"
    );
    Ok(summary)
}

/// Reads every sample as f32 in `[-1.0, 1.0]`.
fn read_samples<R: std::io::Read>(
    reader: &mut WavReader<R>,
    spec: WavSpec,
) -> Result<Vec<f32>, RenderError> {
    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => {
            let samples = reader.samples::<f32>().collect::<Result<Vec<_>, hound::Error>>()?;
            Ok(samples)
        }
        (SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
            let scale = 1.0 / (1u64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale).map_err(RenderError::from))
                .collect()
        }
        (format, bits) => Err(RenderError::UnsupportedFormat { bits, format }),
    }
}

fn filter_blocks<const CHANNELS: usize>(
    mut filters: ChannelFilters<CHANNELS>,
    mut samples: Vec<f32>,
) -> (Vec<f32>, f32) {
    for block in samples.chunks_mut(BLOCK_LEN * CHANNELS) {
        filters.process_interleaved(block);
    }
    let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    (samples, peak)
}
