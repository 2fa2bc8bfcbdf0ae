//! Capture + playback stream pair running the channel filters.
//!
//! cpal has no duplex streams, so capture and playback are two streams whose
//! callbacks meet in a [`SampleRing`]. The playback callback owns the
//! [`ProcessContext`] and does all the filtering.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{BufferSize, FromSample, Sample, SampleFormat, SizedSample, StreamConfig};
use tracing::{error, info, warn};

use super::DeviceError;
use crate::Signal;
use crate::config::{CHANNELS, Settings};
use crate::realtime::{
    FilterControl, InputSource, ProcessContext, RingProducer, SampleRing, push_capture,
};

/// What feeds the filters.
pub enum StreamInput<'a> {
    /// Capture from an input device.
    Device(&'a cpal::Device),
    /// Generate test input; no capture stream is opened.
    Generator(Box<dyn Signal + Send>),
}

/// An open filtered stream. Created paused; dropping it closes the devices.
pub struct DuplexStream {
    input: Option<cpal::Stream>,
    output: cpal::Stream,
    control: Arc<FilterControl>,
}

impl DuplexStream {
    /// Opens the capture (if any) and playback streams with the fixed stereo
    /// format from `settings`.
    pub fn open(
        settings: &Settings,
        input: StreamInput<'_>,
        output: &cpal::Device,
    ) -> Result<Self, DeviceError> {
        settings.validate()?;
        let control = Arc::new(FilterControl::new(
            settings.sample_rate_hz(),
            settings.cutoff_hz,
            settings.q,
        )?);
        let max_samples = settings.block_samples() * 4;

        let (input_stream, source) = match input {
            StreamInput::Device(device) => {
                let (mut producer, consumer) = SampleRing::with_capacity(settings.ring_capacity());
                // Queue the latency as silence so playback starts behind capture
                let silence = vec![0.0f32; settings.latency_samples()];
                producer.push_slice(&silence);

                let fits = input_buffer_fits(device, settings.block_len);
                let config = stream_config(settings, fits);
                let format = device.default_input_config()?.sample_format();
                let stream = match format {
                    SampleFormat::F32 => {
                        build_input::<f32>(device, &config, producer, &control, max_samples)?
                    }
                    SampleFormat::I16 => {
                        build_input::<i16>(device, &config, producer, &control, max_samples)?
                    }
                    SampleFormat::U16 => {
                        build_input::<u16>(device, &config, producer, &control, max_samples)?
                    }
                    other => return Err(DeviceError::UnsupportedFormat(other)),
                };
                (Some(stream), InputSource::Capture(consumer))
            }
            StreamInput::Generator(signal) => (None, InputSource::Generator(signal)),
        };

        let context = ProcessContext::<CHANNELS>::new(Arc::clone(&control), source, max_samples);
        let config = stream_config(settings, output_buffer_fits(output, settings.block_len));
        let format = output.default_output_config()?.sample_format();
        let output_stream = match format {
            SampleFormat::F32 => build_output::<f32>(output, &config, context)?,
            SampleFormat::I16 => build_output::<i16>(output, &config, context)?,
            SampleFormat::U16 => build_output::<u16>(output, &config, context)?,
            other => return Err(DeviceError::UnsupportedFormat(other)),
        };

        info!(
            sample_rate = settings.sample_rate,
            block_len = settings.block_len,
            cutoff_hz = settings.cutoff_hz,
            q = settings.q,
            capture = input_stream.is_some(),
            "stream opened"
        );
        Ok(Self {
            input: input_stream,
            output: output_stream,
            control,
        })
    }

    /// Starts the callbacks, capture first.
    pub fn start(&self) -> Result<(), DeviceError> {
        if let Some(input) = &self.input {
            input.play()?;
        }
        self.output.play()?;
        info!("stream started");
        Ok(())
    }

    /// Pauses the callbacks, playback first.
    pub fn stop(&self) -> Result<(), DeviceError> {
        self.output.pause()?;
        if let Some(input) = &self.input {
            input.pause()?;
        }
        info!("stream stopped");
        Ok(())
    }

    /// Stops and releases both devices.
    pub fn close(self) -> Result<(), DeviceError> {
        self.stop()?;
        self.control.log_summary();
        info!("stream closed");
        Ok(())
    }

    /// Shared parameters and meters of the running filter.
    pub fn control(&self) -> &Arc<FilterControl> {
        &self.control
    }
}

fn stream_config(settings: &Settings, fixed_block: bool) -> StreamConfig {
    let buffer_size = if fixed_block {
        BufferSize::Fixed(settings.block_len as u32)
    } else {
        warn!(
            block_len = settings.block_len,
            "device rejects the block length, using its default buffer size"
        );
        BufferSize::Default
    };
    StreamConfig {
        channels: CHANNELS as u16,
        sample_rate: cpal::SampleRate(settings.sample_rate),
        buffer_size,
    }
}

fn block_in_range(range: &cpal::SupportedBufferSize, block_len: usize) -> bool {
    match range {
        cpal::SupportedBufferSize::Range { min, max } => {
            (*min as usize..=*max as usize).contains(&block_len)
        }
        cpal::SupportedBufferSize::Unknown => true,
    }
}

fn input_buffer_fits(device: &cpal::Device, block_len: usize) -> bool {
    device
        .default_input_config()
        .map(|config| block_in_range(config.buffer_size(), block_len))
        .unwrap_or(true)
}

fn output_buffer_fits(device: &cpal::Device, block_len: usize) -> bool {
    device
        .default_output_config()
        .map(|config| block_in_range(config.buffer_size(), block_len))
        .unwrap_or(true)
}

/// Builds the capture stream: converts to f32 and queues into the ring.
fn build_input<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut producer: RingProducer,
    control: &Arc<FilterControl>,
    max_samples: usize,
) -> Result<cpal::Stream, DeviceError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let control = Arc::clone(control);
    let mut staging = vec![0.0f32; max_samples];

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            for chunk in data.chunks(staging.len()) {
                let staging = &mut staging[..chunk.len()];
                for (dst, &src) in staging.iter_mut().zip(chunk) {
                    *dst = f32::from_sample(src);
                }
                push_capture(&mut producer, staging, &control);
            }
        },
        |err| error!(%err, "input stream error"),
        None,
    )?;
    Ok(stream)
}

/// Builds the playback stream: runs the context straight into `T` samples,
/// one metered block per callback.
fn build_output<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut context: ProcessContext<CHANNELS>,
) -> Result<cpal::Stream, DeviceError>
where
    T: SizedSample + FromSample<f32>,
{
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            context.process_block_as(data, T::from_sample);
        },
        |err| error!(%err, "output stream error"),
        None,
    )?;
    Ok(stream)
}
