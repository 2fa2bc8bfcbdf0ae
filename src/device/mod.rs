//! Audio device glue over cpal.
//!
//! Enumeration and selection live in [`select`]; the filtered stream pair
//! lives in [`stream`].

mod select;
mod stream;

use thiserror::Error;

use crate::FilterError;

pub use select::{DeviceInfo, Direction, default_device, device_at, list_devices};
pub use stream::{DuplexStream, StreamInput};

/// Errors from device discovery and stream lifecycle.
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("failed to enumerate audio devices: {0}")]
    Devices(#[from] cpal::DevicesError),
    #[error("no audio device at index {0}")]
    NoSuchDevice(usize),
    #[error("device {index} has no {direction} channels")]
    WrongDirection { index: usize, direction: Direction },
    #[error("no default {0} device available")]
    NoDefault(Direction),
    #[error("failed to query the default stream config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("unsupported sample format {0}")]
    UnsupportedFormat(cpal::SampleFormat),
    #[error("failed to build stream: {0}")]
    Build(#[from] cpal::BuildStreamError),
    #[error("failed to start stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
    #[error("failed to stop stream: {0}")]
    Pause(#[from] cpal::PauseStreamError),
    #[error(transparent)]
    Filter(#[from] FilterError),
}
