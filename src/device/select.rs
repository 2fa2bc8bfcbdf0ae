//! Device discovery and selection by index.

use std::fmt;

use cpal::traits::{DeviceTrait, HostTrait};
use tracing::{debug, info};

use super::DeviceError;

/// Direction of an audio device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

/// One enumerated device. `index` is its position in the host's device list
/// and is what [`device_at`] expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub index: usize,
    pub host: &'static str,
    pub name: String,
    pub has_input: bool,
    pub has_output: bool,
}

impl DeviceInfo {
    pub fn supports(&self, direction: Direction) -> bool {
        match direction {
            Direction::Input => self.has_input,
            Direction::Output => self.has_output,
        }
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [{}] {}", self.index, self.host, self.name)
    }
}

fn device_name(device: &cpal::Device) -> String {
    device.name().unwrap_or_else(|_| "<unnamed device>".to_string())
}

fn has_direction(device: &cpal::Device, direction: Direction) -> bool {
    match direction {
        Direction::Input => device
            .supported_input_configs()
            .map(|mut configs| configs.next().is_some())
            .unwrap_or(false),
        Direction::Output => device
            .supported_output_configs()
            .map(|mut configs| configs.next().is_some())
            .unwrap_or(false),
    }
}

/// Lists every device of `host` with its capabilities.
pub fn list_devices(host: &cpal::Host) -> Result<Vec<DeviceInfo>, DeviceError> {
    let host_name = host.id().name();
    let devices = host
        .devices()?
        .enumerate()
        .map(|(index, device)| DeviceInfo {
            index,
            host: host_name,
            name: device_name(&device),
            has_input: has_direction(&device, Direction::Input),
            has_output: has_direction(&device, Direction::Output),
        })
        .collect::<Vec<_>>();
    debug!(count = devices.len(), host = host_name, "enumerated audio devices");
    Ok(devices)
}

/// Returns the device at `index`, checking it supports `direction`.
pub fn device_at(
    host: &cpal::Host,
    index: usize,
    direction: Direction,
) -> Result<cpal::Device, DeviceError> {
    let device = host
        .devices()?
        .nth(index)
        .ok_or(DeviceError::NoSuchDevice(index))?;
    if !has_direction(&device, direction) {
        return Err(DeviceError::WrongDirection { index, direction });
    }
    info!(index, name = %device_name(&device), %direction, "selected audio device");
    Ok(device)
}

/// Returns the host's default device for `direction`.
pub fn default_device(
    host: &cpal::Host,
    direction: Direction,
) -> Result<cpal::Device, DeviceError> {
    let device = match direction {
        Direction::Input => host.default_input_device(),
        Direction::Output => host.default_output_device(),
    }
    .ok_or(DeviceError::NoDefault(direction))?;
    info!(name = %device_name(&device), %direction, "using default audio device");
    Ok(device)
}
