//! Serial channel access and port discovery.

use crate::utils::config::{CaptureConfig, PROBE_TIMEOUT, READ_TIMEOUT};
use crate::utils::error::SourceError;
use log::{debug, info};
use serialport::SerialPort;
use std::io::{self, Read};
use std::time::Duration;

/// A byte stream that can report how much data is waiting.
///
/// The capture loop polls `bytes_available` instead of blocking on
/// `read`, so it stays responsive to cancellation.
pub trait Channel: Read {
    /// Number of bytes that can be read without blocking
    fn bytes_available(&mut self) -> io::Result<usize>;
}

/// An open serial port.
///
/// The port is closed when this value is dropped.
pub struct SerialChannel {
    name: String,
    port: Box<dyn SerialPort>,
}

impl SerialChannel {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Read for SerialChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl Channel for SerialChannel {
    fn bytes_available(&mut self) -> io::Result<usize> {
        self.port
            .bytes_to_read()
            .map(|n| n as usize)
            .map_err(io::Error::from)
    }
}

impl Drop for SerialChannel {
    fn drop(&mut self) {
        debug!("Released serial port {}", self.name);
    }
}

/// Open a serial port for capture
///
/// **Public** - main entry point for the line source
///
/// # Errors
/// * `SourceError::OpenFailed` - the device could not be opened
pub fn open_channel(port: &str, baud_rate: u32) -> Result<SerialChannel, SourceError> {
    info!("Connecting to {} at {} baud...", port, baud_rate);
    let handle = open_port(port, baud_rate, READ_TIMEOUT)?;

    Ok(SerialChannel {
        name: port.to_string(),
        port: handle,
    })
}

/// Find the first port among the configured candidates that can be opened
///
/// **Public** - the preferred port is tried first, then each fallback
///
/// # Errors
/// * `SourceError::NoPortAvailable` - none of the candidates opened
pub fn find_serial_port(config: &CaptureConfig) -> Result<String, SourceError> {
    let candidates = config.port_candidates();

    first_openable(&candidates, |port| {
        match open_port(port, config.baud_rate, PROBE_TIMEOUT) {
            Ok(_probe) => true,
            Err(e) => {
                debug!("Port probe failed: {}", e);
                false
            }
        }
    })
    .ok_or_else(|| SourceError::NoPortAvailable(candidates.join(", ")))
}

/// Return the first candidate accepted by `probe`
///
/// **Private** - split out so discovery order can be tested without hardware
fn first_openable<F>(candidates: &[&str], mut probe: F) -> Option<String>
where
    F: FnMut(&str) -> bool,
{
    candidates
        .iter()
        .find(|port| probe(**port))
        .map(|port| port.to_string())
}

fn open_port(
    port: &str,
    baud_rate: u32,
    timeout: Duration,
) -> Result<Box<dyn SerialPort>, SourceError> {
    serialport::new(port, baud_rate)
        .timeout(timeout)
        .open()
        .map_err(|source| SourceError::OpenFailed {
            port: port.to_string(),
            source,
        })
}
