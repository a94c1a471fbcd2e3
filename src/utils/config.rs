//! Configuration and constants for the CLI.

use std::path::PathBuf;
use std::time::Duration;

/// Preferred serial device
pub const DEFAULT_SERIAL_PORT: &str = "/dev/cu.usbmodem11401";

/// Devices tried in order when the preferred one cannot be opened
pub const BACKUP_SERIAL_PORTS: &[&str] = &[
    "/dev/cu.usbmodem211401",
    "/dev/cu.usbmodem11301",
    "/dev/ttyUSB0",
];

pub const BAUD_RATE: u32 = 115_200;

/// Default capture window in seconds
pub const DEFAULT_DURATION_SECS: u64 = 60;

pub const DEFAULT_LABEL: &str = "capture";

/// Idle sleep between polls when no bytes are waiting
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Read timeout used while probing candidate ports
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(100);

/// Read timeout used for the capture itself
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

// Output locations, relative to the docs directory
pub const DEFAULT_DOCS_DIR: &str = "docs";
pub const LEDGER_FILE_NAME: &str = "PERFORMANCE_TRACKING.md";
pub const CAPTURES_DIR_NAME: &str = "performance_captures";

// Fixed markers in the device output
pub const THROUGHPUT_UNIT: &str = "MIPS";
pub const PROFILER_START_SENTINEL: &str = "========== CPU PROFILER ==========";
pub const PROFILER_END_SENTINEL: &str = "==================================";
pub const CONNECTED_MARKER: &str = "WiFi connected";
/// Matched case-insensitively
pub const FAILURE_MARKER: &str = "assert failed";

/// Everything the line source and reporters need for one run.
///
/// Built once from the command line and handed down explicitly.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Port to try first
    pub preferred_port: String,

    /// Ports tried after the preferred one, in order
    pub fallback_ports: Vec<String>,

    pub baud_rate: u32,

    /// Length of the capture window
    pub duration: Duration,

    /// Idle sleep between polls
    pub poll_interval: Duration,

    /// Directory holding the ledger and the transcript directory
    pub docs_dir: PathBuf,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            preferred_port: DEFAULT_SERIAL_PORT.to_string(),
            fallback_ports: BACKUP_SERIAL_PORTS.iter().map(|p| p.to_string()).collect(),
            baud_rate: BAUD_RATE,
            duration: Duration::from_secs(DEFAULT_DURATION_SECS),
            poll_interval: POLL_INTERVAL,
            docs_dir: PathBuf::from(DEFAULT_DOCS_DIR),
        }
    }
}

impl CaptureConfig {
    /// Preferred port followed by the fallbacks, without duplicates
    pub fn port_candidates(&self) -> Vec<&str> {
        let mut candidates: Vec<&str> = vec![self.preferred_port.as_str()];
        for port in &self.fallback_ports {
            if !candidates.contains(&port.as_str()) {
                candidates.push(port);
            }
        }
        candidates
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.docs_dir.join(LEDGER_FILE_NAME)
    }

    pub fn captures_dir(&self) -> PathBuf {
        self.docs_dir.join(CAPTURES_DIR_NAME)
    }
}
