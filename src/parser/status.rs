//! Whole-capture status markers.

use crate::utils::config::{CONNECTED_MARKER, FAILURE_MARKER};

/// Connectivity markers seen anywhere in a capture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusFlags {
    /// The "connected" marker appeared on some line
    pub connected: bool,

    /// The failure marker appeared on some line (case-insensitive)
    pub failure: bool,
}

/// Scan every line for the connected and failure markers
pub fn scan_status<S: AsRef<str>>(lines: &[S]) -> StatusFlags {
    let failure_marker = FAILURE_MARKER.to_lowercase();

    StatusFlags {
        connected: lines.iter().any(|l| l.as_ref().contains(CONNECTED_MARKER)),
        failure: lines
            .iter()
            .any(|l| l.as_ref().to_lowercase().contains(&failure_marker)),
    }
}
