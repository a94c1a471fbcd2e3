//! CLI command implementations.
//!
//! Commands orchestrate the various library components to perform user tasks.

pub mod capture;

// Re-export main command functions
pub use capture::{
    capture_from_channel, capture_from_channel_to, execute_capture, process_capture, validate_args,
    CaptureArgs, CaptureExit, CaptureReport,
};
