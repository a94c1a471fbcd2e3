//! Line source: the serial channel and the time-bounded capture over it.
//!
//! This module handles:
//! - Opening a serial channel (with fallback port discovery)
//! - Splitting the byte stream into lossily decoded text lines
//! - Ending the capture on a deadline or on cancellation
//! - Replaying a saved transcript through the same line rules

pub mod cancel;
pub mod channel;
pub mod lines;
pub mod replay;
pub mod stream;

// Re-export main types
pub use cancel::Cancellation;
pub use channel::{find_serial_port, open_channel, Channel, SerialChannel};
pub use lines::LineAssembler;
pub use replay::read_transcript;
pub use stream::{capture_lines, CaptureOutcome, CaptureStream};
