//! JSON capture record writer.
//!
//! Writes the summary of one capture, plus run metadata, as pretty JSON.

use super::prepare_output_path;
use crate::aggregator::Summary;
use crate::utils::error::OutputError;
use log::info;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Summary plus the metadata of the run that produced it
#[derive(Debug, Clone, Serialize)]
pub struct CaptureRecord {
    pub label: String,

    /// RFC 3339 timestamp of the capture start
    pub captured_at: String,

    pub elapsed_secs: f64,

    pub line_count: usize,

    /// Capture ended early on Ctrl-C
    pub interrupted: bool,

    pub summary: Summary,
}

/// Write a capture record to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_record(record: &CaptureRecord, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    prepare_output_path(output_path)?;

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, record)?;
    writer.flush()?;

    info!("Summary JSON written to: {}", output_path.display());
    Ok(())
}
