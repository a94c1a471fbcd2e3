//! Reporters for capture results.
//!
//! This module handles:
//! - The console summary report
//! - The append-only Markdown ledger
//! - Raw transcript files
//! - Optional JSON capture records

pub mod console;
pub mod json;
pub mod ledger;
pub mod transcript;

// Re-export main functions
pub use console::{render_summary, write_summary, SummaryReport};
pub use json::{write_record, CaptureRecord};
pub use ledger::{append_ledger_row, ensure_ledger, format_ledger_row, LEDGER_HEADER};
pub use transcript::{save_transcript, transcript_file_name};

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

/// Reject empty paths and directories, and create missing parent directories
///
/// **Private** - shared by the file reporters
fn prepare_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}
