//! Single pass over a capture, feeding every extractor.

use super::profiler::{parse_profiler_block, ProfilerBlock};
use super::status::{scan_status, StatusFlags};
use super::throughput::parse_throughput_line;
use crate::utils::config::{PROFILER_END_SENTINEL, PROFILER_START_SENTINEL};
use log::debug;

/// Everything extracted from one capture
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedMetrics {
    /// Throughput samples in arrival order
    pub throughput_samples: Vec<f64>,

    /// Profiler blocks that had at least one recognized field
    pub profiler_blocks: Vec<ProfilerBlock>,

    pub status: StatusFlags,
}

/// Extract all performance metrics from captured lines
///
/// **Public** - main entry point for extraction
///
/// A block still open when the lines run out is dropped. A start
/// sentinel seen inside an open block restarts it.
pub fn extract_metrics<S: AsRef<str>>(lines: &[S]) -> ExtractedMetrics {
    let mut throughput_samples = Vec::new();
    let mut profiler_blocks = Vec::new();

    let mut current_block: Vec<&str> = Vec::new();
    let mut in_block = false;

    for line in lines {
        let line = line.as_ref();

        if let Some(sample) = parse_throughput_line(line) {
            throughput_samples.push(sample);
        }

        if line.contains(PROFILER_START_SENTINEL) {
            in_block = true;
            current_block.clear();
        } else if in_block && line.contains(PROFILER_END_SENTINEL) {
            in_block = false;
            match parse_profiler_block(current_block.as_slice()) {
                Some(block) => profiler_blocks.push(block),
                None => debug!("Discarding profiler block with no recognized fields"),
            }
        } else if in_block {
            current_block.push(line);
        }
    }

    if in_block {
        debug!("Dropping unterminated profiler block ({} lines)", current_block.len());
    }

    debug!(
        "Extracted {} throughput samples, {} profiler blocks",
        throughput_samples.len(),
        profiler_blocks.len()
    );

    ExtractedMetrics {
        throughput_samples,
        profiler_blocks,
        status: scan_status(lines),
    }
}
