//! Metric extraction from captured device output.
//!
//! This module handles:
//! - Throughput samples from individual lines
//! - Profiler blocks delimited by sentinel lines
//! - Connectivity and failure markers over the whole capture
//!
//! Extraction never fails: lines that do not match are ignored.

pub mod extract;
pub mod profiler;
pub mod status;
pub mod throughput;

// Re-export main types
pub use extract::{extract_metrics, ExtractedMetrics};
pub use profiler::{parse_profiler_block, Bandwidth, Bottleneck, CycleBreakdown, ProfilerBlock};
pub use status::{scan_status, StatusFlags};
pub use throughput::parse_throughput_line;
