//! Aggregation of extracted samples into a capture summary.
//!
//! This module transforms extracted metrics into:
//! - Throughput statistics (mean, range, spread)
//! - Profiler averages under all-or-nothing field presence
//! - A majority-vote bottleneck and a three-valued link status

pub mod stats;
pub mod summary;

// Re-export main types and functions
pub use stats::{majority_vote, mean, sample_stdev};
pub use summary::{calculate_summary, LinkStatus, ProfilerStats, Summary, ThroughputStats};
