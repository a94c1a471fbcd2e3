//! Reduce extracted metrics into a capture summary.

use super::stats::{majority_vote, max, mean, min, sample_stdev};
use crate::parser::{Bottleneck, ExtractedMetrics, ProfilerBlock, StatusFlags};
use log::debug;
use serde::Serialize;
use std::fmt;

/// Link status derived from the status markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkStatus {
    /// Failure marker seen; wins over the connected marker
    #[serde(rename = "ERROR")]
    Error,
    Connected,
    Unknown,
}

impl LinkStatus {
    pub fn from_flags(flags: StatusFlags) -> Self {
        if flags.failure {
            LinkStatus::Error
        } else if flags.connected {
            LinkStatus::Connected
        } else {
            LinkStatus::Unknown
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LinkStatus::Error => "ERROR",
            LinkStatus::Connected => "Connected",
            LinkStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Throughput statistics; only built when at least one sample exists
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThroughputStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,

    /// Needs two or more samples
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdev: Option<f64>,
}

/// Profiler statistics; only built when at least one block exists.
///
/// An average is present only if every block carried its field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfilerStats {
    pub count: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycles_avg: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exec_pct_avg: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth_avg_kbps: Option<f64>,

    /// Majority vote; blocks without a tag vote `Unknown`
    pub bottleneck: Bottleneck,
}

/// Summary of one capture.
///
/// Absent sections mean "not observed", never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub status: LinkStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub throughput: Option<ThroughputStats>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiler: Option<ProfilerStats>,
}

/// Calculate summary statistics from extracted metrics
///
/// **Public** - main entry point for aggregation
pub fn calculate_summary(metrics: &ExtractedMetrics) -> Summary {
    let summary = Summary {
        status: LinkStatus::from_flags(metrics.status),
        throughput: throughput_stats(&metrics.throughput_samples),
        profiler: profiler_stats(&metrics.profiler_blocks),
    };

    debug!("Summary: {:?}", summary);
    summary
}

fn throughput_stats(samples: &[f64]) -> Option<ThroughputStats> {
    Some(ThroughputStats {
        count: samples.len(),
        mean: mean(samples)?,
        min: min(samples)?,
        max: max(samples)?,
        stdev: sample_stdev(samples),
    })
}

fn profiler_stats(blocks: &[ProfilerBlock]) -> Option<ProfilerStats> {
    if blocks.is_empty() {
        return None;
    }

    Some(ProfilerStats {
        count: blocks.len(),
        cycles_avg: strict_mean(blocks, ProfilerBlock::total_cycles),
        exec_pct_avg: strict_mean(blocks, ProfilerBlock::exec_pct),
        bandwidth_avg_kbps: strict_mean(blocks, ProfilerBlock::bandwidth_total_kbps),
        bottleneck: majority_vote(
            blocks
                .iter()
                .map(|b| b.bottleneck.unwrap_or(Bottleneck::Unknown)),
        )
        .unwrap_or(Bottleneck::Unknown),
    })
}

/// Mean of a field across all blocks, or `None` if any block lacks it
fn strict_mean<F>(blocks: &[ProfilerBlock], field: F) -> Option<f64>
where
    F: Fn(&ProfilerBlock) -> Option<u64>,
{
    let values = blocks
        .iter()
        .map(|b| field(b).map(|v| v as f64))
        .collect::<Option<Vec<f64>>>()?;
    mean(&values)
}
