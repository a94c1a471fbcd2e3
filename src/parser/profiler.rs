//! CPU profiler block parsing.
//!
//! A profiler block is the run of lines between the start sentinel
//! `========== CPU PROFILER ==========` and the end sentinel (a bare
//! row of `=`). Inside it, three sub-patterns may appear:
//!
//! ```text
//! Cycles/instr: fetch=14 (11%) exec=109 (89%) total=123
//! PSRAM bandwidth: read=3204KB/s write=2122KB/s total=5327KB/s
//! BOTTLENECK: CPU
//! ```
//!
//! Each sub-pattern is all-or-nothing: a cycles line missing any of its
//! five fields contributes nothing.

use log::debug;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

static CYCLES_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"Cycles/instr:\s*fetch=([0-9]+)\s*\(([0-9]+)%\)\s*exec=([0-9]+)\s*\(([0-9]+)%\)\s*total=([0-9]+)",
    )
    .unwrap()
});

static BANDWIDTH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"PSRAM bandwidth:\s*read=([0-9]+)KB/s\s*write=([0-9]+)KB/s\s*total=([0-9]+)KB/s")
        .unwrap()
});

/// Per-instruction cycle accounting from one profiler block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleBreakdown {
    pub fetch_cycles: u64,
    pub fetch_pct: u64,
    pub exec_cycles: u64,
    pub exec_pct: u64,
    pub total_cycles: u64,
}

/// Memory bandwidth figures in KB/s
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bandwidth {
    pub read_kbps: u64,
    pub write_kbps: u64,
    pub total_kbps: u64,
}

/// Subsystem limiting performance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Bottleneck {
    #[serde(rename = "CPU")]
    Cpu,
    #[serde(rename = "PSRAM")]
    Psram,
    /// Block carried no bottleneck marker
    Unknown,
}

impl Bottleneck {
    pub fn label(&self) -> &'static str {
        match self {
            Bottleneck::Cpu => "CPU",
            Bottleneck::Psram => "PSRAM",
            Bottleneck::Unknown => "Unknown",
        }
    }

    /// Detect a bottleneck marker line
    fn from_line(line: &str) -> Option<Self> {
        if line.contains("BOTTLENECK: CPU") {
            Some(Bottleneck::Cpu)
        } else if line.contains("BOTTLENECK: PSRAM") {
            Some(Bottleneck::Psram)
        } else {
            None
        }
    }
}

impl fmt::Display for Bottleneck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fields recognized inside one profiler block.
///
/// Each group is `None` when its sub-pattern never matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfilerBlock {
    pub cycles: Option<CycleBreakdown>,
    pub bandwidth: Option<Bandwidth>,
    pub bottleneck: Option<Bottleneck>,
}

impl ProfilerBlock {
    /// True if no sub-pattern matched
    pub fn is_empty(&self) -> bool {
        self.cycles.is_none() && self.bandwidth.is_none() && self.bottleneck.is_none()
    }

    pub fn total_cycles(&self) -> Option<u64> {
        self.cycles.map(|c| c.total_cycles)
    }

    pub fn exec_pct(&self) -> Option<u64> {
        self.cycles.map(|c| c.exec_pct)
    }

    pub fn bandwidth_total_kbps(&self) -> Option<u64> {
        self.bandwidth.map(|b| b.total_kbps)
    }
}

/// Parse the lines between the sentinels of one profiler block
///
/// **Public** - returns `None` when no sub-pattern matched, so empty
/// blocks never reach the aggregator
///
/// A later match of the same sub-pattern overwrites an earlier one.
pub fn parse_profiler_block<S: AsRef<str>>(lines: &[S]) -> Option<ProfilerBlock> {
    let mut block = ProfilerBlock::default();

    for line in lines {
        let line = line.as_ref();

        if let Some(cycles) = parse_cycles(line) {
            block.cycles = Some(cycles);
        }

        if let Some(bandwidth) = parse_bandwidth(line) {
            block.bandwidth = Some(bandwidth);
        }

        if let Some(bottleneck) = Bottleneck::from_line(line) {
            block.bottleneck = Some(bottleneck);
        }
    }

    if block.is_empty() {
        None
    } else {
        Some(block)
    }
}

fn parse_cycles(line: &str) -> Option<CycleBreakdown> {
    let caps = CYCLES_PATTERN.captures(line)?;
    Some(CycleBreakdown {
        fetch_cycles: parse_field(&caps[1]),
        fetch_pct: parse_field(&caps[2]),
        exec_cycles: parse_field(&caps[3]),
        exec_pct: parse_field(&caps[4]),
        total_cycles: parse_field(&caps[5]),
    })
}

fn parse_bandwidth(line: &str) -> Option<Bandwidth> {
    let caps = BANDWIDTH_PATTERN.captures(line)?;
    Some(Bandwidth {
        read_kbps: parse_field(&caps[1]),
        write_kbps: parse_field(&caps[2]),
        total_kbps: parse_field(&caps[3]),
    })
}

/// Parse a matched ASCII digit run, saturating values too large for `u64`
fn parse_field(digits: &str) -> u64 {
    digits.parse().unwrap_or_else(|e| {
        debug!("Profiler field {} out of range ({}), saturating", digits, e);
        u64::MAX
    })
}
