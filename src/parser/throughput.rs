//! Instruction throughput samples.
//!
//! Example line:
//! `[IPS] 2074192 instructions/sec (2.07 MIPS), total: 132120000`

use regex::Regex;
use std::sync::LazyLock;

/// Parenthesized decimal followed by the unit label.
static THROUGHPUT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([0-9]+\.?[0-9]*)\s*MIPS\)").unwrap());

/// Extract the throughput sample from a line, if it carries one
pub fn parse_throughput_line(line: &str) -> Option<f64> {
    THROUGHPUT_PATTERN
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}
