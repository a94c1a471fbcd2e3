//! Append-only Markdown ledger, one row per capture.

use super::prepare_output_path;
use crate::aggregator::Summary;
use crate::utils::error::OutputError;
use chrono::{DateTime, TimeZone};
use log::{debug, info};
use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Written once when the ledger does not exist yet
pub const LEDGER_HEADER: &str = "# Performance Tracking

This document tracks performance measurements over time.

## Measurements

| Date | Label | MIPS (avg) | MIPS (range) | Cycles/instr | Exec % | PSRAM BW | Bottleneck | Status |
|------|-------|------------|--------------|--------------|--------|----------|------------|--------|
";

const NOT_AVAILABLE: &str = "N/A";

/// Create the ledger with its header if it is missing
///
/// **Public** - never touches an existing file
///
/// # Returns
/// `true` if the file was created by this call
///
/// # Errors
/// * `OutputError::InvalidPath` - path is empty, a directory, or its parent cannot be created
/// * `OutputError::WriteFailed` - I/O error while writing the header
pub fn ensure_ledger(path: impl AsRef<Path>) -> Result<bool, OutputError> {
    let path = path.as_ref();
    prepare_output_path(path)?;

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            debug!("Ledger already exists: {}", path.display());
            return Ok(false);
        }
        Err(e) => return Err(OutputError::WriteFailed(e)),
    };

    file.write_all(LEDGER_HEADER.as_bytes())?;
    info!("Created ledger: {}", path.display());
    Ok(true)
}

/// Format one ledger row, rendering absent statistics as `N/A`
pub fn format_ledger_row<Tz>(summary: &Summary, label: &str, timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let throughput = summary.throughput.as_ref();
    let profiler = summary.profiler.as_ref();

    let mips_avg = throughput.map(|t| format!("{:.2}", t.mean));
    let mips_range = throughput.map(|t| format!("{:.2}-{:.2}", t.min, t.max));
    let cycles = profiler
        .and_then(|p| p.cycles_avg)
        .map(|c| format!("{:.0}", c));
    let exec_pct = profiler
        .and_then(|p| p.exec_pct_avg)
        .map(|e| format!("{:.0}%", e));
    let bandwidth = profiler
        .and_then(|p| p.bandwidth_avg_kbps)
        .map(|b| format!("{:.0} KB/s", b));
    let bottleneck = profiler.map(|p| p.bottleneck.to_string());

    format!(
        "| {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
        timestamp.format("%Y-%m-%d %H:%M"),
        escape_cell(label),
        or_na(mips_avg),
        or_na(mips_range),
        or_na(cycles),
        or_na(exec_pct),
        or_na(bandwidth),
        or_na(bottleneck),
        summary.status,
    )
}

/// Append one row for this capture, creating the ledger first if needed
///
/// **Public** - main entry point for the ledger reporter
///
/// # Errors
/// * `OutputError::InvalidPath` - ledger path is unusable
/// * `OutputError::WriteFailed` - I/O error while appending
pub fn append_ledger_row<Tz>(
    path: impl AsRef<Path>,
    summary: &Summary,
    label: &str,
    timestamp: &DateTime<Tz>,
) -> Result<(), OutputError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let path = path.as_ref();
    ensure_ledger(path)?;

    let row = format_ledger_row(summary, label, timestamp);
    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(row.as_bytes())?;

    info!("Results appended to: {}", path.display());
    Ok(())
}

fn or_na(cell: Option<String>) -> String {
    cell.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Keep free-text labels from breaking the table
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{LinkStatus, ProfilerStats, ThroughputStats};
    use crate::parser::Bottleneck;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
    }

    fn full_summary() -> Summary {
        Summary {
            status: LinkStatus::Connected,
            throughput: Some(ThroughputStats {
                count: 3,
                mean: 2.04,
                min: 1.95,
                max: 2.1,
                stdev: Some(0.08),
            }),
            profiler: Some(ProfilerStats {
                count: 1,
                cycles_avg: Some(123.0),
                exec_pct_avg: Some(89.0),
                bandwidth_avg_kbps: Some(5327.0),
                bottleneck: Bottleneck::Cpu,
            }),
        }
    }

    #[test]
    fn test_format_full_row() {
        let row = format_ledger_row(&full_summary(), "baseline", &timestamp());
        assert_eq!(
            row,
            "| 2026-10-16 09:30 | baseline | 2.04 | 1.95-2.10 | 123 | 89% | 5327 KB/s | CPU | Connected |\n"
        );
    }

    #[test]
    fn test_format_empty_row() {
        let summary = Summary {
            status: LinkStatus::Unknown,
            throughput: None,
            profiler: None,
        };

        let row = format_ledger_row(&summary, "capture", &timestamp());
        assert_eq!(
            row,
            "| 2026-10-16 09:30 | capture | N/A | N/A | N/A | N/A | N/A | N/A | Unknown |\n"
        );
    }

    #[test]
    fn test_label_pipe_escaped() {
        let row = format_ledger_row(&full_summary(), "a|b", &timestamp());
        assert!(row.contains("| a\\|b |"));
    }

    #[test]
    fn test_bootstrap_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("docs/PERFORMANCE_TRACKING.md");

        append_ledger_row(&path, &full_summary(), "first", &timestamp()).unwrap();
        append_ledger_row(&path, &full_summary(), "second", &timestamp()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("# Performance Tracking").count(), 1);
        assert_eq!(contents.matches("| Date | Label |").count(), 1);

        let data_rows: Vec<&str> = contents
            .lines()
            .filter(|l| l.starts_with("| 2026-"))
            .collect();
        assert_eq!(data_rows.len(), 2);
        assert!(data_rows[0].contains("| first |"));
        assert!(data_rows[1].contains("| second |"));
    }

    #[test]
    fn test_existing_ledger_not_overwritten() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ledger.md");
        std::fs::write(&path, "custom header\n").unwrap();

        assert!(!ensure_ledger(&path).unwrap());
        append_ledger_row(&path, &full_summary(), "run", &timestamp()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("custom header\n"));
        assert!(!contents.contains("# Performance Tracking"));
        assert_eq!(contents.lines().count(), 2);
    }
}
