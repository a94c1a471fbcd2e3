//! Console summary report.

use crate::aggregator::Summary;
use std::fmt;
use std::io::{self, Write};

const RULE_WIDTH: usize = 60;

/// Fixed-layout console report for one summary
///
/// The throughput and profiler sections are replaced by a one-line hint
/// when nothing was observed.
pub struct SummaryReport<'a>(pub &'a Summary);

impl fmt::Display for SummaryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.0;
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(f, "\n{}", rule)?;
        writeln!(f, "PERFORMANCE CAPTURE SUMMARY")?;
        writeln!(f, "{}", rule)?;

        writeln!(f, "\nStatus: {}", summary.status)?;

        match &summary.throughput {
            Some(stats) => {
                writeln!(f, "\nMIPS Performance ({} samples):", stats.count)?;
                writeln!(f, "  Average: {:.2} MIPS", stats.mean)?;
                writeln!(f, "  Range:   {:.2} - {:.2} MIPS", stats.min, stats.max)?;
                if let Some(stdev) = stats.stdev {
                    writeln!(f, "  StdDev:  {:.2}", stdev)?;
                }
            }
            None => writeln!(f, "\nNo MIPS data captured (emulator may not have started)")?,
        }

        match &summary.profiler {
            Some(stats) => {
                writeln!(f, "\nProfiler Data ({} samples):", stats.count)?;
                if let Some(cycles) = stats.cycles_avg {
                    writeln!(f, "  Avg cycles/instr: {:.0}", cycles)?;
                }
                if let Some(exec_pct) = stats.exec_pct_avg {
                    writeln!(f, "  Avg exec %:       {:.0}%", exec_pct)?;
                }
                if let Some(bandwidth) = stats.bandwidth_avg_kbps {
                    writeln!(f, "  Avg PSRAM BW:     {:.0} KB/s", bandwidth)?;
                }
                writeln!(f, "  Bottleneck:       {}", stats.bottleneck)?;
            }
            None => writeln!(f, "\nNo profiler data captured (profiler may be disabled)")?,
        }

        write!(f, "\n{}", rule)
    }
}

/// Render the summary as the fixed-layout console report
pub fn render_summary(summary: &Summary) -> String {
    SummaryReport(summary).to_string()
}

/// Write the console report to `out`
///
/// # Errors
/// * I/O error from the writer, such as a closed pipe
pub fn write_summary<W: Write>(out: &mut W, summary: &Summary) -> io::Result<()> {
    writeln!(out, "{}", SummaryReport(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{LinkStatus, ProfilerStats, ThroughputStats};
    use crate::parser::Bottleneck;

    #[test]
    fn test_render_full_summary() {
        let summary = Summary {
            status: LinkStatus::Connected,
            throughput: Some(ThroughputStats {
                count: 3,
                mean: 2.04,
                min: 1.95,
                max: 2.10,
                stdev: Some(0.0794),
            }),
            profiler: Some(ProfilerStats {
                count: 2,
                cycles_avg: Some(123.0),
                exec_pct_avg: Some(89.0),
                bandwidth_avg_kbps: Some(5327.0),
                bottleneck: Bottleneck::Cpu,
            }),
        };

        let report = render_summary(&summary);
        assert!(report.contains("Status: Connected"));
        assert!(report.contains("MIPS Performance (3 samples):"));
        assert!(report.contains("Average: 2.04 MIPS"));
        assert!(report.contains("Range:   1.95 - 2.10 MIPS"));
        assert!(report.contains("StdDev:  0.08"));
        assert!(report.contains("Avg cycles/instr: 123"));
        assert!(report.contains("Avg exec %:       89%"));
        assert!(report.contains("Avg PSRAM BW:     5327 KB/s"));
        assert!(report.contains("Bottleneck:       CPU"));
    }

    #[test]
    fn test_render_empty_summary() {
        let summary = Summary {
            status: LinkStatus::Unknown,
            throughput: None,
            profiler: None,
        };

        let report = render_summary(&summary);
        assert!(report.contains("Status: Unknown"));
        assert!(report.contains("No MIPS data captured"));
        assert!(report.contains("No profiler data captured"));
        assert!(!report.contains("Average:"));
        assert!(!report.contains("Bottleneck:"));
    }

    #[test]
    fn test_render_omits_missing_stdev_and_averages() {
        let summary = Summary {
            status: LinkStatus::Error,
            throughput: Some(ThroughputStats {
                count: 1,
                mean: 2.0,
                min: 2.0,
                max: 2.0,
                stdev: None,
            }),
            profiler: Some(ProfilerStats {
                count: 1,
                cycles_avg: None,
                exec_pct_avg: None,
                bandwidth_avg_kbps: None,
                bottleneck: Bottleneck::Unknown,
            }),
        };

        let report = render_summary(&summary);
        assert!(report.contains("Status: ERROR"));
        assert!(!report.contains("StdDev"));
        assert!(!report.contains("Avg cycles/instr"));
        assert!(report.contains("Bottleneck:       Unknown"));
    }

    #[test]
    fn test_write_summary_reports_closed_pipe() {
        struct ClosedPipe;

        impl Write for ClosedPipe {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let summary = Summary {
            status: LinkStatus::Unknown,
            throughput: None,
            profiler: None,
        };

        let err = write_summary(&mut ClosedPipe, &summary).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
