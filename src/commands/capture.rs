//! Capture command implementation.
//!
//! The capture command:
//! 1. Finds and opens a serial port (or loads a saved transcript)
//! 2. Records lines until the window closes or Ctrl-C
//! 3. Extracts metrics
//! 4. Aggregates a summary
//! 5. Prints the report
//! 6. Saves the transcript and appends a ledger row

use crate::aggregator::{calculate_summary, Summary};
use crate::output::{append_ledger_row, save_transcript, write_record, write_summary, CaptureRecord};
use crate::parser::{extract_metrics, ExtractedMetrics};
use crate::source::{
    capture_lines, find_serial_port, open_channel, read_transcript, Cancellation, CaptureOutcome,
    Channel,
};
use crate::utils::config::{CaptureConfig, DEFAULT_LABEL};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use log::{debug, info};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Arguments for the capture command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct CaptureArgs {
    /// Ports, baud rate, window length and output locations
    pub config: CaptureConfig,

    /// Free-text label for the ledger row and transcript name
    pub label: String,

    /// Write the transcript and ledger row
    pub save: bool,

    /// Optional JSON record of the summary
    pub json_output: Option<PathBuf>,

    /// Analyze a saved transcript instead of opening a port
    pub replay: Option<PathBuf>,
}

impl Default for CaptureArgs {
    fn default() -> Self {
        Self {
            config: CaptureConfig::default(),
            label: DEFAULT_LABEL.to_string(),
            save: true,
            json_output: None,
            replay: None,
        }
    }
}

/// Process exit status of a completed capture
///
/// Connection failures and empty captures surface as errors instead
/// and exit with 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureExit {
    Success,
    /// The failure marker appeared in the captured lines
    FailureMarker,
}

impl CaptureExit {
    pub fn code(self) -> i32 {
        match self {
            CaptureExit::Success => 0,
            CaptureExit::FailureMarker => 2,
        }
    }
}

/// What a capture produced
#[derive(Debug, Clone)]
pub struct CaptureReport {
    pub metrics: ExtractedMetrics,
    pub summary: Summary,

    /// Transcript written for this run, if any
    pub transcript: Option<PathBuf>,

    pub exit: CaptureExit,
}

/// Execute the capture command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Capture command arguments
/// * `cancel` - Ends a live capture early when cancelled
///
/// # Errors
/// * No serial port could be opened
/// * Zero lines were captured
/// * Transcript, ledger or JSON write failures
pub fn execute_capture(args: &CaptureArgs, cancel: &Cancellation) -> Result<CaptureReport> {
    let started_at = Local::now();

    let outcome = match &args.replay {
        Some(path) => {
            info!("Replaying transcript: {}", path.display());
            let start = Instant::now();
            let lines = read_transcript(path)
                .with_context(|| format!("Failed to read transcript {}", path.display()))?;
            CaptureOutcome {
                lines,
                elapsed: start.elapsed(),
                interrupted: false,
            }
        }
        None => live_capture(&args.config, cancel)?,
    };

    process_capture(&outcome, args, started_at)
}

/// Find a port, open it and capture for the configured window
///
/// **Private** - internal helper for execute_capture
fn live_capture(config: &CaptureConfig, cancel: &Cancellation) -> Result<CaptureOutcome> {
    let port = find_serial_port(config).context("Could not find serial port")?;
    if port != config.preferred_port {
        say(
            &mut io::stdout().lock(),
            &format!("Note: Using {} instead of {}", port, config.preferred_port),
        );
    }

    let channel = open_channel(&port, config.baud_rate).context("Could not open serial port")?;

    Ok(capture_from_channel(channel, config, cancel))
}

/// Capture from an already open channel, echoing lines to stdout
///
/// **Public** - lets callers supply their own channel
pub fn capture_from_channel<C: Channel>(
    channel: C,
    config: &CaptureConfig,
    cancel: &Cancellation,
) -> CaptureOutcome {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    capture_from_channel_to(channel, config, cancel, &mut out)
}

/// Capture from an already open channel, echoing lines and banners to `out`
///
/// **Public** - write failures on `out` are logged, never fatal, so a
/// closed pipe cannot lose the capture
pub fn capture_from_channel_to<C, W>(
    channel: C,
    config: &CaptureConfig,
    cancel: &Cancellation,
    out: &mut W,
) -> CaptureOutcome
where
    C: Channel,
    W: Write,
{
    let rule = "-".repeat(60);
    say(out, &format!("Capturing for {} seconds...", config.duration.as_secs()));
    say(out, &rule);

    let outcome = capture_lines(channel, config.duration, config.poll_interval, cancel, &mut *out);

    if outcome.interrupted {
        say(out, "\n[Capture stopped by user]");
    } else {
        say(out, &rule);
        say(
            out,
            &format!(
                "Capture complete. {} lines in {:.1}s",
                outcome.lines.len(),
                outcome.elapsed.as_secs_f64()
            ),
        );
    }

    outcome
}

/// Write one console line, logging instead of failing on I/O errors
///
/// **Private** - console output is best-effort
fn say<W: Write>(out: &mut W, text: &str) {
    if let Err(e) = writeln!(out, "{}", text) {
        debug!("Console write failed: {}", e);
    }
}

/// Extract, summarize and report on captured lines
///
/// **Public** - shared by live and replayed captures
///
/// # Arguments
/// * `outcome` - Lines from the capture window
/// * `args` - Label and output settings
/// * `started_at` - Capture start, used to name the transcript
///
/// # Errors
/// * Zero lines were captured
/// * Transcript, ledger or JSON write failures
pub fn process_capture(
    outcome: &CaptureOutcome,
    args: &CaptureArgs,
    started_at: DateTime<Local>,
) -> Result<CaptureReport> {
    if outcome.lines.is_empty() {
        anyhow::bail!("No data captured!");
    }

    let metrics = extract_metrics(outcome.lines.as_slice());
    let summary = calculate_summary(&metrics);

    if let Err(e) = write_summary(&mut io::stdout().lock(), &summary) {
        debug!("Console write failed: {}", e);
    }

    let mut transcript = None;
    if args.save {
        // A replayed transcript is already on disk
        if args.replay.is_none() {
            let path = save_transcript(
                args.config.captures_dir(),
                outcome.lines.as_slice(),
                &args.label,
                &started_at,
            )
            .context("Failed to save raw capture")?;
            transcript = Some(path);
        }

        append_ledger_row(args.config.ledger_path(), &summary, &args.label, &Local::now())
            .context("Failed to update tracking ledger")?;
    } else {
        debug!("Persistence disabled, skipping transcript and ledger");
    }

    if let Some(json_path) = &args.json_output {
        let record = CaptureRecord {
            label: args.label.clone(),
            captured_at: started_at.to_rfc3339(),
            elapsed_secs: outcome.elapsed.as_secs_f64(),
            line_count: outcome.lines.len(),
            interrupted: outcome.interrupted,
            summary: summary.clone(),
        };
        write_record(&record, json_path).context("Failed to write summary JSON")?;
    }

    let exit = if metrics.status.failure {
        say(
            &mut io::stdout().lock(),
            "\nWARNING: Failure marker detected! Check the capture.",
        );
        CaptureExit::FailureMarker
    } else {
        CaptureExit::Success
    };

    Ok(CaptureReport {
        metrics,
        summary,
        transcript,
        exit,
    })
}

/// Validate capture arguments
///
/// **Public** - can be called before execute_capture for early validation
pub fn validate_args(args: &CaptureArgs) -> Result<()> {
    if args.config.duration == Duration::ZERO {
        anyhow::bail!("Duration must be greater than 0");
    }

    if args.label.trim().is_empty() {
        anyhow::bail!("Label cannot be empty");
    }

    if args.replay.is_none() && args.config.preferred_port.is_empty() {
        anyhow::bail!("Serial port cannot be empty");
    }

    if args.config.baud_rate == 0 {
        anyhow::bail!("Baud rate must be greater than 0");
    }

    Ok(())
}
