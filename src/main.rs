//! Perf Capture CLI
//!
//! Captures serial output from a device, extracts performance metrics
//! and logs them to the performance tracking ledger.

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::info;
use std::path::PathBuf;
use std::time::Duration;

use perf_capture::commands::{execute_capture, validate_args, CaptureArgs};
use perf_capture::source::Cancellation;
use perf_capture::utils::config::{
    CaptureConfig, BAUD_RATE, DEFAULT_DOCS_DIR, DEFAULT_DURATION_SECS, DEFAULT_LABEL,
    DEFAULT_SERIAL_PORT,
};

/// Perf Capture - capture and analyze device performance output
#[derive(Parser, Debug)]
#[command(name = "perf-capture")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Capture duration in seconds
    #[arg(short, long, default_value_t = DEFAULT_DURATION_SECS)]
    duration: u64,

    /// Label for this capture
    #[arg(short, long, default_value = DEFAULT_LABEL)]
    label: String,

    /// Serial port (fallback ports are tried if it cannot be opened)
    #[arg(short, long, env = "PERF_CAPTURE_PORT", default_value = DEFAULT_SERIAL_PORT)]
    port: String,

    /// Serial baud rate
    #[arg(long, default_value_t = BAUD_RATE)]
    baud: u32,

    /// Directory holding the tracking ledger and raw captures
    #[arg(long, env = "PERF_CAPTURE_DOCS_DIR", default_value = DEFAULT_DOCS_DIR)]
    docs_dir: PathBuf,

    /// Do not save raw capture or update tracking ledger
    #[arg(long)]
    no_save: bool,

    /// Also write the summary as JSON to this path
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Analyze a saved transcript instead of reading the serial port
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Ctrl-C ends the capture window early; captured lines are still processed
    let cancel = Cancellation::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        info!("Received interrupt signal, ending capture");
        handler_token.cancel();
    })
    .context("Failed to install Ctrl-C handler")?;

    let args = CaptureArgs {
        config: CaptureConfig {
            preferred_port: cli.port,
            baud_rate: cli.baud,
            duration: Duration::from_secs(cli.duration),
            docs_dir: cli.docs_dir,
            ..Default::default()
        },
        label: cli.label,
        save: !cli.no_save,
        json_output: cli.json,
        replay: cli.replay,
    };

    validate_args(&args)?;

    let report = execute_capture(&args, &cancel)?;

    let code = report.exit.code();
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
