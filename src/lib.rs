//! Perf Capture
//!
//! Records the text output of a serial device for a fixed window,
//! extracts performance indicators (instruction throughput, cycle
//! breakdown, memory bandwidth, connectivity) and appends a summary
//! row to a Markdown tracking ledger.
//!
//! This crate provides the core implementation for the
//! `perf-capture` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! perf-capture --duration 30 --label baseline
//! perf-capture --replay docs/performance_captures/20261016_093005_baseline.txt --no-save
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod source;
pub mod utils;
