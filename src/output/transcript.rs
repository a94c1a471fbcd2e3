//! Raw transcript writer.

use super::prepare_output_path;
use crate::utils::error::OutputError;
use chrono::{DateTime, TimeZone};
use log::{debug, info};
use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File name for a transcript: `YYYYMMDD_HHMMSS_<label>.txt`
///
/// Whitespace and path separators in the label become `_`.
pub fn transcript_file_name<Tz>(label: &str, timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let label: String = label
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect();

    format!("{}_{}.txt", timestamp.format("%Y%m%d_%H%M%S"), label)
}

/// Create a new transcript file, suffixing `_1`, `_2`, ... while the name is taken
fn create_unique(base: &Path) -> Result<(PathBuf, File), OutputError> {
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| OutputError::InvalidPath(base.display().to_string()))?
        .to_string();

    let mut path = base.to_path_buf();
    let mut attempt = 0u32;
    loop {
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("Transcript exists, trying next name: {}", path.display());
                attempt += 1;
                path = base.with_file_name(format!("{}_{}.txt", stem, attempt));
            }
            Err(e) => return Err(OutputError::WriteFailed(e)),
        }
    }
}

/// Save the captured lines verbatim, newline-joined
///
/// **Public** - main entry point for the transcript reporter
///
/// # Returns
/// Path of the file written. An existing transcript is never replaced;
/// a numeric suffix is added instead.
///
/// # Errors
/// * `OutputError::InvalidPath` - directory cannot be created
/// * `OutputError::WriteFailed` - I/O error during write
pub fn save_transcript<S, Tz>(
    captures_dir: impl AsRef<Path>,
    lines: &[S],
    label: &str,
    timestamp: &DateTime<Tz>,
) -> Result<PathBuf, OutputError>
where
    S: AsRef<str>,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let base = captures_dir
        .as_ref()
        .join(transcript_file_name(label, timestamp));
    prepare_output_path(&base)?;

    let (path, file) = create_unique(&base)?;
    let mut writer = BufWriter::new(file);

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            writer.write_all(b"\n")?;
        }
        writer.write_all(line.as_ref().as_bytes())?;
    }
    writer.flush()?;

    info!("Raw capture saved to: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 5).unwrap()
    }

    #[test]
    fn test_transcript_file_name() {
        assert_eq!(
            transcript_file_name("jit on", &timestamp()),
            "20261016_093005_jit_on.txt"
        );
        assert_eq!(
            transcript_file_name("a/b", &timestamp()),
            "20261016_093005_a_b.txt"
        );
    }

    #[test]
    fn test_save_transcript_verbatim() {
        let temp_dir = tempfile::tempdir().unwrap();
        let captures = temp_dir.path().join("performance_captures");
        let lines = ["WiFi connected", "(2.07 MIPS)", "plain \u{FFFD} text"];

        let path = save_transcript(&captures, &lines, "baseline", &timestamp()).unwrap();

        assert_eq!(path, captures.join("20261016_093005_baseline.txt"));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "WiFi connected\n(2.07 MIPS)\nplain \u{FFFD} text");
    }

    #[test]
    fn test_same_second_transcripts_do_not_clobber() {
        let temp_dir = tempfile::tempdir().unwrap();
        let captures = temp_dir.path().join("performance_captures");

        let first = save_transcript(&captures, &["run one"], "baseline", &timestamp()).unwrap();
        let second = save_transcript(&captures, &["run two"], "baseline", &timestamp()).unwrap();
        let third = save_transcript(&captures, &["run three"], "baseline", &timestamp()).unwrap();

        assert_eq!(first, captures.join("20261016_093005_baseline.txt"));
        assert_eq!(second, captures.join("20261016_093005_baseline_1.txt"));
        assert_eq!(third, captures.join("20261016_093005_baseline_2.txt"));
        assert_eq!(std::fs::read_to_string(&first).unwrap(), "run one");
        assert_eq!(std::fs::read_to_string(&second).unwrap(), "run two");
    }
}
