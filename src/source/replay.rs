//! Reads a saved transcript back as captured lines.

use super::lines::LineAssembler;
use crate::utils::error::SourceError;
use log::debug;
use std::path::Path;

/// Load a transcript file, applying the same line rules as a live capture
///
/// # Errors
/// * `SourceError::ReadFailed` - the file could not be read
pub fn read_transcript(path: impl AsRef<Path>) -> Result<Vec<String>, SourceError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;

    let mut assembler = LineAssembler::new();
    let mut lines = assembler.push(&bytes);
    lines.extend(assembler.finish());

    debug!("Replayed {} lines from {}", lines.len(), path.display());
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_transcript_without_trailing_newline() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "WiFi connected\n(2.07 MIPS)").unwrap();

        let lines = read_transcript(file.path()).unwrap();
        assert_eq!(lines, vec!["WiFi connected", "(2.07 MIPS)"]);
    }

    #[test]
    fn test_read_transcript_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_transcript(dir.path().join("missing.txt")).is_err());
    }
}
