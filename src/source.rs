//! Loading export files into records.

use crate::error::{Result, WosError};
use crate::record::Record;
use crate::tokenizer::tokenize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Read a file as lines without terminators. A leading byte order mark is
/// dropped.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    Ok(content.lines().map(str::to_string).collect())
}

/// Tokenize each file and concatenate the records in file order.
pub fn load_records(paths: &[PathBuf]) -> Result<Vec<Record>> {
    let mut records = Vec::new();

    for path in paths {
        let lines = read_lines(path)?;
        let parsed = tokenize(lines.iter().map(String::as_str)).map_err(|e| match e {
            WosError::MalformedLine { line_number, line } => WosError::MalformedLine {
                line_number,
                line: format!("{} ({})", line, path.display()),
            },
            other => other,
        })?;
        debug!(path = ?path, lines = lines.len(), records = parsed.len(), "Loaded file");
        records.extend(parsed);
    }

    info!(files = paths.len(), records = records.len(), "Loaded records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_lines_strips_bom_and_crlf() -> Result<()> {
        let mut temp = NamedTempFile::new()?;
        write!(temp, "\u{feff}FN Export\r\nVR 1.0\r\n\r\nPT J\r\n")?;

        let lines = read_lines(temp.path())?;
        assert_eq!(lines, ["FN Export", "VR 1.0", "", "PT J"]);
        Ok(())
    }

    #[test]
    fn test_load_records_in_file_order() -> Result<()> {
        let mut first = NamedTempFile::new()?;
        writeln!(first, "PT J\nAU Smith J\nER\n\nEF")?;
        let mut second = NamedTempFile::new()?;
        writeln!(second, "PT J\nAU Lee K\n   Wong P\nER\nEF")?;

        let records = load_records(&[first.path().to_path_buf(), second.path().to_path_buf()])?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].first("AU"), Some("Smith J"));
        assert_eq!(records[1].values("AU"), ["Lee K", "Wong P"]);
        Ok(())
    }

    #[test]
    fn test_load_records_reports_file() -> Result<()> {
        let mut temp = NamedTempFile::new()?;
        writeln!(temp, "   orphan")?;

        let err = load_records(&[temp.path().to_path_buf()]).expect_err("malformed");
        assert!(err.to_string().contains("line 1"));
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = load_records(&[PathBuf::from("/nonexistent/savedrecs.txt")]);
        assert!(matches!(err, Err(WosError::Io(_))));
    }
}
