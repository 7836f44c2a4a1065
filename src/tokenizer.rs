//! Record tokenizer for tagged-field exports.
//!
//! A record is a block of lines. Each field line starts with a two-letter tag
//! followed by one separator character; lines starting with three spaces
//! continue the previous field. Blocks are separated by blank lines and by the
//! `ER` / `EF` sentinel lines.

use crate::error::{Result, WosError};
use crate::record::Record;
use tracing::debug;

/// Lines that end a record (`ER`) or the file (`EF`).
const SENTINEL_LINES: &[&str] = &["ER", "EF"];

/// Prefix marking a continuation line.
const CONTINUATION: &str = "   ";

/// Width of the tag column, separator included.
const KEY_WIDTH: usize = 3;

/// Whether a line separates records instead of carrying data.
pub fn is_separator(line: &str) -> bool {
    line.trim().is_empty() || SENTINEL_LINES.contains(&line)
}

/// Group lines into blocks, dropping separators. Each line keeps its 1-based
/// position in the input so errors can point at it. Empty blocks are not
/// emitted.
pub fn chunk_by_separator<'a, I>(lines: I) -> Vec<Vec<(usize, &'a str)>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut chunks = Vec::new();
    let mut current = Vec::new();

    for (idx, line) in lines.into_iter().enumerate() {
        if is_separator(line) {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
        } else {
            current.push((idx + 1, line));
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Split a line into its key part (first three characters) and value.
fn split_key(line: &str) -> (&str, &str) {
    let split_at = line
        .char_indices()
        .nth(KEY_WIDTH)
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    line.split_at(split_at)
}

/// Turn one block into a record.
///
/// A tag seen twice in the same block keeps only its last run of values.
pub fn parse_record(block: &[(usize, &str)]) -> Result<Record> {
    let mut record = Record::new();
    let mut current_tag: Option<String> = None;

    for &(line_number, line) in block {
        let (key_part, value) = split_key(line);

        if key_part == CONTINUATION {
            let extended = current_tag
                .as_deref()
                .map(|tag| record.extend_field(tag, value))
                .unwrap_or(false);
            if !extended {
                return Err(WosError::MalformedLine {
                    line_number,
                    line: line.to_string(),
                });
            }
        } else {
            let tag: String = key_part.chars().take(2).collect();
            record.start_field(tag.as_str(), value);
            current_tag = Some(tag);
        }
    }

    Ok(record)
}

/// Tokenize a whole source into records, in block order.
pub fn tokenize<'a, I>(lines: I) -> Result<Vec<Record>>
where
    I: IntoIterator<Item = &'a str>,
{
    let records = chunk_by_separator(lines)
        .iter()
        .map(|block| parse_record(block))
        .collect::<Result<Vec<_>>>()?;

    debug!(records = records.len(), "Tokenized source");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serialize(fields: &[(&str, &[&str])]) -> Vec<String> {
        let mut lines = Vec::new();
        for (tag, values) in fields {
            for (i, value) in values.iter().enumerate() {
                if i == 0 {
                    lines.push(format!("{} {}", tag, value));
                } else {
                    lines.push(format!("   {}", value));
                }
            }
        }
        lines
    }

    #[test]
    fn test_round_trip() -> Result<()> {
        let fields: &[(&str, &[&str])] = &[
            ("AU", &["Smith, J", "Lee, K", "Wong, P"]),
            ("TI", &["A Study of Things"]),
            ("CR", &["Smith J, 2001, DOI 10.1/x", "lee k, 1999, j phys, v5, p10"]),
            ("PY", &["2004"]),
        ];
        let lines = serialize(fields);
        let records = tokenize(lines.iter().map(String::as_str))?;

        let expected = Record::from_fields(fields.iter().map(|(t, v)| (*t, v.iter().copied())));
        assert_eq!(records[0].len(), 4);
        assert_eq!(records, vec![expected]);
        Ok(())
    }

    #[test]
    fn test_separators() -> Result<()> {
        let compact = ["PT J", "AU Smith J", "ER", "PT J", "AU Lee K", "ER", "EF"];
        let padded = [
            "", "PT J", "AU Smith J", "ER", "", "   ", "", "PT J", "AU Lee K", "", "ER", "",
            "EF", "",
        ];

        let a = tokenize(compact)?;
        let b = tokenize(padded)?;
        assert_eq!(a.len(), 2);
        assert!(a.iter().all(|r| !r.is_empty()));
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn test_blank_line_splits_block() -> Result<()> {
        let records = tokenize(["AU Smith J", "", "AU Lee K"])?;
        assert_eq!(records.len(), 2);
        Ok(())
    }

    #[test]
    fn test_last_occurrence_wins() -> Result<()> {
        let records = tokenize(["TI First", "   more", "AU Smith J", "TI Second"])?;
        assert_eq!(records[0].values("TI"), ["Second"]);
        Ok(())
    }

    #[test]
    fn test_leading_continuation_fails() {
        let err = tokenize(["ER", "   orphan", "AU Smith J"]).expect_err("should fail");
        match err {
            WosError::MalformedLine { line_number, line } => {
                assert_eq!(line_number, 2);
                assert_eq!(line, "   orphan");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_and_unicode_lines() -> Result<()> {
        let records = tokenize(["AU Müller, Ä", "TI", "X"])?;
        assert_eq!(records[0].first("AU"), Some("Müller, Ä"));
        assert_eq!(records[0].first("TI"), Some(""));
        assert_eq!(records[0].first("X"), Some(""));
        Ok(())
    }

    #[test]
    fn test_sentinel_must_match_exactly() -> Result<()> {
        let records = tokenize(["ER ", "AU Smith J"])?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].first("ER"), Some(""));
        Ok(())
    }
}
