//! Citation report rendering and export.
//!
//! The text report lists, for every paper of the table, the records citing
//! it, newest first, preceded by a histogram of citations per year.

use crate::aggregate::histogram;
use crate::citations::CitationMap;
use crate::error::Result;
use crate::matcher::VenueRule;
use crate::record::{tags, Record};
use crate::uid::UidTable;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Rule printed above each paper in the text report.
const PAPER_RULE: &str = "__________________________________________";

/// Report line ending.
const LINE_ENDING: &str = "\r\n";

/// Number of citations per citing-record year, over all papers.
///
/// A citing record citing two papers counts twice. Citing records without a
/// year are not counted.
pub fn citations_by_year(table: &UidTable, citations: &CitationMap<'_>) -> BTreeMap<String, usize> {
    let cited_years = table
        .uids()
        .filter_map(|uid| citations.get(uid))
        .flatten()
        .filter_map(|record| record.first(tags::PUBLICATION_YEAR));

    histogram(cited_years, |year| year.to_string())
}

/// Years in descending numeric order; years that are not numbers come last.
pub fn sorted_years(by_year: &BTreeMap<String, usize>) -> Vec<(&str, usize)> {
    let mut years: Vec<(&str, usize)> = by_year.iter().map(|(y, c)| (y.as_str(), *c)).collect();
    years.sort_by_key(|(year, _)| Reverse(year.trim().parse::<i64>().ok()));
    years
}

/// One-line human readable rendering of a record.
pub fn render_paper(record: &Record, rule: VenueRule) -> String {
    let mut parts = vec![
        format!("{}:", record.joined(tags::AUTHOR, "; ")),
        format!("{},", record.joined(tags::TITLE, " ")),
    ];
    parts.extend(rule.venue_parts(record, ""));
    parts.push(format!(
        "({})",
        record.first(tags::PUBLICATION_YEAR).unwrap_or_default()
    ));
    if let Some(page) = record.first(tags::BEGIN_PAGE) {
        parts.push(format!("p.{}", page));
    }
    if let Some(doi) = record.first(tags::DOI) {
        parts.push(doi.to_string());
    }
    parts.join(" ")
}

/// Citing records ordered by year, newest first.
fn newest_first<'a>(cited_by: &[&'a Record]) -> Vec<&'a Record> {
    let mut sorted = cited_by.to_vec();
    sorted.sort_by(|a, b| {
        a.values(tags::PUBLICATION_YEAR)
            .cmp(b.values(tags::PUBLICATION_YEAR))
    });
    sorted.reverse();
    sorted
}

/// Render the full text report as lines.
pub fn render_report(
    title: &str,
    table: &UidTable,
    citations: &CitationMap<'_>,
    rule: VenueRule,
) -> Vec<String> {
    let mut lines = vec![title.to_string(), "Citations per year:".to_string()];

    let by_year = citations_by_year(table, citations);
    for (year, count) in sorted_years(&by_year) {
        lines.push(format!("{}\t{}", year, count));
    }
    lines.push(String::new());

    for paper in table.iter() {
        lines.push(PAPER_RULE.to_string());
        lines.push(render_paper(&paper.record, rule));

        let cited_by = citations
            .get(&paper.uid)
            .map(|records| newest_first(records))
            .unwrap_or_default();
        lines.push(String::new());
        lines.push(format!("Cited by: {}", cited_by.len()));
        for (record, number) in cited_by.iter().zip((1..=cited_by.len()).rev()) {
            lines.push(format!("Citation {}:\t{}", number, render_paper(record, rule)));
        }
        lines.push(String::new());
        lines.push(String::new());
    }

    lines
}

/// Write report lines with CRLF line endings.
pub fn write_report(path: &Path, lines: &[String]) -> Result<()> {
    let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
    for line in lines {
        out.write_all(line.as_bytes())?;
        out.write_all(LINE_ENDING.as_bytes())?;
    }
    out.flush()?;
    info!(path = ?path, lines = lines.len(), "Wrote report");
    Ok(())
}

/// One CSV row per paper.
#[derive(Debug, Serialize)]
pub struct CitationRow {
    pub uid_kind: &'static str,
    pub uid: String,
    pub title: String,
    pub year: String,
    pub citations: usize,
}

/// Per-paper citation counts, in table order.
pub fn citation_rows(table: &UidTable, citations: &CitationMap<'_>) -> Vec<CitationRow> {
    table
        .iter()
        .map(|paper| CitationRow {
            uid_kind: paper.uid.kind(),
            uid: paper.uid.to_string(),
            title: paper.record.joined(tags::TITLE, " "),
            year: paper
                .record
                .first(tags::PUBLICATION_YEAR)
                .unwrap_or_default()
                .to_string(),
            citations: citations.get(&paper.uid).map(Vec::len).unwrap_or(0),
        })
        .collect()
}

/// Save rows to a CSV file with a header line.
pub fn save_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(true).from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    info!(path = ?path, rows = rows.len(), "Wrote CSV");
    Ok(())
}
