//! End-to-end runs: load, identify, match, report.

use crate::aggregate::{common_fields, count_differing, field_presence, histogram, tag_histogram};
use crate::citations::{aggregate_citations, CitationMap};
use crate::config::Config;
use crate::error::Result;
use crate::matcher::{MatcherChain, VenueRule};
use crate::record::{tags, Record};
use crate::report::{citation_rows, citations_by_year, render_report, save_csv, write_report};
use crate::source::load_records;
use crate::uid::{build_uid_table, group_by_uid, UidTable};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::{info, warn};

/// Report file name inside the output directory
pub const REPORT_FILE: &str = "report.txt";
/// Per-paper citation counts
pub const CITATIONS_FILE: &str = "citations.csv";
/// Diagnostics summary
pub const SUMMARY_FILE: &str = "summary.json";

/// Result of matching the citing corpus against the papers.
pub struct Analysis<'a> {
    pub table: UidTable,
    pub without_uid: Vec<Record>,
    pub citations: CitationMap<'a>,
}

impl Analysis<'_> {
    /// Number of citation edges over all papers
    pub fn total_citations(&self) -> usize {
        self.citations.values().map(Vec::len).sum()
    }
}

/// Build the UID table over `papers` and resolve all references of `citing`.
pub fn analyze(papers: Vec<Record>, citing: &[Record], rule: VenueRule) -> Result<Analysis<'_>> {
    let (table, without_uid) = build_uid_table(papers)?;
    let citations = {
        let matcher = MatcherChain::standard(&table, rule)?;
        aggregate_citations(&table, citing, &matcher)
    };

    Ok(Analysis {
        table,
        without_uid,
        citations,
    })
}

/// Field-level diagnostics of both corpora.
#[derive(Debug, Serialize)]
pub struct Diagnostics {
    pub citing_records: usize,
    pub paper_records: usize,
    /// Records carrying each tag, over the citing corpus
    pub field_presence: BTreeMap<String, usize>,
    /// Tags present in every citing record
    pub common_fields: BTreeSet<String>,
    /// Citing records per document type (`DT`)
    pub document_types: BTreeMap<String, usize>,
    /// Citing records whose `AU` and `AF` differ
    pub author_forms_differ: usize,
    /// Papers per UID strategy
    pub uid_kinds: BTreeMap<&'static str, usize>,
    pub papers_without_uid: usize,
    /// UIDs shared by more than one paper; must be zero for a report run
    pub duplicate_uid_groups: BTreeMap<String, usize>,
}

/// Inspect both corpora without failing on integrity problems.
pub fn diagnose(papers: &[Record], citing: &[Record]) -> Diagnostics {
    let grouping = group_by_uid(papers.iter().cloned());
    let uid_kinds = histogram(
        grouping.with_uid.iter().flat_map(|(uid, records)| {
            std::iter::repeat(uid.kind()).take(records.len())
        }),
        |kind| *kind,
    );
    let duplicate_uid_groups = grouping
        .duplicate_groups()
        .into_iter()
        .map(|(uid, records)| (uid.to_string(), records.len()))
        .collect();

    Diagnostics {
        citing_records: citing.len(),
        paper_records: papers.len(),
        field_presence: field_presence(citing),
        common_fields: common_fields(citing),
        document_types: tag_histogram(citing, tags::DOCUMENT_TYPE),
        author_forms_differ: count_differing(citing, tags::AUTHOR, tags::AUTHOR_FULL),
        uid_kinds,
        papers_without_uid: grouping.without_uid.len(),
        duplicate_uid_groups,
    }
}

/// Summary written next to the report.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub diagnostics: Diagnostics,
    pub total_citations: usize,
    pub cited_papers: usize,
    pub citations_by_year: BTreeMap<String, usize>,
}

/// Paths written by [`run_report`].
#[derive(Debug)]
pub struct ReportOutputs {
    pub report: PathBuf,
    pub citations: PathBuf,
    pub summary: PathBuf,
}

/// Load the configured files, match citations and write all outputs.
pub fn run_report(config: &Config) -> Result<ReportOutputs> {
    config.validate()?;

    let papers = load_records(&config.papers)?;
    let citing = load_records(&config.citing)?;
    let diagnostics = diagnose(&papers, &citing);

    let analysis = analyze(papers, &citing, config.venue_rule)?;
    for record in &analysis.without_uid {
        warn!(
            title = record.first(tags::TITLE).unwrap_or(""),
            "Paper has no UID and is left out of the report"
        );
    }

    std::fs::create_dir_all(&config.output_dir)?;
    let outputs = ReportOutputs {
        report: config.output_dir.join(REPORT_FILE),
        citations: config.output_dir.join(CITATIONS_FILE),
        summary: config.output_dir.join(SUMMARY_FILE),
    };

    let lines = render_report(
        &config.title,
        &analysis.table,
        &analysis.citations,
        config.venue_rule,
    );
    write_report(&outputs.report, &lines)?;
    save_csv(
        &outputs.citations,
        &citation_rows(&analysis.table, &analysis.citations),
    )?;

    let summary = Summary {
        diagnostics,
        total_citations: analysis.total_citations(),
        cited_papers: analysis.citations.values().filter(|c| !c.is_empty()).count(),
        citations_by_year: citations_by_year(&analysis.table, &analysis.citations),
    };
    std::fs::write(&outputs.summary, serde_json::to_string_pretty(&summary)?)?;

    info!(
        papers = analysis.table.len(),
        citations = summary.total_citations,
        output = ?config.output_dir,
        "Report complete"
    );
    Ok(outputs)
}
