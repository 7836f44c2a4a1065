//! # rustwos
//!
//! Citation reconciliation for Web of Science tagged-field exports.
//!
//! ## Modules
//!
//! - [`tokenizer`] - Split export lines into tagged records
//! - [`aggregate`] - Counts and histograms over records
//! - [`uid`] - Canonical paper identifiers and the UID table
//! - [`matcher`] - Resolve cited references to paper UIDs
//! - [`citations`] - Citing records per paper
//! - [`report`] - Text report, CSV export, per-year histogram
//! - [`pipeline`] - End-to-end runs and diagnostics
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rustwos::{citations, matcher, source, uid};
//! use std::path::PathBuf;
//!
//! fn main() -> anyhow::Result<()> {
//!     let papers = source::load_records(&[PathBuf::from("papers.txt")])?;
//!     let citing = source::load_records(&[PathBuf::from("citing.txt")])?;
//!
//!     let (table, _without_uid) = uid::build_uid_table(papers)?;
//!     let chain = matcher::MatcherChain::standard(&table, Default::default())?;
//!     let cited = citations::aggregate_citations(&table, &citing, &chain);
//!     println!("{} papers, {} cited", table.len(), cited.values().filter(|c| !c.is_empty()).count());
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod citations;
pub mod config;
pub mod error;
pub mod matcher;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod source;
pub mod tokenizer;
pub mod uid;

pub use error::{Result, WosError};
pub use record::Record;
pub use uid::Uid;
