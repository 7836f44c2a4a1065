//! Parsed bibliographic record: two-letter field tags mapped to their values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field tags used by the UID, matching and report code.
pub mod tags {
    pub const AUTHOR: &str = "AU";
    pub const AUTHOR_FULL: &str = "AF";
    pub const BEGIN_PAGE: &str = "BP";
    pub const CITED_REFERENCES: &str = "CR";
    pub const DOCUMENT_TYPE: &str = "DT";
    pub const DOI: &str = "DI";
    pub const JOURNAL_ISO: &str = "J9";
    pub const PUBLICATION_YEAR: &str = "PY";
    pub const SOURCE: &str = "SO";
    pub const TITLE: &str = "TI";
    pub const VOLUME: &str = "VL";
}

/// One bibliographic entry.
///
/// Values of a tag keep their order of appearance (the first value comes from
/// the field line, the rest from continuation lines).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Vec<String>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(tag, values)` pairs. Later pairs replace earlier
    /// ones with the same tag.
    pub fn from_fields<I, T, V, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (T, V)>,
        T: Into<String>,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: BTreeMap<String, Vec<String>> = fields
            .into_iter()
            .map(|(tag, values)| (tag.into(), values.into_iter().map(Into::into).collect()))
            .collect();
        Self { fields }
    }

    /// Start a new value list for `tag`, replacing any previous one.
    pub fn start_field(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(tag.into(), vec![value.into()]);
    }

    /// Append a value to an existing tag. Returns `false` if the tag is unknown.
    pub fn extend_field(&mut self, tag: &str, value: impl Into<String>) -> bool {
        match self.fields.get_mut(tag) {
            Some(values) => {
                values.push(value.into());
                true
            }
            None => false,
        }
    }

    pub fn get(&self, tag: &str) -> Option<&[String]> {
        self.fields.get(tag).map(Vec::as_slice)
    }

    /// All values of `tag`, or an empty slice when absent.
    pub fn values(&self, tag: &str) -> &[String] {
        self.get(tag).unwrap_or(&[])
    }

    /// First value of `tag`.
    pub fn first(&self, tag: &str) -> Option<&str> {
        self.get(tag).and_then(|v| v.first()).map(String::as_str)
    }

    /// All values of `tag` joined with `sep` (empty string when absent).
    pub fn joined(&self, tag: &str, sep: &str) -> String {
        self.values(tag).join(sep)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.fields.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
