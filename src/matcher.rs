//! Resolution of free-text cited references to paper UIDs.
//!
//! References in the `CR` field look like
//! `Smith J, 2001, J PHYS, V5, P10, DOI 10.1/x`. A [`MatcherChain`] tries its
//! matchers in order and returns the first hit:
//!
//! 1. [`DoiMatcher`] reads a trailing `DOI ...` part and looks it up directly.
//! 2. [`GuessMatcher`] renders every paper the way a reference would cite it
//!    and compares the lowercased reference against those renderings.

use crate::error::{Result, WosError};
use crate::record::{tags, Record};
use crate::uid::{Paper, Uid, UidTable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Separator between the parts of a cited reference.
const PART_SEPARATOR: &str = ", ";

/// Prefix of the DOI part of a cited reference.
const DOI_PREFIX: &str = "DOI ";

/// Resolves one reference string to a UID.
pub trait ReferenceMatcher {
    fn match_reference(&self, reference: &str) -> Option<Uid>;
}

/// When a paper's venue is rendered as journal + volume rather than source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VenueRule {
    /// Journal + volume whenever `VL` is present, even without `J9` (the
    /// journal part is then empty).
    #[default]
    VolumeOnly,
    /// Journal + volume only when both `J9` and `VL` are present.
    JournalAndVolume,
}

impl VenueRule {
    fn uses_journal(self, record: &Record) -> bool {
        match self {
            VenueRule::VolumeOnly => record.contains(tags::VOLUME),
            VenueRule::JournalAndVolume => {
                record.contains(tags::JOURNAL_ISO) && record.contains(tags::VOLUME)
            }
        }
    }

    /// Venue parts of a paper: all `J9` values joined and the volume behind
    /// `volume_prefix`, or else all `SO` values joined, or nothing.
    pub fn venue_parts(self, record: &Record, volume_prefix: &str) -> Vec<String> {
        if self.uses_journal(record) {
            let volume = record.first(tags::VOLUME).unwrap_or_default();
            vec![
                record.joined(tags::JOURNAL_ISO, PART_SEPARATOR),
                format!("{}{}", volume_prefix, volume),
            ]
        } else if record.contains(tags::SOURCE) {
            vec![record.joined(tags::SOURCE, PART_SEPARATOR)]
        } else {
            Vec::new()
        }
    }
}

impl FromStr for VenueRule {
    type Err = WosError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "volume-only" => Ok(VenueRule::VolumeOnly),
            "journal-and-volume" => Ok(VenueRule::JournalAndVolume),
            other => Err(WosError::Config(format!("Unknown venue rule: {}", other))),
        }
    }
}

impl fmt::Display for VenueRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VenueRule::VolumeOnly => f.write_str("volume-only"),
            VenueRule::JournalAndVolume => f.write_str("journal-and-volume"),
        }
    }
}

/// DOI UID named by the last part of a reference, if that part is a DOI.
pub fn doi_from_reference(reference: &str) -> Option<Uid> {
    let last = reference.rsplit(PART_SEPARATOR).next()?;
    let doi = last.strip_prefix(DOI_PREFIX)?;
    Some(Uid::Doi {
        doi: doi.to_string(),
    })
}

/// Matches references by their trailing DOI.
pub struct DoiMatcher<'t> {
    table: &'t UidTable,
}

impl<'t> DoiMatcher<'t> {
    pub fn new(table: &'t UidTable) -> Self {
        Self { table }
    }
}

impl ReferenceMatcher for DoiMatcher<'_> {
    fn match_reference(&self, reference: &str) -> Option<Uid> {
        doi_from_reference(reference).filter(|uid| self.table.contains(uid))
    }
}

/// Render a paper the way a cited reference to it would read, lowercased.
///
/// Fails if the paper has no author or no year.
pub fn construct_guess(paper: &Paper, rule: VenueRule) -> Result<String> {
    let record = &paper.record;
    let missing = |tag: &'static str| WosError::MissingField {
        uid: paper.uid.clone(),
        tag,
    };

    let first_author = record.first(tags::AUTHOR).ok_or_else(|| missing(tags::AUTHOR))?;
    let year = record
        .first(tags::PUBLICATION_YEAR)
        .ok_or_else(|| missing(tags::PUBLICATION_YEAR))?;

    let mut parts = vec![first_author.replace(',', ""), year.to_string()];
    parts.extend(rule.venue_parts(record, "V"));
    if let Some(page) = record.first(tags::BEGIN_PAGE) {
        parts.push(format!("P{}", page));
    }
    if let Some(doi) = record.first(tags::DOI) {
        parts.push(format!("{}{}", DOI_PREFIX, doi));
    }

    Ok(parts.join(PART_SEPARATOR).to_lowercase())
}

/// Matches references against constructed guesses of every paper.
#[derive(Debug, Default)]
pub struct GuessMatcher {
    by_guess: HashMap<String, Uid>,
}

impl GuessMatcher {
    /// Build the guess index over all papers of `table`.
    ///
    /// Fails with [`WosError::GuessCollision`] if two papers render to the same
    /// guess, since one of them could then never be matched.
    pub fn build(table: &UidTable, rule: VenueRule) -> Result<Self> {
        let mut by_guess: HashMap<String, Uid> = HashMap::with_capacity(table.len());

        for paper in table.iter() {
            let guess = construct_guess(paper, rule)?;
            if let Some(first) = by_guess.get(&guess) {
                return Err(WosError::GuessCollision {
                    guess,
                    first: first.clone(),
                    second: paper.uid.clone(),
                });
            }
            debug!(uid = %paper.uid, guess = %guess, "Constructed guess");
            by_guess.insert(guess, paper.uid.clone());
        }

        info!(guesses = by_guess.len(), rule = %rule, "Built guess index");
        Ok(Self { by_guess })
    }

    pub fn len(&self) -> usize {
        self.by_guess.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_guess.is_empty()
    }
}

impl ReferenceMatcher for GuessMatcher {
    fn match_reference(&self, reference: &str) -> Option<Uid> {
        let normalized = reference.trim().to_lowercase();
        self.by_guess.get(&normalized).cloned()
    }
}

/// Ordered list of matchers; the first non-empty answer wins.
#[derive(Default)]
pub struct MatcherChain<'t> {
    matchers: Vec<Box<dyn ReferenceMatcher + 't>>,
}

impl<'t> MatcherChain<'t> {
    pub fn new() -> Self {
        Self::default()
    }

    /// DOI lookup followed by constructed-guess lookup.
    pub fn standard(table: &'t UidTable, rule: VenueRule) -> Result<Self> {
        Ok(Self::new()
            .with(DoiMatcher::new(table))
            .with(GuessMatcher::build(table, rule)?))
    }

    pub fn with(mut self, matcher: impl ReferenceMatcher + 't) -> Self {
        self.matchers.push(Box::new(matcher));
        self
    }
}

impl ReferenceMatcher for MatcherChain<'_> {
    fn match_reference(&self, reference: &str) -> Option<Uid> {
        self.matchers
            .iter()
            .find_map(|m| m.match_reference(reference))
    }
}
