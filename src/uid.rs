//! Canonical paper identifiers.
//!
//! A paper gets the UID of the first strategy in [`UID_STRATEGIES`] that can
//! build one from its fields: DOI, then journal/volume/page, then
//! year/source/page.

use crate::error::{Result, WosError};
use crate::record::{tags, Record};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, info, warn};

/// Canonical identifier of a paper record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Uid {
    Doi {
        doi: String,
    },
    J9Key {
        journal: String,
        volume: String,
        page: String,
    },
    SoKey {
        year: String,
        source_name: String,
        page: String,
    },
}

impl Uid {
    /// Short name of the strategy that produced this UID.
    pub fn kind(&self) -> &'static str {
        match self {
            Uid::Doi { .. } => "DOI",
            Uid::J9Key { .. } => "J9",
            Uid::SoKey { .. } => "SO",
        }
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Uid::Doi { doi } => write!(f, "DOI {}", doi),
            Uid::J9Key {
                journal,
                volume,
                page,
            } => write!(f, "J9 {}, {}, {}", journal, volume, page),
            Uid::SoKey {
                year,
                source_name,
                page,
            } => write!(f, "SO {}, {}, {}", year, source_name, page),
        }
    }
}

/// A UID extraction strategy.
pub type UidStrategy = fn(&Record) -> Option<Uid>;

/// Strategies in priority order.
pub const UID_STRATEGIES: &[UidStrategy] = &[doi_key, j9_key, so_key];

/// `DI` alone.
pub fn doi_key(record: &Record) -> Option<Uid> {
    let doi = record.first(tags::DOI)?;
    Some(Uid::Doi {
        doi: doi.to_string(),
    })
}

/// `J9` + `VL` + `BP`.
pub fn j9_key(record: &Record) -> Option<Uid> {
    let journal = record.first(tags::JOURNAL_ISO)?;
    let volume = record.first(tags::VOLUME)?;
    let page = record.first(tags::BEGIN_PAGE)?;
    Some(Uid::J9Key {
        journal: journal.to_string(),
        volume: format!("V{}", volume),
        page: format!("P{}", page),
    })
}

/// `SO` + `BP`, qualified by `PY`.
pub fn so_key(record: &Record) -> Option<Uid> {
    if !record.contains(tags::SOURCE) {
        return None;
    }
    let page = record.first(tags::BEGIN_PAGE)?;
    let year = record.first(tags::PUBLICATION_YEAR)?;
    Some(Uid::SoKey {
        year: year.to_string(),
        source_name: record.joined(tags::SOURCE, ", "),
        page: format!("P{}", page),
    })
}

/// UID of a record, from the first strategy that applies.
pub fn assign_uid(record: &Record) -> Option<Uid> {
    UID_STRATEGIES.iter().find_map(|strategy| strategy(record))
}

/// Papers grouped by UID, before uniqueness is enforced.
#[derive(Debug, Default)]
pub struct UidGrouping {
    /// Records per UID, in input order within each group
    pub with_uid: BTreeMap<Uid, Vec<Record>>,
    /// Records no strategy could identify
    pub without_uid: Vec<Record>,
    order: Vec<Uid>,
}

impl UidGrouping {
    /// Groups holding more than one record.
    pub fn duplicate_groups(&self) -> BTreeMap<&Uid, &[Record]> {
        self.with_uid
            .iter()
            .filter(|(_, records)| records.len() > 1)
            .map(|(uid, records)| (uid, records.as_slice()))
            .collect()
    }
}

/// Group records by their UID.
pub fn group_by_uid(records: impl IntoIterator<Item = Record>) -> UidGrouping {
    let mut grouping = UidGrouping::default();

    for record in records {
        match assign_uid(&record) {
            Some(uid) => {
                let group = grouping.with_uid.entry(uid.clone()).or_default();
                if group.is_empty() {
                    grouping.order.push(uid);
                }
                group.push(record);
            }
            None => grouping.without_uid.push(record),
        }
    }

    grouping
}

/// A paper with its canonical identifier.
#[derive(Debug, Clone, Serialize)]
pub struct Paper {
    pub uid: Uid,
    pub record: Record,
}

/// One paper per UID, iterated in input order.
#[derive(Debug, Default)]
pub struct UidTable {
    papers: Vec<Paper>,
    index: HashMap<Uid, usize>,
}

impl UidTable {
    /// Build the table from a grouping, failing on the first UID shared by
    /// two records.
    pub fn from_grouping(grouping: UidGrouping) -> Result<(Self, Vec<Record>)> {
        let UidGrouping {
            mut with_uid,
            without_uid,
            order,
        } = grouping;

        let mut table = UidTable::default();
        for uid in order {
            let mut records = with_uid.remove(&uid).unwrap_or_default().into_iter();
            let Some(record) = records.next() else {
                continue;
            };
            if let Some(second) = records.next() {
                warn!(uid = %uid, "Two paper records share a UID");
                return Err(WosError::UidCollision {
                    uid,
                    first: Box::new(record),
                    second: Box::new(second),
                });
            }
            table.index.insert(uid.clone(), table.papers.len());
            table.papers.push(Paper { uid, record });
        }

        Ok((table, without_uid))
    }

    pub fn get(&self, uid: &Uid) -> Option<&Record> {
        self.index.get(uid).map(|&i| &self.papers[i].record)
    }

    pub fn contains(&self, uid: &Uid) -> bool {
        self.index.contains_key(uid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Paper> {
        self.papers.iter()
    }

    pub fn uids(&self) -> impl Iterator<Item = &Uid> {
        self.papers.iter().map(|p| &p.uid)
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}

/// Assign UIDs to all papers and index them.
///
/// Returns the table and the records no strategy could identify. Fails with
/// [`WosError::UidCollision`] if two records share a UID.
pub fn build_uid_table(records: impl IntoIterator<Item = Record>) -> Result<(UidTable, Vec<Record>)> {
    let grouping = group_by_uid(records);
    let (table, without_uid) = UidTable::from_grouping(grouping)?;

    let by_kind = crate::aggregate::histogram(table.uids(), |uid| uid.kind());
    info!(
        papers = table.len(),
        without_uid = without_uid.len(),
        by_kind = ?by_kind,
        "Built UID table"
    );
    for record in &without_uid {
        debug!(title = record.first(tags::TITLE).unwrap_or(""), "Paper without UID");
    }

    Ok((table, without_uid))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn j9_paper() -> Record {
        Record::from_fields([
            ("J9", vec!["J PHYS"]),
            ("VL", vec!["5"]),
            ("BP", vec!["10"]),
            ("AU", vec!["Lee K"]),
            ("PY", vec!["1999"]),
        ])
    }

    #[test]
    fn test_doi_has_priority() {
        let mut record = j9_paper();
        record.start_field("DI", "10.1/x");
        assert_eq!(
            assign_uid(&record),
            Some(Uid::Doi {
                doi: "10.1/x".to_string()
            })
        );
    }

    #[test]
    fn test_j9_key() {
        let uid = assign_uid(&j9_paper());
        assert_eq!(
            uid,
            Some(Uid::J9Key {
                journal: "J PHYS".to_string(),
                volume: "V5".to_string(),
                page: "P10".to_string(),
            })
        );
        assert_eq!(uid, assign_uid(&j9_paper()));
    }

    #[test]
    fn test_so_key() {
        let record = Record::from_fields([
            ("SO", vec!["JOURNAL OF", "PHYSICS"]),
            ("BP", vec!["7"]),
            ("PY", vec!["2003"]),
            ("VL", vec!["2"]),
        ]);
        assert_eq!(
            assign_uid(&record),
            Some(Uid::SoKey {
                year: "2003".to_string(),
                source_name: "JOURNAL OF, PHYSICS".to_string(),
                page: "P7".to_string(),
            })
        );
    }

    #[test]
    fn test_no_uid() {
        let record = Record::from_fields([("SO", vec!["NATURE"]), ("PY", vec!["2003"])]);
        assert_eq!(assign_uid(&record), None);

        let (table, without) = build_uid_table(vec![record]).expect("no collision");
        assert!(table.is_empty());
        assert_eq!(without.len(), 1);
    }

    #[test]
    fn test_collision_detected() {
        let a = Record::from_fields([("DI", vec!["10.1/x"]), ("TI", vec!["First"])]);
        let b = Record::from_fields([("DI", vec!["10.1/x"]), ("TI", vec!["Second"])]);

        match build_uid_table(vec![a.clone(), b.clone()]) {
            Err(WosError::UidCollision { uid, first, second }) => {
                assert_eq!(uid.kind(), "DOI");
                assert_eq!(*first, a);
                assert_eq!(*second, b);
            }
            other => panic!("expected collision, got {:?}", other.map(|(t, _)| t.len())),
        }
    }

    #[test]
    fn test_duplicate_groups() {
        let a = Record::from_fields([("DI", vec!["10.1/x"])]);
        let grouping = group_by_uid(vec![a.clone(), a, j9_paper()]);
        let duplicates = grouping.duplicate_groups();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates.values().next().map(|g| g.len()), Some(2));
    }

    #[test]
    fn test_table_keeps_input_order() -> Result<()> {
        let papers = vec![
            Record::from_fields([("DI", vec!["10.9/z"])]),
            j9_paper(),
            Record::from_fields([("DI", vec!["10.1/a"])]),
        ];
        let (table, _) = build_uid_table(papers)?;
        let kinds: Vec<_> = table.uids().map(Uid::to_string).collect();
        assert_eq!(kinds, ["DOI 10.9/z", "J9 J PHYS, V5, P10", "DOI 10.1/a"]);
        assert!(table.get(&Uid::Doi { doi: "10.1/a".to_string() }).is_some());
        Ok(())
    }
}
