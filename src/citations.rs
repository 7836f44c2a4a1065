//! Citation aggregation: which citing records cite which paper.

use crate::matcher::ReferenceMatcher;
use crate::record::{tags, Record};
use crate::uid::{Uid, UidTable};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Citing records per paper UID, in citing-corpus order.
pub type CitationMap<'a> = BTreeMap<Uid, Vec<&'a Record>>;

/// Resolve every cited reference of every citing record.
///
/// Each paper of `table` gets an entry, cited or not. A citing record is
/// listed at most once per paper even if several of its references resolve
/// to the same UID. References that resolve to nothing are ignored.
pub fn aggregate_citations<'a, M>(
    table: &UidTable,
    citing: &'a [Record],
    matcher: &M,
) -> CitationMap<'a>
where
    M: ReferenceMatcher + ?Sized,
{
    let mut res: CitationMap<'a> = table.uids().map(|uid| (uid.clone(), Vec::new())).collect();
    let mut references = 0usize;
    let mut resolved = 0usize;

    for record in citing {
        let mut already_cited: HashSet<Uid> = HashSet::new();
        for reference in record.values(tags::CITED_REFERENCES) {
            references += 1;
            let Some(uid) = matcher.match_reference(reference) else {
                continue;
            };
            resolved += 1;
            if already_cited.contains(&uid) {
                debug!(uid = %uid, "Repeated reference within one citing record");
                continue;
            }
            res.entry(uid.clone()).or_default().push(record);
            already_cited.insert(uid);
        }
    }

    let edges: usize = res.values().map(Vec::len).sum();
    info!(
        citing = citing.len(),
        references,
        resolved,
        edges,
        "Aggregated citations"
    );

    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{MatcherChain, VenueRule};
    use crate::uid::build_uid_table;
    use crate::Result;

    fn papers() -> Vec<Record> {
        vec![
            Record::from_fields([
                ("DI", vec!["10.1/x"]),
                ("AU", vec!["Smith J"]),
                ("PY", vec!["2001"]),
                ("TI", vec!["A Study"]),
            ]),
            Record::from_fields([
                ("J9", vec!["J PHYS"]),
                ("VL", vec!["5"]),
                ("BP", vec!["10"]),
                ("AU", vec!["Lee K"]),
                ("PY", vec!["1999"]),
            ]),
            Record::from_fields([
                ("DI", vec!["10.3/uncited"]),
                ("AU", vec!["Wong P"]),
                ("PY", vec!["2010"]),
            ]),
        ]
    }

    fn citing(refs: &[&[&str]]) -> Vec<Record> {
        refs.iter()
            .enumerate()
            .map(|(i, crs)| {
                Record::from_fields([
                    ("TI", vec![format!("Citing {}", i)]),
                    ("CR", crs.iter().map(|s| s.to_string()).collect()),
                ])
            })
            .collect()
    }

    #[test]
    fn test_doi_citation() -> Result<()> {
        let (table, _) = build_uid_table(papers())?;
        let chain = MatcherChain::standard(&table, VenueRule::VolumeOnly)?;
        let citing = citing(&[&["Smith J, 2001, DOI 10.1/x"]]);

        let map = aggregate_citations(&table, &citing, &chain);
        let cited_by = &map[&Uid::Doi {
            doi: "10.1/x".to_string(),
        }];
        assert_eq!(cited_by.len(), 1);
        assert_eq!(cited_by[0], &citing[0]);
        Ok(())
    }

    #[test]
    fn test_guess_citation() -> Result<()> {
        let (table, _) = build_uid_table(papers())?;
        let chain = MatcherChain::standard(&table, VenueRule::VolumeOnly)?;
        let citing = citing(&[&["lee k, 1999, j phys, v5, p10"]]);

        let map = aggregate_citations(&table, &citing, &chain);
        let uid = Uid::J9Key {
            journal: "J PHYS".to_string(),
            volume: "V5".to_string(),
            page: "P10".to_string(),
        };
        assert_eq!(map[&uid].len(), 1);
        Ok(())
    }

    #[test]
    fn test_dedup_within_citing_record() -> Result<()> {
        let (table, _) = build_uid_table(papers())?;
        let chain = MatcherChain::standard(&table, VenueRule::VolumeOnly)?;
        let citing = citing(&[
            &["Smith J, 2001, DOI 10.1/x", "smith j, 2001, doi 10.1/x"],
            &["Smith J, 2001, DOI 10.1/x"],
        ]);

        let map = aggregate_citations(&table, &citing, &chain);
        let cited_by = &map[&Uid::Doi {
            doi: "10.1/x".to_string(),
        }];
        assert_eq!(cited_by.len(), 2);
        assert_eq!(cited_by[0], &citing[0]);
        assert_eq!(cited_by[1], &citing[1]);
        Ok(())
    }

    #[test]
    fn test_every_paper_present() -> Result<()> {
        let (table, _) = build_uid_table(papers())?;
        let chain = MatcherChain::standard(&table, VenueRule::VolumeOnly)?;
        let mut citing = citing(&[&["Unknown A, 1990, NOWHERE, V1, P1"]]);
        citing.push(Record::from_fields([("TI", vec!["No references"])]));

        let map = aggregate_citations(&table, &citing, &chain);
        assert_eq!(map.len(), table.len());
        assert!(map.values().all(Vec::is_empty));
        Ok(())
    }
}
