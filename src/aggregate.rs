//! Folds over record collections, used for diagnostics and histograms.

use crate::record::Record;
use std::collections::{BTreeMap, BTreeSet};

/// Number of records satisfying `predicate`.
pub fn count_where<'a, I, P>(records: I, mut predicate: P) -> usize
where
    I: IntoIterator<Item = &'a Record>,
    P: FnMut(&Record) -> bool,
{
    records.into_iter().filter(|r| predicate(*r)).count()
}

/// Group `items` by `key_fn`, combining the extracted values with `combine`.
///
/// The first value seen for a key is stored as-is; later ones are folded in
/// with `combine(existing, new)`.
pub fn histogram_by_key<T, K, V, I, KF, VF, C>(
    items: I,
    mut key_fn: KF,
    mut value_fn: VF,
    mut combine: C,
) -> BTreeMap<K, V>
where
    I: IntoIterator<Item = T>,
    K: Ord,
    KF: FnMut(&T) -> K,
    VF: FnMut(&T) -> V,
    C: FnMut(V, V) -> V,
{
    let mut res: BTreeMap<K, V> = BTreeMap::new();
    for item in items {
        let key = key_fn(&item);
        let value = value_fn(&item);
        let merged = match res.remove(&key) {
            Some(existing) => combine(existing, value),
            None => value,
        };
        res.insert(key, merged);
    }
    res
}

/// Count items per key.
pub fn histogram<T, K, I, KF>(items: I, key_fn: KF) -> BTreeMap<K, usize>
where
    I: IntoIterator<Item = T>,
    K: Ord,
    KF: FnMut(&T) -> K,
{
    histogram_by_key(items, key_fn, |_| 1usize, |a, b| a + b)
}

/// Number of records carrying each tag.
pub fn field_presence<'a, I>(records: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a Record>,
{
    histogram(
        records.into_iter().flat_map(|r| r.tags()),
        |tag| tag.to_string(),
    )
}

/// Tags present in every record. Empty for an empty collection.
pub fn common_fields(records: &[Record]) -> BTreeSet<String> {
    field_presence(records)
        .into_iter()
        .filter(|(_, count)| *count == records.len())
        .map(|(tag, _)| tag)
        .collect()
}

/// Histogram over the first value of `tag`; records without it are skipped.
pub fn tag_histogram<'a, I>(records: I, tag: &str) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a Record>,
{
    histogram(records.into_iter().filter_map(|r| r.first(tag)), |v| {
        v.to_string()
    })
}

/// Number of records whose value lists for `a` and `b` differ.
pub fn count_differing<'a, I>(records: I, a: &str, b: &str) -> usize
where
    I: IntoIterator<Item = &'a Record>,
{
    count_where(records, |r| r.get(a) != r.get(b))
}
