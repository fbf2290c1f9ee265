use std::ops::Bound;

use arbor_core::indexing::{encode_tuple, prefix_successor};
use arbor_storage_common::IndexKeyRange;

/// A half-open interval of index keys: `start` inclusive, `end` exclusive. None means unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyInterval {
    pub start: Option<Vec<u8>>,
    pub end: Option<Vec<u8>>,
}

impl KeyInterval {
    pub fn full() -> Self { Self::default() }

    pub fn empty() -> Self { Self { start: Some(Vec::new()), end: Some(Vec::new()) } }

    /// Every key that starts with `prefix`
    pub fn prefix(prefix: &[u8]) -> Self { Self { start: Some(prefix.to_vec()), end: prefix_successor(prefix) } }

    pub fn is_empty(&self) -> bool {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => start >= end,
            _ => false,
        }
    }

    pub fn intersect(&self, other: &KeyInterval) -> KeyInterval {
        let start = match (&self.start, &other.start) {
            (Some(a), Some(b)) => Some(a.max(b).clone()),
            (a, b) => a.clone().or_else(|| b.clone()),
        };
        let end = match (&self.end, &other.end) {
            (Some(a), Some(b)) => Some(a.min(b).clone()),
            (a, b) => a.clone().or_else(|| b.clone()),
        };
        KeyInterval { start, end }
    }

    pub fn to_range(&self) -> (Bound<Vec<u8>>, Bound<Vec<u8>>) {
        let start = self.start.clone().map_or(Bound::Unbounded, Bound::Included);
        let end = self.end.clone().map_or(Bound::Unbounded, Bound::Excluded);
        (start, end)
    }
}

/// Lower a range onto index keys.
///
/// A key matches a bound when its leading columns encode to the bound's bytes, i.e. the bound is a byte
/// prefix of the key. Excluding a bound therefore skips every key under that prefix, and including the
/// high bound extends the interval to the prefix's successor. Bounds that fall between stored values
/// behave the same either way.
pub fn range_to_interval(range: &IndexKeyRange) -> KeyInterval {
    let IndexKeyRange::Bounded(range) = range else {
        return KeyInterval::full();
    };
    let lo = encode_tuple(range.lo());
    let hi = encode_tuple(range.hi());
    let start = if range.lo_inclusive() {
        Some(lo)
    } else {
        match prefix_successor(&lo) {
            Some(succ) => Some(succ),
            None => return KeyInterval::empty(),
        }
    };
    let end = if range.hi_inclusive() { prefix_successor(&hi) } else { Some(hi) };
    KeyInterval { start, end }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::indexing::encode_index_key;
    use arbor_core::{Column, Group, HKey, Value, ValueType};
    use arbor_storage_common::{IndexBound, IndexDef};

    fn index() -> IndexDef {
        let mut group = Group::new("coi");
        let customer = group.add_root("customer", vec![Column::new("cid", ValueType::I64)]).unwrap();
        let order = group.add_child("order", customer, vec![Column::new("oid", ValueType::I64)]).unwrap();
        let item = group.add_child("item", order, vec![Column::new("iid", ValueType::I64)]).unwrap();
        IndexDef::new(&group, "itemIid", item, &[(item, "iid")]).unwrap()
    }

    fn interval(lo: i64, lo_inclusive: bool, hi: i64, hi_inclusive: bool) -> KeyInterval {
        let range = IndexKeyRange::bounded(&index(), Some(IndexBound::prefix([lo])), lo_inclusive, Some(IndexBound::prefix([hi])), hi_inclusive).unwrap();
        range_to_interval(&range)
    }

    fn contains(interval: &KeyInterval, iid: i64) -> bool {
        let key = encode_index_key(&[Value::I64(iid)], &HKey::root(1, 1).child(2, 12).child(3, iid));
        interval.start.as_ref().map_or(true, |s| &key >= s) && interval.end.as_ref().map_or(true, |e| &key < e)
    }

    #[test]
    fn test_inclusive_bounds_cover_matching_keys() {
        let i = interval(121, true, 212, true);
        assert!(contains(&i, 121) && contains(&i, 212));
        assert!(!contains(&i, 120) && !contains(&i, 213));
    }

    #[test]
    fn test_exclusive_bounds_skip_matching_keys() {
        let i = interval(121, false, 212, false);
        assert!(!contains(&i, 121) && !contains(&i, 212));
        assert!(contains(&i, 122) && contains(&i, 211));
    }

    #[test]
    fn test_intervals() {
        assert!(KeyInterval::empty().is_empty());
        assert!(!KeyInterval::full().is_empty());
        assert!(interval(130, true, 120, true).is_empty());
        let a = KeyInterval { start: Some(vec![1]), end: Some(vec![5]) };
        let b = KeyInterval { start: Some(vec![3]), end: None };
        assert_eq!(a.intersect(&b), KeyInterval { start: Some(vec![3]), end: Some(vec![5]) });
        assert_eq!(KeyInterval::prefix(&[0x20, 0xFF]), KeyInterval { start: Some(vec![0x20, 0xFF]), end: Some(vec![0x21]) });
        assert_eq!(range_to_interval(&IndexKeyRange::Unbounded), KeyInterval::full());
    }
}
