use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::value::Value;

/// One step of an ancestry path: the ordinal of a table within its group and the row's key value in it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HKeySegment {
    pub ordinal: u32,
    pub value: Value,
}

/// Hierarchical key: the full ancestry path of a row, from the group root down to the row's own table.
///
/// Ordering is lexicographic over the segments, so an ancestor sorts immediately before its descendants
/// and every subtree occupies a contiguous run of keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HKey {
    segments: Vec<HKeySegment>,
}

impl HKey {
    pub fn new(segments: Vec<HKeySegment>) -> Self { Self { segments } }

    pub fn root(ordinal: u32, value: impl Into<Value>) -> Self { Self { segments: vec![HKeySegment { ordinal, value: value.into() }] } }

    /// The key of a child row of this one
    pub fn child(&self, ordinal: u32, value: impl Into<Value>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(HKeySegment { ordinal, value: value.into() });
        Self { segments }
    }

    pub fn segments(&self) -> &[HKeySegment] { &self.segments }

    pub fn len(&self) -> usize { self.segments.len() }

    pub fn is_empty(&self) -> bool { self.segments.is_empty() }

    /// Ordinal of the table that owns the row this key identifies
    pub fn leaf_ordinal(&self) -> Option<u32> { self.segments.last().map(|s| s.ordinal) }

    /// True if this key passes through the table with the given ordinal
    pub fn reaches(&self, ordinal: u32) -> bool { self.segments.iter().any(|s| s.ordinal == ordinal) }

    pub fn is_ancestor_of(&self, other: &HKey) -> bool {
        self.segments.len() < other.segments.len() && other.segments.starts_with(&self.segments)
    }

    /// The key of the ancestor `depth` levels below the root (depth 0 is the root row)
    pub fn ancestor(&self, depth: usize) -> Option<HKey> {
        (depth < self.segments.len()).then(|| HKey { segments: self.segments[..=depth].to_vec() })
    }
}

impl Display for HKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{},{}", segment.ordinal, segment.value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(cid: i64, oid: i64, iid: i64) -> HKey { HKey::root(1, cid).child(2, oid).child(3, iid) }

    #[test]
    fn test_display() {
        assert_eq!(item(1, 11, 111).to_string(), "{1,1,2,11,3,111}");
        assert_eq!(HKey::default().to_string(), "{}");
    }

    #[test]
    fn test_ancestor_sorts_before_descendants() {
        let customer = HKey::root(1, 1);
        let order = customer.child(2, 11);
        let item = order.child(3, 111);
        let next_customer = HKey::root(1, 2);

        assert!(customer < order);
        assert!(order < item);
        assert!(item < next_customer);
        assert!(customer.is_ancestor_of(&item));
        assert!(!item.is_ancestor_of(&customer));
        assert!(!customer.is_ancestor_of(&customer));
    }

    #[test]
    fn test_subtrees_are_contiguous() {
        let mut keys = vec![item(2, 21, 211), HKey::root(1, 2), item(1, 12, 121), HKey::root(1, 1), HKey::root(1, 1).child(2, 12)];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(rendered, vec!["{1,1}", "{1,1,2,12}", "{1,1,2,12,3,121}", "{1,2}", "{1,2,2,21,3,211}"]);
    }

    #[test]
    fn test_accessors() {
        let key = item(1, 11, 111);
        assert_eq!(key.len(), 3);
        assert_eq!(key.leaf_ordinal(), Some(3));
        assert!(key.reaches(2));
        assert!(!key.reaches(4));
        assert_eq!(key.ancestor(1), Some(HKey::root(1, 1).child(2, 11)));
        assert_eq!(key.ancestor(3), None);
    }
}
