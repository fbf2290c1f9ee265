use arbor_core::TableId;
use serde::{Deserialize, Serialize};

use crate::bounds::IndexKeyRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanDirection {
    Forward,
    Reverse,
}

impl ScanDirection {
    pub fn is_reverse(&self) -> bool { matches!(self, ScanDirection::Reverse) }

    pub fn flip(self) -> Self {
        match self {
            ScanDirection::Forward => ScanDirection::Reverse,
            ScanDirection::Reverse => ScanDirection::Forward,
        }
    }
}

/// One column of an explicit ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderingColumn {
    pub column: usize,
    pub ascending: bool,
}

/// Per-column sort directions over a leading prefix of the index columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ordering {
    pub columns: Vec<OrderingColumn>,
}

impl Ordering {
    pub fn new() -> Self { Self::default() }

    pub fn append(mut self, column: usize, ascending: bool) -> Self {
        self.columns.push(OrderingColumn { column, ascending });
        self
    }

    pub fn len(&self) -> usize { self.columns.len() }

    pub fn is_empty(&self) -> bool { self.columns.is_empty() }
}

/// A request to scan one index: which range, in which order, and optionally which row type to surface
#[derive(Debug, Clone, PartialEq)]
pub struct IndexScan {
    pub range: IndexKeyRange,
    pub ordering: Option<Ordering>,
    pub direction: ScanDirection,
    pub leaf: Option<TableId>,
}

impl IndexScan {
    /// Every entry of the index, in natural order
    pub fn full() -> Self { Self::range(IndexKeyRange::Unbounded) }

    pub fn range(range: IndexKeyRange) -> Self { Self { range, ordering: None, direction: ScanDirection::Forward, leaf: None } }

    pub fn ordered(range: IndexKeyRange, ordering: Ordering) -> Self {
        Self { range, ordering: Some(ordering), direction: ScanDirection::Forward, leaf: None }
    }

    pub fn reverse(mut self) -> Self {
        self.direction = ScanDirection::Reverse;
        self
    }

    pub fn direction(mut self, direction: ScanDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Surface only entries whose row is `table` or one of its descendants
    pub fn leaf_row_type(mut self, table: TableId) -> Self {
        self.leaf = Some(table);
        self
    }
}
