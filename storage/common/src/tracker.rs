//! Depth tracking for consumers that render cursor output as nested groups (parent rows containing
//! arrays of child rows).

use arbor_core::{Group, Row, RowType};
use tracing::{trace, warn};

use crate::error::ScanError;
use crate::traits::RowCursor;

/// Tracks the row types open at each depth while a nested rendering walks a cursor
pub trait RowTracker {
    /// Forget all open row types before a new walk
    fn reset(&mut self);

    /// Shallowest depth rendered. Rows at this depth are the top-level objects.
    fn min_depth(&self) -> usize;

    /// Deepest depth rendered. Deeper rows are skipped.
    fn max_depth(&self) -> usize;

    fn begin_row(&mut self, row: &Row);

    /// Depth of the row passed to the last `begin_row`
    fn row_depth(&self) -> usize;

    /// True if the current row has the same type as the row open at its depth
    fn is_same_row_type(&self) -> bool;

    /// Record the current row's type as open at its depth
    fn push_row_type(&mut self);

    fn pop_row_type(&mut self);

    /// Name of the group the current row starts, used as the key of its array
    fn row_name(&self) -> &str;
}

/// Tracks row types by their nesting depth in the group
#[derive(Debug, Clone)]
pub struct DepthRowTracker {
    min_depth: usize,
    max_depth: usize,
    open: Vec<RowType>,
    current: Option<RowType>,
}

impl DepthRowTracker {
    pub fn new(min_depth: usize, max_depth: usize) -> Self { Self { min_depth, max_depth, open: Vec::new(), current: None } }

    /// Render every level of the group
    pub fn for_group(group: &Group) -> Self { Self::new(0, group.max_depth()) }
}

impl RowTracker for DepthRowTracker {
    fn reset(&mut self) {
        self.open.clear();
        self.current = None;
    }

    fn min_depth(&self) -> usize { self.min_depth }

    fn max_depth(&self) -> usize { self.max_depth }

    fn begin_row(&mut self, row: &Row) { self.current = Some(row.row_type().clone()); }

    fn row_depth(&self) -> usize { self.current.as_ref().map_or(0, RowType::depth) }

    fn is_same_row_type(&self) -> bool {
        let Some(current) = &self.current else { return false };
        current.depth().checked_sub(self.min_depth).and_then(|level| self.open.get(level)).is_some_and(|open| open == current)
    }

    fn push_row_type(&mut self) {
        if let Some(current) = &self.current {
            self.open.push(current.clone());
        }
    }

    fn pop_row_type(&mut self) { self.open.pop(); }

    fn row_name(&self) -> &str { self.current.as_ref().map_or("", RowType::name) }
}

/// Where a row lands in the nested output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPlacement<'a> {
    /// Starts a top-level object
    Top,
    /// Follows a row of the same type in the same group
    Sibling,
    /// Opens a new group of children named after the row's table
    FirstChild(&'a str),
}

/// Receives the bracket structure of a nested walk
pub trait NestedRowVisitor {
    fn begin_row(&mut self, row: &Row, placement: RowPlacement<'_>);

    /// Close the innermost open row. `closes_group` is set when the row's group of children ends with it.
    fn end_row(&mut self, closes_group: bool);
}

/// Drain an open cursor into a balanced nested structure.
///
/// Consecutive related rows may deepen by at most one level. Rows shallower than the tracker's minimum
/// depth or deeper than its maximum are skipped. Returns false if no row within the band was produced.
pub fn walk_nested<C, T, V>(cursor: &mut C, tracker: &mut T, visitor: &mut V) -> Result<bool, ScanError>
where
    C: RowCursor,
    T: RowTracker,
    V: NestedRowVisitor,
{
    tracker.reset();
    let min_depth = tracker.min_depth() as isize;
    let max_depth = tracker.max_depth() as isize;
    let mut depth = min_depth - 1;
    while let Some(row) = cursor.next()? {
        trace!("nested row {}", row.hkey());
        tracker.begin_row(&row);
        let row_depth = tracker.row_depth() as isize;
        if row_depth < min_depth {
            continue;
        }
        let mut begun = false;
        if depth >= row_depth {
            begun = tracker.is_same_row_type();
            while depth >= row_depth {
                visitor.end_row(depth > row_depth || !begun);
                depth -= 1;
                tracker.pop_row_type();
            }
        }
        if row_depth > max_depth {
            continue;
        }
        if row_depth != depth + 1 {
            warn!("row {} at depth {} skips a level below depth {}", row.hkey(), row_depth, depth);
        }
        depth = row_depth;
        tracker.push_row_type();
        let placement = if begun {
            RowPlacement::Sibling
        } else if depth > min_depth {
            RowPlacement::FirstChild(tracker.row_name())
        } else {
            RowPlacement::Top
        };
        visitor.begin_row(&row, placement);
    }
    if depth < min_depth {
        return Ok(false);
    }
    while depth >= min_depth {
        visitor.end_row(depth > min_depth);
        depth -= 1;
        tracker.pop_row_type();
    }
    Ok(true)
}
