use arbor_core::TableId;
use tracing::trace;

use crate::bounds::{BoundedRange, IndexKeyRange};
use crate::error::{RangeError, ScanError};
use crate::index_spec::IndexDef;
use crate::types::{IndexScan, ScanDirection};

/// Iteration order of a scan after folding the global direction into the ordering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOrder {
    /// Every column, and the HKey tie-break, in one direction
    Unidirectional(ScanDirection),
    /// Effective direction of each leading ordering column. Columns past the ordering follow the last one.
    Mixed(Vec<ScanDirection>),
}

/// A scan that passed open-time validation
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPlan {
    pub range: IndexKeyRange,
    pub order: ScanOrder,
    pub leaf: Option<TableId>,
}

/// Structural checks of a scan request against the index it targets. Run when the cursor is built.
pub fn check_request(index: &IndexDef, scan: &IndexScan) -> Result<(), RangeError> {
    if let IndexKeyRange::Bounded(range) = &scan.range
        && range.width() != index.width()
    {
        return Err(RangeError::WidthMismatch { range: range.width(), index: index.width() });
    }
    if let Some(ordering) = &scan.ordering {
        if ordering.is_empty() {
            return Err(RangeError::InvalidOrdering("ordering has no columns".into()));
        }
        if ordering.len() > index.width() {
            return Err(RangeError::InvalidOrdering(format!("{} columns for an index of width {}", ordering.len(), index.width())));
        }
        for (position, col) in ordering.columns.iter().enumerate() {
            if col.column != position {
                return Err(RangeError::InvalidOrdering(format!("column {} at position {} is not the next index column", col.column, position)));
            }
        }
    }
    if let Some(leaf) = scan.leaf
        && !index.on_branch(leaf)
    {
        return Err(RangeError::LeafNotOnBranch(leaf));
    }
    Ok(())
}

/// Validate the range semantics and fix the iteration order. Run when the cursor opens.
pub fn plan_scan(scan: &IndexScan) -> Result<ScanPlan, ScanError> {
    if let IndexKeyRange::Bounded(range) = &scan.range {
        check_inequalities(range)?;
    }
    let order = scan_order(scan);
    trace!("planned scan order {:?} for range {:?}", order, scan.range);
    Ok(ScanPlan { range: scan.range.clone(), order, leaf: scan.leaf })
}

/// The first bound column where lo and hi differ is the inequality column. Bound columns after it
/// are not constrained by the lexicographic interval, so any of them counts as a second inequality.
/// Bounds are in natural order regardless of scan direction.
pub fn check_inequalities(range: &BoundedRange) -> Result<(), ScanError> {
    let Some(first) = range.lo().iter().zip(range.hi()).position(|(lo, hi)| lo != hi) else {
        return Ok(());
    };
    if range.lo()[first] > range.hi()[first] {
        return Err(ScanError::BadRange { column: first });
    }
    if first + 1 < range.bound_columns() {
        return Err(ScanError::MultipleInequalities { first, second: first + 1 });
    }
    Ok(())
}

fn scan_order(scan: &IndexScan) -> ScanOrder {
    let Some(ordering) = &scan.ordering else {
        return ScanOrder::Unidirectional(scan.direction);
    };
    let directions: Vec<ScanDirection> = ordering
        .columns
        .iter()
        .map(|col| if col.ascending != scan.direction.is_reverse() { ScanDirection::Forward } else { ScanDirection::Reverse })
        .collect();
    match directions.first() {
        Some(&first) if directions.iter().all(|&d| d == first) => ScanOrder::Unidirectional(first),
        Some(_) => ScanOrder::Mixed(directions),
        None => ScanOrder::Unidirectional(scan.direction),
    }
}
