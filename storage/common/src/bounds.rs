use arbor_core::Value;

use crate::error::RangeError;
use crate::index_spec::IndexDef;

/// The set of index columns a bound constrains
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexColumnSelector {
    columns: Vec<usize>,
}

impl IndexColumnSelector {
    /// The first `n` index columns
    pub fn leading(n: usize) -> Self { Self { columns: (0..n).collect() } }

    pub fn of(columns: impl IntoIterator<Item = usize>) -> Self {
        let mut columns: Vec<usize> = columns.into_iter().collect();
        columns.sort_unstable();
        columns.dedup();
        Self { columns }
    }

    pub fn columns(&self) -> &[usize] { &self.columns }

    pub fn len(&self) -> usize { self.columns.len() }

    pub fn is_empty(&self) -> bool { self.columns.is_empty() }

    /// Number of selected columns if they form a leading prefix `0..n`
    pub fn leading_len(&self) -> Option<usize> { self.columns.iter().enumerate().all(|(i, &c)| i == c).then_some(self.columns.len()) }

    fn validate(&self, width: usize) -> Result<usize, RangeError> {
        if self.columns.is_empty() {
            return Err(RangeError::EmptySelector);
        }
        if let Some(&column) = self.columns.iter().find(|&&c| c >= width) {
            return Err(RangeError::ColumnOutOfRange { column, width });
        }
        self.leading_len().ok_or_else(|| RangeError::NonLeadingSelector(self.columns.clone()))
    }
}

/// One end of a range: index column values by position, and the columns they constrain
#[derive(Debug, Clone, PartialEq)]
pub struct IndexBound {
    values: Vec<Value>,
    selector: IndexColumnSelector,
}

impl IndexBound {
    pub fn new(values: Vec<Value>, selector: IndexColumnSelector) -> Self { Self { values, selector } }

    /// A bound on the leading columns, one per value given
    pub fn prefix<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let selector = IndexColumnSelector::leading(values.len());
        Self { values, selector }
    }

    pub fn values(&self) -> &[Value] { &self.values }

    pub fn selector(&self) -> &IndexColumnSelector { &self.selector }
}

/// Bounds of a validated range. Only the selected leading values are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedRange {
    width: usize,
    lo: Vec<Value>,
    lo_inclusive: bool,
    hi: Vec<Value>,
    hi_inclusive: bool,
}

impl BoundedRange {
    pub fn lo(&self) -> &[Value] { &self.lo }
    pub fn hi(&self) -> &[Value] { &self.hi }
    pub fn lo_inclusive(&self) -> bool { self.lo_inclusive }
    pub fn hi_inclusive(&self) -> bool { self.hi_inclusive }
    /// Number of leading columns the bounds constrain
    pub fn bound_columns(&self) -> usize { self.lo.len() }
    /// Width of the index the range was built for
    pub fn width(&self) -> usize { self.width }
}

/// The range of an index scan. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexKeyRange {
    Unbounded,
    Bounded(BoundedRange),
}

impl IndexKeyRange {
    pub fn unbounded() -> Self { IndexKeyRange::Unbounded }

    /// Build a bounded range, checking the structure of both bounds.
    ///
    /// Whether lo and hi describe a scannable interval is only checked when a cursor opens.
    pub fn bounded(index: &IndexDef, lo: Option<IndexBound>, lo_inclusive: bool, hi: Option<IndexBound>, hi_inclusive: bool) -> Result<Self, RangeError> {
        let (Some(lo), Some(hi)) = (lo, hi) else {
            return Err(RangeError::MissingBound);
        };
        if lo.selector != hi.selector {
            return Err(RangeError::SelectorMismatch { lo: lo.selector.columns.clone(), hi: hi.selector.columns.clone() });
        }
        let width = index.width();
        let n = lo.selector.validate(width)?;
        for bound in [&lo, &hi] {
            if bound.values.len() < n {
                return Err(RangeError::MissingBoundValue(bound.values.len()));
            }
        }
        let mut lo_values = lo.values;
        let mut hi_values = hi.values;
        lo_values.truncate(n);
        hi_values.truncate(n);
        Ok(IndexKeyRange::Bounded(BoundedRange { width, lo: lo_values, lo_inclusive, hi: hi_values, hi_inclusive }))
    }

    /// Entries whose leading columns equal `values`
    pub fn exact<V: Into<Value>>(index: &IndexDef, values: impl IntoIterator<Item = V>) -> Result<Self, RangeError> {
        let bound = IndexBound::prefix(values);
        Self::bounded(index, Some(bound.clone()), true, Some(bound), true)
    }

    pub fn is_bounded(&self) -> bool { matches!(self, IndexKeyRange::Bounded(_)) }
}
