use arbor_core::TableId;
use thiserror::Error;

/// A structurally malformed range or scan request. Raised when the range or scan is built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("a bounded range needs both a low and a high bound")]
    MissingBound,
    #[error("low and high bounds select different columns: {lo:?} vs {hi:?}")]
    SelectorMismatch { lo: Vec<usize>, hi: Vec<usize> },
    #[error("selector {0:?} is not a leading prefix of the index columns")]
    NonLeadingSelector(Vec<usize>),
    #[error("selector selects no columns")]
    EmptySelector,
    #[error("column {column} is out of range for an index of width {width}")]
    ColumnOutOfRange { column: usize, width: usize },
    #[error("bound has no value for selected column {0}")]
    MissingBoundValue(usize),
    #[error("invalid ordering: {0}")]
    InvalidOrdering(String),
    #[error("range was built for an index of width {range}, index has width {index}")]
    WidthMismatch { range: usize, index: usize },
    #[error("table {0:?} is not on the index branch")]
    LeafNotOnBranch(TableId),
}

/// Errors raised by a cursor once a scan is opened or running
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("range has inequalities on both column {first} and column {second}")]
    MultipleInequalities { first: usize, second: usize },
    #[error("low bound sorts after high bound at column {column}")]
    BadRange { column: usize },
    #[error("cursor is not open")]
    NotOpen,
    #[error("cursor is already open")]
    AlreadyOpen,
    #[error("cursor failed and must be closed")]
    Failed,
    #[error("storage error: {0}")]
    StorageError(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl ScanError {
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self { ScanError::StorageError(Box::new(err)) }
}
