pub mod bounds;
pub mod error;
pub mod index_spec;
pub mod planner;
pub mod tracker;
pub mod traits;
pub mod types;

pub use bounds::{BoundedRange, IndexBound, IndexColumnSelector, IndexKeyRange};
pub use error::{RangeError, ScanError};
pub use index_spec::*;
pub use planner::*;
pub use tracker::{DepthRowTracker, NestedRowVisitor, RowPlacement, RowTracker, walk_nested};
pub use traits::{CursorState, RowCursor, Rows};
pub use types::*;
