pub mod collation;
pub mod error;
pub mod hkey;
pub mod indexing;
pub mod row;
pub mod schema;
pub mod value;

pub use error::{EncodingError, SchemaError};
pub use hkey::{HKey, HKeySegment};
pub use row::Row;
pub use schema::{Column, Group, RowType, Table, TableId};
pub use value::{Value, ValueType};
