//! Error types for the core data model.

use thiserror::Error;

use crate::schema::TableId;

/// Problems building a group schema or an index definition against it
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("group {0} already has a root table")]
    RootExists(String),
    #[error("unknown table {0:?}")]
    UnknownTable(TableId),
    #[error("duplicate table name: {0}")]
    DuplicateTable(String),
    #[error("table {table:?} has no column {column}")]
    UnknownColumn { table: TableId, column: String },
    #[error("column {column} of table {table:?} is not on the branch leading to {leaf:?}")]
    ColumnOffBranch { table: TableId, column: String, leaf: TableId },
    #[error("index {0} has no columns")]
    NoColumns(String),
}

/// A key could not be decoded from its stored bytes
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("unexpected end of key at byte {0}")]
    Truncated(usize),
    #[error("unknown type tag {tag:#04x} at byte {pos}")]
    UnknownTag { tag: u8, pos: usize },
    #[error("invalid escape sequence at byte {0}")]
    BadEscape(usize),
    #[error("string value is not valid UTF-8")]
    InvalidUtf8,
}
