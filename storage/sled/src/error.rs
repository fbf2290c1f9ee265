use arbor_core::{EncodingError, SchemaError, Value, ValueType};
use arbor_storage_common::ScanError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Storage error: {0}")]
    StorageError(#[from] sled::Error),
    #[error("Bincode error: {0}")]
    BincodeError(#[from] bincode::Error),
    #[error("Encoding error: {0}")]
    EncodingError(#[from] EncodingError),
    #[error("Schema error: {0}")]
    SchemaError(#[from] SchemaError),
    #[error("Invalid key length")]
    InvalidKeyLength,
    #[error("Group not registered: {0}")]
    UnknownGroup(String),
    #[error("Group already registered: {0}")]
    GroupExists(String),
    #[error("Index already exists: {0}")]
    IndexExists(String),
    #[error("Index {index} has {expected} columns, got {got} values")]
    WidthMismatch { index: String, expected: usize, got: usize },
    #[error("Column {column} expects {expected:?}, got {got}")]
    TypeMismatch { column: String, expected: ValueType, got: Value },
    #[error("HKey {0} does not lie on the index branch")]
    HKeyOffBranch(String),
    #[error("Entry names unknown table ordinal {0}")]
    UnknownOrdinal(u32),
}

impl From<IndexError> for ScanError {
    fn from(err: IndexError) -> Self { ScanError::StorageError(Box::new(err)) }
}
