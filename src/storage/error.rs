//! Storage error definitions

use thiserror::Error;

use crate::types::{CastError, ColumnType};

/// Storage error types
///
/// Failures reported by the physical store when it rejects a DDL step or a
/// row write. Only [`StorageError::Unavailable`] describes a fault of the
/// store itself; every other variant is a rejection of the request.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Physical table already exists
    #[error("relation \"{0}\" already exists")]
    TableExists(String),
    /// Physical table does not exist
    #[error("relation \"{0}\" does not exist")]
    TableNotFound(String),
    /// Column name already used in the table
    #[error("column \"{column}\" of relation \"{table}\" already exists")]
    ColumnExists { table: String, column: String },
    /// Column does not exist in the table
    #[error("column \"{column}\" of relation \"{table}\" does not exist")]
    ColumnNotFound { table: String, column: String },
    /// Existing data cannot be converted to a new column type
    #[error("cannot convert column \"{column}\" of relation \"{table}\": {source}")]
    Conversion {
        table: String,
        column: String,
        #[source]
        source: CastError,
    },
    /// NULL where the column does not allow it
    #[error("column \"{column}\" of relation \"{table}\" violates not-null constraint")]
    NotNull { table: String, column: String },
    /// Value does not match the column type
    #[error("invalid value {value} for column \"{column}\" of type {column_type}")]
    InvalidValue {
        column: String,
        value: String,
        column_type: ColumnType,
    },
    /// The store could not process the request at all
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn column_exists(table: &str, column: &str) -> Self {
        StorageError::ColumnExists {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    pub fn column_missing(table: &str, column: &str) -> Self {
        StorageError::ColumnNotFound {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    /// Existing values could not be converted
    pub fn is_conversion(&self) -> bool {
        matches!(self, StorageError::Conversion { .. })
    }

    /// A fault of the store rather than a rejected request
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StorageError::Unavailable(_))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
