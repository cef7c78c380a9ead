//! Catalog error definitions

use thiserror::Error;

/// Catalog error types
///
/// Represents all possible errors that can occur during catalog operations
/// such as record creation, lookup, column mutation and persistence.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Table already exists
    #[error("Table already exists: {0}")]
    TableAlreadyExists(String),
    /// Table not found
    #[error("Table not found: {0}")]
    TableNotFound(String),
    /// Column already exists in table
    #[error("Column already exists: {table}.{column}")]
    ColumnAlreadyExists { table: String, column: String },
    /// Column missing from the table's record
    #[error("Column not found: {table}.{column}")]
    ColumnNotFound { table: String, column: String },
    /// I/O error during catalog operation
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Error encoding or decoding a catalog record
    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
    /// Stored record failed its checksum
    #[error("Corrupted catalog record: {0}")]
    Corrupted(String),
    /// Invalid argument provided
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CatalogError {
    pub(crate) fn column_exists(table: &str, column: &str) -> Self {
        CatalogError::ColumnAlreadyExists {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    pub(crate) fn column_missing(table: &str, column: &str) -> Self {
        CatalogError::ColumnNotFound {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
