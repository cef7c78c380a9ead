//! Record access errors

use thiserror::Error;

use crate::model::ModelError;
use crate::rows::RowError;
use crate::storage::StorageError;

/// Record access error types
#[derive(Debug, Error)]
pub enum AccessError {
    /// No catalog record for the table
    #[error("Table '{0}' does not exist.")]
    TableNotFound(String),
    /// The table's handle could not be built
    #[error("Error while loading table '{table}': {reason}")]
    TableLoad { table: String, reason: String },
    /// The payload failed row validation
    #[error(transparent)]
    InvalidRow(#[from] RowError),
    /// The store refused the row or could not be read
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AccessError {
    pub(crate) fn from_model(table: &str, err: ModelError) -> Self {
        match err {
            ModelError::TableNotFound(name) => AccessError::TableNotFound(name),
            other => AccessError::TableLoad {
                table: table.to_string(),
                reason: other.to_string(),
            },
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            AccessError::TableNotFound(_) | AccessError::TableLoad { .. } => "table_load_error",
            AccessError::InvalidRow(_) => "invalid_row",
            AccessError::Storage(_) => "storage_error",
        }
    }

    pub fn detail(&self) -> String {
        self.to_string()
    }
}

/// Result type for record access
pub type AccessResult<T> = Result<T, AccessError>;
