//! Engine error types
//!
//! Every failure carries a stable [`EngineError::code`] for callers to match
//! on and a human-readable [`EngineError::detail`].

use std::fmt;

use thiserror::Error;

use crate::access::AccessError;
use crate::catalog::error::CatalogError;
use crate::command::InvalidCommand;
use crate::model::ModelError;
use crate::registry::UnknownType;
use crate::storage::StorageError;

/// Mutation named in reconciliation entries and sync failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateTable,
    AddColumn,
    AlterColumn,
    RemoveColumn,
    /// Startup comparison of catalog and store
    Verify,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::CreateTable => "create_table",
            Operation::AddColumn => "add_column",
            Operation::AlterColumn => "alter_column",
            Operation::RemoveColumn => "remove_column",
            Operation::Verify => "verify_catalog",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    UnknownType(#[from] UnknownType),

    #[error("Table '{0}' does not exist.")]
    TableNotFound(String),

    #[error("Table '{0}' already exists.")]
    DuplicateTable(String),

    #[error("Error while creating table '{table}': {reason}")]
    TableCreate { table: String, reason: String },

    #[error("Error while creating field '{column}' on '{table}': {reason}")]
    ColumnAdd {
        table: String,
        column: String,
        reason: String,
    },

    #[error("Column '{column}' was not found in '{table}'")]
    ColumnNotFound { table: String, column: String },

    #[error("Column '{column}' of '{table}' cannot be changed: {reason}")]
    ColumnConflict {
        table: String,
        column: String,
        reason: String,
    },

    #[error("Column '{column}' of '{table}' cannot be converted to '{type_name}': {reason}")]
    TypeConversion {
        table: String,
        column: String,
        type_name: String,
        reason: String,
    },

    #[error("Error while removing column '{column}' from '{table}': {reason}")]
    ColumnRemove {
        table: String,
        column: String,
        reason: String,
    },

    /// Physical change applied, catalog record not written
    #[error("Table '{table}' was changed by {operation} but its catalog record could not be written: {source}")]
    CatalogSync {
        table: String,
        operation: Operation,
        #[source]
        source: CatalogError,
    },

    #[error(transparent)]
    InvalidCommand(#[from] InvalidCommand),

    #[error("Service temporarily unavailable, try again later. ({0})")]
    Storage(StorageError),

    #[error("Catalog error: {0}")]
    Catalog(CatalogError),

    #[error(transparent)]
    Access(#[from] AccessError),
}

impl From<ModelError> for EngineError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::TableNotFound(name) => EngineError::TableNotFound(name),
            ModelError::UnknownType { source, .. } => EngineError::UnknownType(source),
            ModelError::InvalidRecord { table, reason } => {
                EngineError::Catalog(CatalogError::Corrupted(format!("{table}: {reason}")))
            }
            ModelError::Catalog(err) => EngineError::Catalog(err),
        }
    }
}

impl EngineError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::UnknownType(_) => "unknown_type",
            EngineError::TableNotFound(_) => "table_load_error",
            EngineError::DuplicateTable(_) => "duplicate_table",
            EngineError::TableCreate { .. } => "table_create_error",
            EngineError::ColumnAdd { .. } => "field_add_error",
            EngineError::ColumnNotFound { .. } => "not_found",
            EngineError::ColumnConflict { .. } => "column_error",
            EngineError::TypeConversion { .. } => "data_convert_error",
            EngineError::ColumnRemove { .. } => "remove_column_error",
            EngineError::CatalogSync { .. } => "catalog_sync_error",
            EngineError::InvalidCommand(_) => "invalid_command",
            EngineError::Storage(_) => "storage_error",
            EngineError::Catalog(_) => "catalog_error",
            EngineError::Access(err) => err.code(),
        }
    }

    pub fn detail(&self) -> String {
        self.to_string()
    }

    pub(crate) fn column_not_found(table: &str, column: &str) -> Self {
        EngineError::ColumnNotFound {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        let cases: Vec<(EngineError, &str)> = vec![
            (UnknownType("currency".to_string()).into(), "unknown_type"),
            (EngineError::TableNotFound("t1".to_string()), "table_load_error"),
            (EngineError::DuplicateTable("t1".to_string()), "duplicate_table"),
            (EngineError::column_not_found("t1", "age"), "not_found"),
            (
                EngineError::CatalogSync {
                    table: "t1".to_string(),
                    operation: Operation::AddColumn,
                    source: CatalogError::TableNotFound("t1".to_string()),
                },
                "catalog_sync_error",
            ),
            (
                InvalidCommand("missing".to_string()).into(),
                "invalid_command",
            ),
        ];

        for (err, code) in cases {
            assert_eq!(err.code(), code, "{err}");
        }
    }

    #[test]
    fn test_detail_messages() {
        assert_eq!(
            EngineError::from(UnknownType("currency".to_string())).detail(),
            "Unknown column type 'currency'"
        );
        assert_eq!(
            EngineError::column_not_found("t1", "age").detail(),
            "Column 'age' was not found in 't1'"
        );
        assert_eq!(Operation::AlterColumn.to_string(), "alter_column");
        assert_eq!(Operation::Verify.to_string(), "verify_catalog");
    }

    #[test]
    fn test_model_error_conversion() {
        let err: EngineError = ModelError::TableNotFound("t9".to_string()).into();
        assert_eq!(err.code(), "table_load_error");
        assert_eq!(err.detail(), "Table 't9' does not exist.");
    }
}
