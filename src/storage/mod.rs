//! Physical schema store
//!
//! The storage collaborator the engine drives. It owns the enforced,
//! storage-level schema of every dynamic table and the rows kept in them.
//! The engine only ever reaches it through [`SchemaStore`].

pub mod dialect;
pub mod error;
pub mod memory;

pub use dialect::{PostgresDialect, ROW_ID_COLUMN};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;

use crate::table::{ColumnSpec, TableSpec};
use crate::types::{RowId, Value};

/// A stored row: its identifier and its values by column name, in column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: RowId,
    pub values: Vec<(String, Value)>,
}

impl Row {
    /// Value of a column, `None` if the row has no such column
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

/// DDL executor and row store
pub trait SchemaStore: Send + Sync {
    /// Create a physical table
    fn create_table(&self, spec: &TableSpec) -> StorageResult<()>;

    /// Add a column to an existing table
    fn add_column(&self, table: &str, column: &ColumnSpec) -> StorageResult<()>;

    /// Change a column's name and/or type in one step, converting stored values
    fn alter_column(&self, table: &str, old: &ColumnSpec, new: &ColumnSpec) -> StorageResult<()>;

    /// Drop a column and its values
    fn drop_column(&self, table: &str, column: &ColumnSpec) -> StorageResult<()>;

    /// Current physical definition of a table
    fn describe_table(&self, table: &str) -> StorageResult<TableSpec>;

    /// Insert one row given values by column name; absent columns are NULL
    fn insert_row(&self, table: &str, values: &[(String, Value)]) -> StorageResult<Row>;

    /// All rows in insertion order
    fn scan_rows(&self, table: &str) -> StorageResult<Vec<Row>>;
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
