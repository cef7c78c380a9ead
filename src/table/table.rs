//! Physical table specification

use serde::{Deserialize, Serialize};

use crate::table::ColumnSpec;

/// Physical table specification
///
/// The storage-level shape of one dynamic table:
/// - table_name: Physical identifier, identical to the catalog key
/// - columns: Column specifications in ordinal order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Table name
    pub table_name: String,
    /// Column definitions
    pub columns: Vec<ColumnSpec>,
}

impl TableSpec {
    /// Create a table specification without columns
    pub fn new(table_name: String) -> Self {
        Self {
            table_name,
            columns: Vec::new(),
        }
    }

    /// Create a table specification with columns
    pub fn with_columns(table_name: String, columns: Vec<ColumnSpec>) -> Self {
        Self {
            table_name,
            columns,
        }
    }

    /// Get table name
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Get column by name
    pub fn get_column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Index of a column in the ordered list
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Get all columns
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Get column count
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column names in ordinal order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }
}
