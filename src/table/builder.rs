//! TableBuilder for fluent table construction
//!
//! Provides a builder pattern for creating table specifications with:
//! - Column definition with automatic ordinals
//! - Validation before build

use std::collections::HashSet;

use crate::table::{ColumnSpec, TableSpec, is_valid_identifier};

/// Builder for constructing TableSpec instances
///
/// # Example
/// ```
/// use dyntable::table::{ColumnSpec, TableBuilder};
/// use dyntable::types::ColumnType;
///
/// let table = TableBuilder::new("users".to_string())
///     .column(ColumnSpec::nullable("age", ColumnType::Int32))
///     .column(ColumnSpec::nullable("name", ColumnType::Varchar(255)))
///     .try_build()
///     .unwrap();
/// assert_eq!(table.column_count(), 2);
/// ```
#[derive(Debug)]
pub struct TableBuilder {
    table_name: String,
    columns: Vec<ColumnSpec>,
}

impl TableBuilder {
    /// Create a new table builder
    pub fn new(table_name: String) -> Self {
        Self {
            table_name,
            columns: Vec::new(),
        }
    }

    /// Add a single column
    ///
    /// Automatically assigns ordinal based on current column count
    pub fn column(mut self, column: ColumnSpec) -> Self {
        let ordinal = self.columns.len() as u32;
        self.columns.push(column.with_ordinal(ordinal));
        self
    }

    /// Build with validation
    ///
    /// The table name and every column name must be plain identifiers and
    /// column names must be unique.
    pub fn try_build(self) -> Result<TableSpec, String> {
        if self.table_name.is_empty() {
            return Err("table_name cannot be empty".to_string());
        }
        if !is_valid_identifier(&self.table_name) {
            return Err(format!("invalid table name '{}'", self.table_name));
        }

        let mut seen = HashSet::new();
        for col in &self.columns {
            if !is_valid_identifier(col.name()) {
                return Err(format!("invalid column name '{}'", col.name()));
            }
            if !seen.insert(col.name()) {
                return Err(format!("duplicate column name '{}'", col.name()));
            }
        }

        Ok(TableSpec::with_columns(self.table_name, self.columns))
    }
}
