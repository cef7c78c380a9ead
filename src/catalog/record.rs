//! Catalog record layout
//!
//! One record per dynamic table: the table name and its ordered logical
//! column list. This is the persisted source of truth for what a table looks
//! like logically.

use serde::{Deserialize, Serialize};

use crate::catalog::error::{CatalogError, CatalogResult};

/// Logical column: a name and a registry type name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    #[serde(alias = "colname")]
    pub name: String,
    #[serde(rename = "type", alias = "coltype")]
    pub type_name: String,
}

impl Column {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Persistent description of one dynamic table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    #[serde(alias = "tblname")]
    pub table_name: String,
    pub columns: Vec<Column>,
}

impl CatalogRecord {
    pub fn new(table_name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
        }
    }

    /// Get column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in record order
    pub fn field_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Append a column, refusing a name already present
    pub fn append_column(&mut self, column: Column) -> CatalogResult<()> {
        if self.column(&column.name).is_some() {
            return Err(CatalogError::column_exists(&self.table_name, &column.name));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Remove a column by name
    pub fn remove_column(&mut self, column_name: &str) -> CatalogResult<Column> {
        let idx = self
            .columns
            .iter()
            .position(|c| c.name == column_name)
            .ok_or_else(|| CatalogError::column_missing(&self.table_name, column_name))?;
        Ok(self.columns.remove(idx))
    }

    /// Replace the column named `old_name` in place, keeping its position
    pub fn replace_column(&mut self, old_name: &str, new_column: Column) -> CatalogResult<Column> {
        let idx = self
            .columns
            .iter()
            .position(|c| c.name == old_name)
            .ok_or_else(|| CatalogError::column_missing(&self.table_name, old_name))?;

        if new_column.name != old_name && self.column(&new_column.name).is_some() {
            return Err(CatalogError::column_exists(&self.table_name, &new_column.name));
        }

        Ok(std::mem::replace(&mut self.columns[idx], new_column))
    }
}
