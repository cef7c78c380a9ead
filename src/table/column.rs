//! Physical column definition

use serde::{Deserialize, Serialize};

use crate::types::ColumnType;

/// Physical column specification
///
/// Represents a single storage-level column with:
/// - name: Column identifier
/// - column_type: Physical data type
/// - nullable: Whether NULL values are allowed
/// - ordinal: Position in table schema (0-indexed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name
    name: String,
    /// Column data type
    column_type: ColumnType,
    /// Whether NULL values are allowed
    nullable: bool,
    /// Column position in table (0-indexed)
    ordinal: u32,
}

impl ColumnSpec {
    /// Create a new column specification
    ///
    /// # Arguments
    /// * `name` - Column name
    /// * `column_type` - Physical data type
    /// * `nullable` - Whether NULL is allowed
    /// * `ordinal` - Position in table schema
    pub fn new(name: String, column_type: ColumnType, nullable: bool, ordinal: u32) -> Self {
        Self {
            name,
            column_type,
            nullable,
            ordinal,
        }
    }

    /// Create a nullable column, the shape every dynamic column takes
    pub fn nullable(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self::new(name.into(), column_type, true, 0)
    }

    /// Get column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get column type
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Check if column is nullable
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Get column ordinal (position in table)
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Same column placed at another position
    pub fn with_ordinal(mut self, ordinal: u32) -> Self {
        self.ordinal = ordinal;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_new() {
        let col = ColumnSpec::new("id".to_string(), ColumnType::Int32, false, 0);
        assert_eq!(col.name(), "id");
        assert_eq!(col.column_type(), ColumnType::Int32);
        assert!(!col.is_nullable());
        assert_eq!(col.ordinal(), 0);
    }

    #[test]
    fn test_column_nullable() {
        let col = ColumnSpec::nullable("name", ColumnType::Varchar(255));
        assert!(col.is_nullable());
        assert_eq!(col.column_type(), ColumnType::Varchar(255));
    }

    #[test]
    fn test_column_with_ordinal() {
        let col = ColumnSpec::nullable("age", ColumnType::Int32).with_ordinal(5);
        assert_eq!(col.ordinal(), 5);
        assert_eq!(col.name(), "age");
    }
}
