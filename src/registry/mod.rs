//! Type registry
//!
//! Maps the logical column types callers may use onto physical column types.
//! The mapping is a single const table; supporting a new logical type means
//! adding one row to [`BUILTIN_TYPES`].

use thiserror::Error;

use crate::types::{ColumnType, STRING_MAX_LENGTH};

/// Logical type name to physical type
pub const BUILTIN_TYPES: &[(&str, ColumnType)] = &[
    ("string", ColumnType::Varchar(STRING_MAX_LENGTH)),
    ("number", ColumnType::Int32),
    ("boolean", ColumnType::Bool),
];

/// Raised for a logical type outside the registered set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown column type '{0}'")]
pub struct UnknownType(pub String);

/// Result type for registry lookups
pub type RegistryResult<T> = Result<T, UnknownType>;

/// Closed lookup table of logical types
#[derive(Debug, Clone, Copy)]
pub struct TypeRegistry {
    entries: &'static [(&'static str, ColumnType)],
}

impl TypeRegistry {
    /// Registry over the builtin types
    pub const fn builtin() -> Self {
        Self {
            entries: BUILTIN_TYPES,
        }
    }

    /// Resolve a logical type name to its physical column type
    pub fn resolve(&self, logical_type: &str) -> RegistryResult<ColumnType> {
        self.entries
            .iter()
            .find(|(name, _)| *name == logical_type)
            .map(|(_, column_type)| *column_type)
            .ok_or_else(|| UnknownType(logical_type.to_string()))
    }

    pub fn is_known(&self, logical_type: &str) -> bool {
        self.resolve(logical_type).is_ok()
    }

    /// Registered logical type names in table order
    pub fn known_types(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(name, _)| *name).collect()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_builtin_types() {
        let registry = TypeRegistry::builtin();
        assert_eq!(registry.resolve("string").unwrap(), ColumnType::Varchar(255));
        assert_eq!(registry.resolve("number").unwrap(), ColumnType::Int32);
        assert_eq!(registry.resolve("boolean").unwrap(), ColumnType::Bool);
    }

    #[test]
    fn test_resolve_unknown_type() {
        let registry = TypeRegistry::default();
        let err = registry.resolve("currency").unwrap_err();
        assert_eq!(err, UnknownType("currency".to_string()));
        assert_eq!(err.to_string(), "Unknown column type 'currency'");

        // Lookups are exact
        assert!(!registry.is_known("String"));
        assert!(!registry.is_known(""));
    }

    #[test]
    fn test_known_types_order() {
        assert_eq!(
            TypeRegistry::builtin().known_types(),
            vec!["string", "number", "boolean"]
        );
    }
}
