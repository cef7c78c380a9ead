//! Physical table definitions
//!
//! This module describes tables the way the store sees them:
//! - Column specifications (name, physical type, nullability, position)
//! - Table specifications (ordered column list under a table name)
//! - A builder that assigns ordinals and validates names before DDL is issued

pub mod builder;
pub mod column;
pub mod table;

pub use builder::TableBuilder;
pub use column::ColumnSpec;
pub use table::TableSpec;

/// Check that a table or column name is a plain identifier
///
/// Names become physical identifiers and catalog file names, so only
/// `[A-Za-z_][A-Za-z0-9_]*` is accepted.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
