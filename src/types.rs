use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Global type definitions
///
/// Physical column types, stored values and the small set of constants shared
/// by the catalog, the store and the engine.
/// Maximum length of a `string` column
pub const STRING_MAX_LENGTH: u32 = 255;

/// Row identifier assigned by the store
pub type RowId = u64;

/// Column type enumeration for physical table schema
///
/// Represents the storage-level type of a column. Logical types exposed to
/// callers are mapped onto these by the type registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// 32-bit signed integer
    Int32,
    /// Variable-length string with maximum length
    Varchar(u32),
    /// Boolean
    Bool,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Int32 => write!(f, "INT32"),
            ColumnType::Varchar(max_len) => write!(f, "VARCHAR({})", max_len),
            ColumnType::Bool => write!(f, "BOOL"),
        }
    }
}

/// A single stored value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Int32(i32),
    Bool(bool),
    Varchar(String),
}

/// Raised when a stored value cannot be represented in a new column type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot cast {value} to {target}")]
pub struct CastError {
    pub value: String,
    pub target: ColumnType,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value can be stored in a column of `column_type` as-is
    pub fn fits(&self, column_type: ColumnType) -> bool {
        match (self, column_type) {
            (Value::Null, _) => true,
            (Value::Int32(_), ColumnType::Int32) => true,
            (Value::Bool(_), ColumnType::Bool) => true,
            (Value::Varchar(s), ColumnType::Varchar(max_len)) => {
                s.chars().count() <= max_len as usize
            }
            _ => false,
        }
    }

    /// Convert this value for a column whose type changed to `target`.
    ///
    /// Follows the usual SQL cast rules: text parses into numbers and
    /// booleans, everything renders into text, integers and booleans map onto
    /// each other through 0/1.
    pub fn cast(&self, target: ColumnType) -> Result<Value, CastError> {
        let fail = || CastError {
            value: self.to_string(),
            target,
        };

        let cast = match (self, target) {
            (Value::Null, _) => Value::Null,
            (Value::Int32(n), ColumnType::Int32) => Value::Int32(*n),
            (Value::Int32(n), ColumnType::Bool) => Value::Bool(*n != 0),
            (Value::Bool(b), ColumnType::Bool) => Value::Bool(*b),
            (Value::Bool(b), ColumnType::Int32) => Value::Int32(i32::from(*b)),
            (Value::Varchar(s), ColumnType::Int32) => {
                Value::Int32(s.trim().parse::<i32>().map_err(|_| fail())?)
            }
            (Value::Varchar(s), ColumnType::Bool) => Value::Bool(parse_bool(s).ok_or_else(fail)?),
            (Value::Varchar(s), ColumnType::Varchar(_)) => Value::Varchar(s.clone()),
            (Value::Int32(n), ColumnType::Varchar(_)) => Value::Varchar(n.to_string()),
            (Value::Bool(b), ColumnType::Varchar(_)) => Value::Varchar(b.to_string()),
        };

        if cast.fits(target) { Ok(cast) } else { Err(fail()) }
    }
}

/// Parse the textual boolean forms accepted by SQL engines
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "on" | "1" => Some(true),
        "f" | "false" | "n" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int32(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Varchar(s) => write!(f, "'{}'", s),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level
    Trace,
    /// Debug level
    Debug,
    /// Info level
    #[default]
    Info,
    /// Warn level
    Warn,
    /// Error level
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}


#[cfg(test)]
mod value_tests {
    use super::*;

    #[test]
    fn test_cast_text_to_number() {
        let v = Value::Varchar(" 42 ".to_string());
        assert_eq!(v.cast(ColumnType::Int32).unwrap(), Value::Int32(42));

        let bad = Value::Varchar("abc".to_string());
        let err = bad.cast(ColumnType::Int32).unwrap_err();
        assert_eq!(err.target, ColumnType::Int32);
    }

    #[test]
    fn test_cast_text_to_bool() {
        assert_eq!(
            Value::Varchar("Yes".to_string()).cast(ColumnType::Bool).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            Value::Varchar("0".to_string()).cast(ColumnType::Bool).unwrap(),
            Value::Bool(false)
        );
        assert!(Value::Varchar("maybe".to_string()).cast(ColumnType::Bool).is_err());
    }

    #[test]
    fn test_cast_into_text_respects_length() {
        assert_eq!(
            Value::Int32(12345).cast(ColumnType::Varchar(5)).unwrap(),
            Value::Varchar("12345".to_string())
        );
        assert!(Value::Int32(123456).cast(ColumnType::Varchar(5)).is_err());
        assert_eq!(
            Value::Bool(true).cast(ColumnType::Varchar(10)).unwrap(),
            Value::Varchar("true".to_string())
        );
    }

    #[test]
    fn test_cast_number_bool() {
        assert_eq!(Value::Int32(0).cast(ColumnType::Bool).unwrap(), Value::Bool(false));
        assert_eq!(Value::Int32(-3).cast(ColumnType::Bool).unwrap(), Value::Bool(true));
        assert_eq!(Value::Bool(true).cast(ColumnType::Int32).unwrap(), Value::Int32(1));
    }

    #[test]
    fn test_cast_null_stays_null() {
        assert_eq!(Value::Null.cast(ColumnType::Int32).unwrap(), Value::Null);
        assert!(Value::Null.fits(ColumnType::Bool));
    }

    #[test]
    fn test_log_level_directive() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
        assert_eq!(LogLevel::Warn.as_directive(), "warn");
    }
}
