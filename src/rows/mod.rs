//! Row validation and serialization
//!
//! [`RowSerializer`] turns a JSON object into store values for a fixed field
//! list, checking each field against its physical binding, and renders
//! stored rows back to JSON in field order.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Number, Value as JsonValue};
use thiserror::Error;

use crate::storage::Row;
use crate::table::TableSpec;
use crate::types::{parse_bool, ColumnType, Value};

/// JSON object keyed by field name
pub type JsonRow = Map<String, JsonValue>;

/// Per-field validation messages, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(pub BTreeMap<String, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// Row error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("Expected a JSON object, got {0}")]
    NotAnObject(String),
    #[error("Invalid row: {0}")]
    InvalidFields(FieldErrors),
}

pub type RowResult<T> = Result<T, RowError>;

/// Validator and serializer for one table's rows
#[derive(Debug, Clone, Copy)]
pub struct RowSerializer<'a> {
    fields: &'a [String],
    bindings: &'a TableSpec,
}

impl<'a> RowSerializer<'a> {
    pub fn new(fields: &'a [String], bindings: &'a TableSpec) -> Self {
        Self { fields, bindings }
    }

    /// Validate a payload and convert it into store values in field order
    ///
    /// Absent fields and explicit `null` become [`Value::Null`]. All field
    /// errors are collected before failing.
    pub fn validate(&self, payload: &JsonValue) -> RowResult<Vec<(String, Value)>> {
        let object = payload
            .as_object()
            .ok_or_else(|| RowError::NotAnObject(json_kind(payload).to_string()))?;

        let mut errors = FieldErrors::default();
        for key in object.keys() {
            if !self.fields.iter().any(|f| f == key) {
                errors.push(key, "Unknown field.");
            }
        }

        let mut values = Vec::with_capacity(self.fields.len());
        for field in self.fields {
            let Some(column) = self.bindings.get_column(field) else {
                errors.push(field, "Field has no physical column.");
                continue;
            };
            let raw = object.get(field).unwrap_or(&JsonValue::Null);
            match to_value(raw, column.column_type()) {
                Ok(value) => values.push((field.clone(), value)),
                Err(message) => errors.push(field, message),
            }
        }

        if errors.is_empty() {
            Ok(values)
        } else {
            Err(RowError::InvalidFields(errors))
        }
    }

    /// Render a stored row as a JSON object over the field list
    pub fn to_json(&self, row: &Row) -> JsonRow {
        self.fields
            .iter()
            .map(|field| {
                let value = row.get(field).map_or(JsonValue::Null, to_json_value);
                (field.clone(), value)
            })
            .collect()
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn to_value(raw: &JsonValue, column_type: ColumnType) -> Result<Value, String> {
    match (raw, column_type) {
        (JsonValue::Null, _) => Ok(Value::Null),

        (JsonValue::String(s), ColumnType::Varchar(max_len)) => varchar(s.clone(), max_len),
        (JsonValue::Number(n), ColumnType::Varchar(max_len)) => varchar(n.to_string(), max_len),
        (JsonValue::Bool(b), ColumnType::Varchar(max_len)) => varchar(b.to_string(), max_len),

        (JsonValue::Number(n), ColumnType::Int32) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Value::Int32)
            .ok_or_else(|| "A valid integer is required.".to_string()),
        (JsonValue::String(s), ColumnType::Int32) => s
            .trim()
            .parse::<i32>()
            .map(Value::Int32)
            .map_err(|_| "A valid integer is required.".to_string()),

        (JsonValue::Bool(b), ColumnType::Bool) => Ok(Value::Bool(*b)),
        (JsonValue::String(s), ColumnType::Bool) => parse_bool(s)
            .map(Value::Bool)
            .ok_or_else(|| "Must be a valid boolean.".to_string()),

        (other, _) => Err(format!(
            "Expected a value of type {}, got {}.",
            column_type,
            json_kind(other)
        )),
    }
}

fn varchar(s: String, max_len: u32) -> Result<Value, String> {
    if s.chars().count() > max_len as usize {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            max_len
        ));
    }
    Ok(Value::Varchar(s))
}

fn to_json_value(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Int32(n) => JsonValue::Number(Number::from(*n)),
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Varchar(s) => JsonValue::String(s.clone()),
    }
}
