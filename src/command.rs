//! Command values accepted by the engine
//!
//! Commands decode from JSON. Field names follow the catalog layout, and the
//! short wire names (`tblname`, `colname`, `coltype`, `oldcolname`) are
//! accepted as aliases.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::catalog::Column;

/// Rejected command: malformed JSON or a missing required field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid command: {0}")]
pub struct InvalidCommand(pub String);

pub type CommandResult<T> = Result<T, InvalidCommand>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTable {
    #[serde(alias = "tblname")]
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl CreateTable {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }
}

/// Kind of column change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Alter,
    Remove,
}

/// Single-column mutation as it arrives on the wire
///
/// `old_name` is required for `alter`, `type` for `add` and `alter`. Use
/// [`MutateColumn::into_change`] to check both and get a [`ColumnChange`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutateColumn {
    #[serde(alias = "tblname")]
    pub table: String,
    pub change: ChangeKind,
    #[serde(alias = "colname")]
    pub name: String,
    #[serde(default, alias = "oldcolname", skip_serializing_if = "Option::is_none")]
    pub old_name: Option<String>,
    #[serde(
        default,
        rename = "type",
        alias = "coltype",
        skip_serializing_if = "Option::is_none"
    )]
    pub type_name: Option<String>,
}

/// Validated column change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnChange {
    Add(Column),
    Alter { old_name: String, column: Column },
    Remove(String),
}

impl MutateColumn {
    pub fn add(table: &str, name: &str, type_name: &str) -> Self {
        Self {
            table: table.to_string(),
            change: ChangeKind::Add,
            name: name.to_string(),
            old_name: None,
            type_name: Some(type_name.to_string()),
        }
    }

    pub fn alter(table: &str, old_name: &str, name: &str, type_name: &str) -> Self {
        Self {
            table: table.to_string(),
            change: ChangeKind::Alter,
            name: name.to_string(),
            old_name: Some(old_name.to_string()),
            type_name: Some(type_name.to_string()),
        }
    }

    pub fn remove(table: &str, name: &str) -> Self {
        Self {
            table: table.to_string(),
            change: ChangeKind::Remove,
            name: name.to_string(),
            old_name: None,
            type_name: None,
        }
    }

    /// Check the per-change required fields
    ///
    /// Returns the target table together with the change.
    pub fn into_change(self) -> CommandResult<(String, ColumnChange)> {
        if self.table.is_empty() {
            return Err(InvalidCommand("'table' must not be empty".to_string()));
        }
        if self.name.is_empty() {
            return Err(InvalidCommand("'name' must not be empty".to_string()));
        }

        let change = match self.change {
            ChangeKind::Add => {
                let type_name = required(self.type_name, "type", "add")?;
                ColumnChange::Add(Column::new(self.name, type_name))
            }
            ChangeKind::Alter => {
                let old_name = required(self.old_name, "old_name", "alter")?;
                let type_name = required(self.type_name, "type", "alter")?;
                ColumnChange::Alter {
                    old_name,
                    column: Column::new(self.name, type_name),
                }
            }
            ChangeKind::Remove => ColumnChange::Remove(self.name),
        };

        Ok((self.table, change))
    }
}

fn required(field: Option<String>, name: &str, change: &str) -> CommandResult<String> {
    match field {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(InvalidCommand(format!(
            "'{name}' is required for change '{change}'"
        ))),
    }
}

/// Tagged request envelope, one per script line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    CreateTable(CreateTable),
    MutateColumn(MutateColumn),
    InsertRow {
        #[serde(alias = "tblname")]
        table: String,
        #[serde(default)]
        row: JsonValue,
    },
    ListRows {
        #[serde(alias = "tblname")]
        table: String,
    },
}

impl Request {
    pub fn from_json(line: &str) -> CommandResult<Self> {
        serde_json::from_str(line).map_err(|e| InvalidCommand(e.to_string()))
    }

    /// Table the request targets
    pub fn table(&self) -> &str {
        match self {
            Request::CreateTable(cmd) => &cmd.name,
            Request::MutateColumn(cmd) => &cmd.table,
            Request::InsertRow { table, .. } | Request::ListRows { table } => table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_wire_aliases() {
        let cmd: MutateColumn = serde_json::from_str(
            r#"{"tblname":"t1","change":"alter","colname":"years","oldcolname":"age","coltype":"string"}"#,
        )
        .unwrap();
        assert_eq!(cmd, MutateColumn::alter("t1", "age", "years", "string"));

        let create: CreateTable = serde_json::from_str(
            r#"{"tblname":"t1","columns":[{"colname":"age","coltype":"number"}]}"#,
        )
        .unwrap();
        assert_eq!(create, CreateTable::new("t1", vec![Column::new("age", "number")]));
    }

    #[test]
    fn test_into_change() {
        let (table, change) = MutateColumn::add("t1", "active", "boolean")
            .into_change()
            .unwrap();
        assert_eq!(table, "t1");
        assert_eq!(change, ColumnChange::Add(Column::new("active", "boolean")));

        let (_, change) = MutateColumn::remove("t1", "active").into_change().unwrap();
        assert_eq!(change, ColumnChange::Remove("active".to_string()));
    }

    #[test]
    fn test_missing_required_fields() {
        let mut alter = MutateColumn::alter("t1", "age", "years", "string");
        alter.old_name = None;
        let err = alter.into_change().unwrap_err();
        assert_eq!(err.0, "'old_name' is required for change 'alter'");

        let mut add = MutateColumn::add("t1", "age", "number");
        add.type_name = Some(String::new());
        assert!(add.into_change().is_err());

        let empty = MutateColumn::remove("", "age");
        assert!(empty.into_change().is_err());
    }

    #[test]
    fn test_request_envelope() {
        let req = Request::from_json(
            r#"{"op":"create_table","name":"t1","columns":[{"name":"age","type":"number"}]}"#,
        )
        .unwrap();
        assert_eq!(req.table(), "t1");
        assert!(matches!(req, Request::CreateTable(_)));

        let req = Request::from_json(r#"{"op":"insert_row","table":"t1","row":{"age":3}}"#).unwrap();
        assert!(matches!(req, Request::InsertRow { ref row, .. } if row["age"] == 3));

        let req = Request::from_json(r#"{"op":"list_rows","tblname":"t1"}"#).unwrap();
        assert_eq!(req, Request::ListRows { table: "t1".to_string() });

        assert!(Request::from_json(r#"{"op":"drop_table","name":"t1"}"#).is_err());
        assert!(Request::from_json("not json").is_err());
    }
}
