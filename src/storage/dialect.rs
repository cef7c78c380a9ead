//! PostgreSQL flavoured DDL rendering
//!
//! Renders each schema change as the statement a relational database would
//! execute. The memory store logs these; a database-backed store would send
//! them.

use crate::table::{ColumnSpec, TableSpec};
use crate::types::ColumnType;

/// Name of the implicit row identifier column every table carries
pub const ROW_ID_COLUMN: &str = "_row_id";

#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    pub fn new() -> Self {
        Self
    }

    /// Quote an identifier, doubling embedded quotes
    pub fn quote_ident(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    pub fn column_type_sql(&self, column_type: ColumnType) -> String {
        match column_type {
            ColumnType::Int32 => "integer".to_string(),
            ColumnType::Varchar(max_len) => format!("varchar({})", max_len),
            ColumnType::Bool => "boolean".to_string(),
        }
    }

    fn column_definition(&self, column: &ColumnSpec) -> String {
        format!(
            "{} {} {}",
            self.quote_ident(column.name()),
            self.column_type_sql(column.column_type()),
            if column.is_nullable() { "NULL" } else { "NOT NULL" }
        )
    }

    pub fn create_table(&self, spec: &TableSpec) -> String {
        let mut defs = vec![format!(
            "{} bigserial NOT NULL PRIMARY KEY",
            self.quote_ident(ROW_ID_COLUMN)
        )];
        defs.extend(spec.columns().iter().map(|c| self.column_definition(c)));

        format!(
            "CREATE TABLE {} ({})",
            self.quote_ident(spec.table_name()),
            defs.join(", ")
        )
    }

    pub fn add_column(&self, table: &str, column: &ColumnSpec) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.quote_ident(table),
            self.column_definition(column)
        )
    }

    /// Statements that turn `old` into `new`: rename, type change, nullability
    pub fn alter_column(&self, table: &str, old: &ColumnSpec, new: &ColumnSpec) -> Vec<String> {
        let table_ident = self.quote_ident(table);
        let new_ident = self.quote_ident(new.name());
        let mut statements = Vec::new();

        if old.name() != new.name() {
            statements.push(format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {}",
                table_ident,
                self.quote_ident(old.name()),
                new_ident
            ));
        }

        if old.column_type() != new.column_type() {
            let type_sql = self.column_type_sql(new.column_type());
            statements.push(format!(
                "ALTER TABLE {} ALTER COLUMN {} TYPE {} USING {}::{}",
                table_ident, new_ident, type_sql, new_ident, type_sql
            ));
        }

        if old.is_nullable() != new.is_nullable() {
            let action = if new.is_nullable() { "DROP" } else { "SET" };
            statements.push(format!(
                "ALTER TABLE {} ALTER COLUMN {} {} NOT NULL",
                table_ident, new_ident, action
            ));
        }

        statements
    }

    pub fn drop_column(&self, table: &str, column: &ColumnSpec) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {} CASCADE",
            self.quote_ident(table),
            self.quote_ident(column.name())
        )
    }
}
