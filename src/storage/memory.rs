//! In-memory relational store
//!
//! Tables live in memory. When opened over a directory, each table is also
//! kept as a snapshot file `<dir>/<table>.heap` that is rewritten after every
//! change, so physical tables survive a restart alongside the file catalog.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::storage::dialect::{PostgresDialect, ROW_ID_COLUMN};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::{Row, SchemaStore};
use crate::table::{ColumnSpec, TableSpec};
use crate::types::{RowId, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRow {
    id: RowId,
    /// Aligned with the table's column list
    values: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PhysicalTable {
    spec: TableSpec,
    rows: Vec<StoredRow>,
    next_row_id: RowId,
}

impl PhysicalTable {
    fn new(spec: TableSpec) -> Self {
        Self {
            spec,
            rows: Vec::new(),
            next_row_id: 1,
        }
    }

    fn renumber(&mut self) {
        let columns = std::mem::take(&mut self.spec.columns);
        self.spec.columns = columns
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.with_ordinal(i as u32))
            .collect();
    }

    fn to_row(&self, stored: &StoredRow) -> Row {
        Row {
            id: stored.id,
            values: self
                .spec
                .columns()
                .iter()
                .zip(&stored.values)
                .map(|(col, value)| (col.name().to_string(), value.clone()))
                .collect(),
        }
    }
}

/// On-disk envelope of a table snapshot
#[derive(Debug, Serialize, Deserialize)]
struct TableFile {
    checksum: u32,
    table: PhysicalTable,
}

fn table_checksum(table: &PhysicalTable) -> StorageResult<u32> {
    let bytes = serde_json::to_vec(table).map_err(|e| StorageError::Unavailable(e.to_string()))?;
    Ok(crc32fast::hash(&bytes))
}

fn io_fault(path: &Path, err: impl std::fmt::Display) -> StorageError {
    StorageError::Unavailable(format!("{}: {}", path.display(), err))
}

/// Relational store kept in memory
///
/// Enforces the physical schema the way a database would: unique column
/// names, nullability, and value conversion when a column changes type. A DDL
/// step either applies completely or leaves the table untouched. Every
/// applied DDL step is rendered as SQL and kept in an execution log.
#[derive(Debug, Default)]
pub struct MemoryStore {
    dialect: PostgresDialect,
    tables: RwLock<HashMap<String, PhysicalTable>>,
    ddl_log: Mutex<Vec<String>>,
    snapshot_dir: Option<PathBuf>,
}

impl MemoryStore {
    const SNAPSHOT_EXT: &'static str = "heap";
    const TEMP_EXT: &'static str = "heap.tmp";

    /// Store that forgets everything on drop
    pub fn new() -> Self {
        Self::default()
    }

    /// Store backed by snapshot files under `dir`, loading any already there
    pub fn open(dir: impl AsRef<Path>) -> StorageResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| io_fault(&dir, e))?;

        let mut tables = HashMap::new();
        for entry in fs::read_dir(&dir).map_err(|e| io_fault(&dir, e))? {
            let path = entry.map_err(|e| io_fault(&dir, e))?.path();
            if !path.extension().is_some_and(|ext| ext == Self::SNAPSHOT_EXT) {
                continue;
            }

            let bytes = fs::read(&path).map_err(|e| io_fault(&path, e))?;
            let file: TableFile = serde_json::from_slice(&bytes).map_err(|e| io_fault(&path, e))?;
            if table_checksum(&file.table)? != file.checksum {
                return Err(io_fault(&path, "checksum mismatch"));
            }
            tables.insert(file.table.spec.table_name().to_string(), file.table);
        }
        debug!(path = ?dir, tables = tables.len(), "opened table snapshots");

        Ok(Self {
            tables: RwLock::new(tables),
            snapshot_dir: Some(dir),
            ..Self::default()
        })
    }

    /// SQL text of every DDL statement applied so far
    pub fn executed_ddl(&self) -> Vec<String> {
        self.ddl_log.lock().clone()
    }

    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn record_ddl(&self, statements: impl IntoIterator<Item = String>) {
        let mut log = self.ddl_log.lock();
        for sql in statements {
            debug!(%sql, "applied DDL");
            log.push(sql);
        }
    }

    fn check_column_name(table: &str, spec: &TableSpec, name: &str) -> StorageResult<()> {
        if name == ROW_ID_COLUMN || spec.get_column(name).is_some() {
            return Err(StorageError::column_exists(table, name));
        }
        Ok(())
    }

    /// Write the snapshot of `table`; a no-op without a snapshot directory
    fn persist(&self, table: &PhysicalTable) -> StorageResult<()> {
        let Some(dir) = &self.snapshot_dir else {
            return Ok(());
        };
        let name = table.spec.table_name();
        let path = dir.join(format!("{}.{}", name, Self::SNAPSHOT_EXT));
        let tmp_path = dir.join(format!("{}.{}", name, Self::TEMP_EXT));

        let file = TableFile {
            checksum: table_checksum(table)?,
            table: table.clone(),
        };
        let bytes = serde_json::to_vec(&file).map_err(|e| io_fault(&path, e))?;

        let mut out = File::create(&tmp_path).map_err(|e| io_fault(&tmp_path, e))?;
        out.write_all(&bytes).map_err(|e| io_fault(&tmp_path, e))?;
        out.sync_all().map_err(|e| io_fault(&tmp_path, e))?;
        fs::rename(&tmp_path, &path).map_err(|e| io_fault(&path, e))?;
        Ok(())
    }

    /// Apply `change` to a copy of `table`, persist it, then install it
    fn modify<F>(&self, table: &str, change: F) -> StorageResult<()>
    where
        F: FnOnce(&mut PhysicalTable) -> StorageResult<Vec<String>>,
    {
        let mut tables = self.tables.write();
        let physical = tables
            .get_mut(table)
            .ok_or_else(|| StorageError::TableNotFound(table.to_string()))?;

        let mut next = physical.clone();
        let statements = change(&mut next)?;
        self.persist(&next)?;
        *physical = next;

        self.record_ddl(statements);
        Ok(())
    }
}

impl SchemaStore for MemoryStore {
    fn create_table(&self, spec: &TableSpec) -> StorageResult<()> {
        let mut tables = self.tables.write();
        if tables.contains_key(spec.table_name()) {
            return Err(StorageError::TableExists(spec.table_name().to_string()));
        }

        let mut checked = TableSpec::new(spec.table_name().to_string());
        for col in spec.columns() {
            Self::check_column_name(spec.table_name(), &checked, col.name())?;
            checked.columns.push(col.clone());
        }

        let mut table = PhysicalTable::new(checked);
        table.renumber();
        self.persist(&table)?;
        tables.insert(spec.table_name().to_string(), table);

        self.record_ddl([self.dialect.create_table(spec)]);
        Ok(())
    }

    fn add_column(&self, table: &str, column: &ColumnSpec) -> StorageResult<()> {
        self.modify(table, |physical| {
            Self::check_column_name(table, &physical.spec, column.name())?;
            if !column.is_nullable() && !physical.rows.is_empty() {
                return Err(StorageError::NotNull {
                    table: table.to_string(),
                    column: column.name().to_string(),
                });
            }

            let ordinal = physical.spec.column_count() as u32;
            physical.spec.columns.push(column.clone().with_ordinal(ordinal));
            for row in &mut physical.rows {
                row.values.push(Value::Null);
            }
            Ok(vec![self.dialect.add_column(table, column)])
        })
    }

    fn alter_column(&self, table: &str, old: &ColumnSpec, new: &ColumnSpec) -> StorageResult<()> {
        self.modify(table, |physical| {
            let idx = physical
                .spec
                .position(old.name())
                .ok_or_else(|| StorageError::column_missing(table, old.name()))?;
            if new.name() != old.name() {
                Self::check_column_name(table, &physical.spec, new.name())?;
            }

            let current = physical.spec.columns[idx].clone();
            for row in &mut physical.rows {
                let value = &row.values[idx];
                let cast = if current.column_type() == new.column_type() {
                    value.clone()
                } else {
                    value
                        .cast(new.column_type())
                        .map_err(|source| StorageError::Conversion {
                            table: table.to_string(),
                            column: old.name().to_string(),
                            source,
                        })?
                };
                if cast.is_null() && !new.is_nullable() {
                    return Err(StorageError::NotNull {
                        table: table.to_string(),
                        column: new.name().to_string(),
                    });
                }
                row.values[idx] = cast;
            }

            physical.spec.columns[idx] = new.clone().with_ordinal(idx as u32);
            Ok(self.dialect.alter_column(table, &current, new))
        })
    }

    fn drop_column(&self, table: &str, column: &ColumnSpec) -> StorageResult<()> {
        self.modify(table, |physical| {
            let idx = physical
                .spec
                .position(column.name())
                .ok_or_else(|| StorageError::column_missing(table, column.name()))?;

            physical.spec.columns.remove(idx);
            physical.renumber();
            for row in &mut physical.rows {
                row.values.remove(idx);
            }
            Ok(vec![self.dialect.drop_column(table, column)])
        })
    }

    fn describe_table(&self, table: &str) -> StorageResult<TableSpec> {
        self.tables
            .read()
            .get(table)
            .map(|physical| physical.spec.clone())
            .ok_or_else(|| StorageError::TableNotFound(table.to_string()))
    }

    fn insert_row(&self, table: &str, values: &[(String, Value)]) -> StorageResult<Row> {
        let mut tables = self.tables.write();
        let physical = tables
            .get_mut(table)
            .ok_or_else(|| StorageError::TableNotFound(table.to_string()))?;

        let mut row_values = vec![Value::Null; physical.spec.column_count()];
        for (name, value) in values {
            let idx = physical
                .spec
                .position(name)
                .ok_or_else(|| StorageError::column_missing(table, name))?;
            let col = &physical.spec.columns[idx];
            if !value.fits(col.column_type()) {
                return Err(StorageError::InvalidValue {
                    column: name.clone(),
                    value: value.to_string(),
                    column_type: col.column_type(),
                });
            }
            row_values[idx] = value.clone();
        }

        for (col, value) in physical.spec.columns().iter().zip(&row_values) {
            if value.is_null() && !col.is_nullable() {
                return Err(StorageError::NotNull {
                    table: table.to_string(),
                    column: col.name().to_string(),
                });
            }
        }

        let stored = StoredRow {
            id: physical.next_row_id,
            values: row_values,
        };
        let row = physical.to_row(&stored);
        physical.rows.push(stored);
        physical.next_row_id += 1;

        if let Err(err) = self.persist(physical) {
            physical.rows.pop();
            physical.next_row_id -= 1;
            return Err(err);
        }
        Ok(row)
    }

    fn scan_rows(&self, table: &str) -> StorageResult<Vec<Row>> {
        let tables = self.tables.read();
        let physical = tables
            .get(table)
            .ok_or_else(|| StorageError::TableNotFound(table.to_string()))?;
        Ok(physical.rows.iter().map(|r| physical.to_row(r)).collect())
    }
}
