//! Schema mutation engine
//!
//! The only path that changes a dynamic table. Every operation runs inside
//! the table's critical section and follows the same order: rebuild the
//! handle from the catalog, validate, apply the physical DDL, then write the
//! catalog. A rejected DDL leaves the catalog untouched. A catalog write
//! that fails after the DDL went through is reported as
//! [`EngineError::CatalogSync`] and queued for reconciliation, as is any
//! catalog table found without its physical table.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::access::RecordAccess;
use crate::catalog::error::{CatalogError, CatalogResult};
use crate::catalog::{CatalogRecord, Column, SchemaCatalog};
use crate::command::{ColumnChange, CreateTable, MutateColumn, Request};
use crate::model::{ModelFactory, TableHandle};
use crate::registry::TypeRegistry;
use crate::rows::JsonRow;
use crate::storage::{SchemaStore, StorageError};
use crate::table::{is_valid_identifier, TableBuilder};

pub mod error;
pub mod lock;

pub use error::{EngineError, EngineResult, Operation};
pub use lock::{TableGuard, TableLocks};

/// Table left with a physical change its catalog record does not reflect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub table: String,
    pub operation: Operation,
    pub cause: String,
}

/// Result of an executed request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Table(CatalogRecord),
    Row(JsonRow),
    Rows(Vec<JsonRow>),
}

pub struct SchemaEngine {
    factory: ModelFactory,
    store: Arc<dyn SchemaStore>,
    locks: Arc<TableLocks>,
    reconciliation: Mutex<Vec<Reconciliation>>,
}

impl SchemaEngine {
    pub fn new(catalog: Arc<dyn SchemaCatalog>, store: Arc<dyn SchemaStore>) -> Self {
        Self::with_registry(catalog, store, TypeRegistry::builtin())
    }

    pub fn with_registry(
        catalog: Arc<dyn SchemaCatalog>,
        store: Arc<dyn SchemaStore>,
        registry: TypeRegistry,
    ) -> Self {
        Self {
            factory: ModelFactory::new(catalog, registry),
            store,
            locks: Arc::new(TableLocks::new()),
            reconciliation: Mutex::new(Vec::new()),
        }
    }

    pub fn factory(&self) -> &ModelFactory {
        &self.factory
    }

    /// Record access over the same catalog, store and table locks
    pub fn records(&self) -> RecordAccess {
        RecordAccess::new(self.factory.clone(), self.store.clone(), self.locks.clone())
    }

    /// Tables whose catalog record missed a physical change, oldest first
    pub fn pending_reconciliation(&self) -> Vec<Reconciliation> {
        self.reconciliation.lock().clone()
    }

    /// Check every catalog table against the store
    ///
    /// A table with a catalog record but no physical table, or whose physical
    /// columns differ from the record, is queued for reconciliation. Returns
    /// the entries added by this pass.
    pub fn verify_catalog(&self) -> EngineResult<Vec<Reconciliation>> {
        let tables = self
            .factory
            .catalog()
            .list_tables()
            .map_err(EngineError::Catalog)?;

        let mut found = Vec::new();
        for table in tables {
            let _guard = self.locks.lock(&table);
            let handle = self.handle(&table)?;
            let cause = match self.store.describe_table(&table) {
                Ok(physical) if physical.columns() == handle.spec().columns() => continue,
                Ok(physical) => format!(
                    "physical columns {:?} do not match catalog columns {:?}",
                    physical.column_names(),
                    handle.spec().column_names()
                ),
                Err(err @ StorageError::TableNotFound(_)) => err.to_string(),
                Err(err) => return Err(EngineError::Storage(err)),
            };
            found.push(self.reconcile(Operation::Verify, &table, cause));
        }

        debug!(mismatched = found.len(), "verified catalog against store");
        Ok(found)
    }

    /// Create a table and its catalog record
    pub fn create_table(&self, name: &str, columns: Vec<Column>) -> EngineResult<CatalogRecord> {
        let _guard = self.locks.lock(name);

        let mut builder = TableBuilder::new(name.to_string());
        for column in &columns {
            builder = builder.column(self.factory.physical_column(column)?);
        }
        let spec = builder
            .try_build()
            .map_err(|reason| EngineError::TableCreate {
                table: name.to_string(),
                reason,
            })?;

        if self
            .factory
            .catalog()
            .exists(name)
            .map_err(EngineError::Catalog)?
        {
            return Err(EngineError::DuplicateTable(name.to_string()));
        }

        self.store.create_table(&spec).map_err(|err| {
            self.rejected(Operation::CreateTable, name, err, |err| EngineError::TableCreate {
                table: name.to_string(),
                reason: err.to_string(),
            })
        })?;

        let record = CatalogRecord::new(name, columns);
        self.sync(Operation::CreateTable, name, |catalog| {
            catalog.create(name, record.columns.clone())
        })?;

        info!(table = name, columns = record.columns.len(), "created table");
        Ok(record)
    }

    /// Add a nullable column at the end of the table
    pub fn add_column(&self, table: &str, column: Column) -> EngineResult<CatalogRecord> {
        let _guard = self.locks.lock(table);
        let handle = self.handle(table)?;

        let spec = self.factory.physical_column(&column)?;
        let add_error = |reason: String| EngineError::ColumnAdd {
            table: table.to_string(),
            column: column.name.clone(),
            reason,
        };
        if !is_valid_identifier(&column.name) {
            return Err(add_error("invalid column name".to_string()));
        }

        let mut record = handle.record().clone();
        record
            .append_column(column.clone())
            .map_err(|_| add_error("Field already exists.".to_string()))?;

        self.store
            .add_column(table, &spec)
            .map_err(|err| {
                self.rejected(Operation::AddColumn, table, err, |err| add_error(err.to_string()))
            })?;

        self.sync(Operation::AddColumn, table, |catalog| {
            catalog.append_column(table, column.clone())
        })?;

        info!(table, column = %column.name, column_type = %column.type_name, "added column");
        Ok(record)
    }

    /// Rename and/or retype `old_name` in one step
    pub fn alter_column(
        &self,
        table: &str,
        old_name: &str,
        column: Column,
    ) -> EngineResult<CatalogRecord> {
        let _guard = self.locks.lock(table);
        let handle = self.handle(table)?;

        let old_spec = handle
            .column_spec(old_name)
            .cloned()
            .ok_or_else(|| EngineError::column_not_found(table, old_name))?;
        let new_spec = self
            .factory
            .physical_column(&column)?
            .with_ordinal(old_spec.ordinal());

        let conflict = |reason: String| EngineError::ColumnConflict {
            table: table.to_string(),
            column: column.name.clone(),
            reason,
        };
        if !is_valid_identifier(&column.name) {
            return Err(conflict("invalid column name".to_string()));
        }

        let mut record = handle.record().clone();
        record
            .replace_column(old_name, column.clone())
            .map_err(|err| match err {
                CatalogError::ColumnNotFound { .. } => EngineError::column_not_found(table, old_name),
                _ => conflict(format!("Column '{}' already exists.", column.name)),
            })?;

        self.store
            .alter_column(table, &old_spec, &new_spec)
            .map_err(|err| {
                self.rejected(Operation::AlterColumn, table, err, |err| {
                    if err.is_conversion() {
                        EngineError::TypeConversion {
                            table: table.to_string(),
                            column: old_name.to_string(),
                            type_name: column.type_name.clone(),
                            reason: err.to_string(),
                        }
                    } else {
                        conflict(err.to_string())
                    }
                })
            })?;

        self.sync(Operation::AlterColumn, table, |catalog| {
            catalog.replace_column(table, old_name, column.clone())
        })?;

        info!(
            table,
            old_name,
            column = %column.name,
            column_type = %column.type_name,
            "altered column"
        );
        Ok(record)
    }

    /// Drop a column and its data
    pub fn remove_column(&self, table: &str, column_name: &str) -> EngineResult<CatalogRecord> {
        let _guard = self.locks.lock(table);
        let handle = self.handle(table)?;

        let spec = handle
            .column_spec(column_name)
            .cloned()
            .ok_or_else(|| EngineError::column_not_found(table, column_name))?;

        let mut record = handle.record().clone();
        record
            .remove_column(column_name)
            .map_err(|_| EngineError::column_not_found(table, column_name))?;

        self.store.drop_column(table, &spec).map_err(|err| {
            self.rejected(Operation::RemoveColumn, table, err, |err| EngineError::ColumnRemove {
                table: table.to_string(),
                column: column_name.to_string(),
                reason: err.to_string(),
            })
        })?;

        self.sync(Operation::RemoveColumn, table, |catalog| {
            catalog.remove_column(table, column_name)
        })?;

        info!(table, column = column_name, "removed column");
        Ok(record)
    }

    /// Validate and dispatch one column mutation
    pub fn process(&self, command: MutateColumn) -> EngineResult<CatalogRecord> {
        let (table, change) = command.into_change()?;
        match change {
            ColumnChange::Add(column) => self.add_column(&table, column),
            ColumnChange::Alter { old_name, column } => {
                self.alter_column(&table, &old_name, column)
            }
            ColumnChange::Remove(name) => self.remove_column(&table, &name),
        }
    }

    /// Dispatch any request, including row access
    pub fn execute(&self, request: Request) -> EngineResult<Outcome> {
        debug!(?request, "executing request");
        match request {
            Request::CreateTable(CreateTable { name, columns }) => {
                self.create_table(&name, columns).map(Outcome::Table)
            }
            Request::MutateColumn(command) => self.process(command).map(Outcome::Table),
            Request::InsertRow { table, row } => {
                Ok(Outcome::Row(self.records().insert(&table, &row)?))
            }
            Request::ListRows { table } => Ok(Outcome::Rows(self.records().list(&table)?)),
        }
    }

    fn handle(&self, table: &str) -> EngineResult<TableHandle> {
        Ok(self.factory.build(table)?)
    }

    /// Write the catalog after a successful DDL
    fn sync<F>(&self, operation: Operation, table: &str, write: F) -> EngineResult<()>
    where
        F: FnOnce(&dyn SchemaCatalog) -> CatalogResult<()>,
    {
        match write(self.factory.catalog().as_ref()) {
            Ok(()) => {
                debug!(table, %operation, "catalog record written");
                Ok(())
            }
            Err(source) => {
                error!(
                    table,
                    %operation,
                    error = %source,
                    "physical change applied but catalog write failed"
                );
                self.reconcile(operation, table, source.to_string());
                Err(EngineError::CatalogSync {
                    table: table.to_string(),
                    operation,
                    source,
                })
            }
        }
    }

    /// Classify a DDL rejection
    ///
    /// An unavailable backend is a generic storage failure. A table the
    /// catalog knows but the store does not is a storage failure too, and
    /// the table is queued for reconciliation. Anything else is the
    /// operation's own error, built by `reject`.
    fn rejected<R>(
        &self,
        operation: Operation,
        table: &str,
        err: StorageError,
        reject: R,
    ) -> EngineError
    where
        R: FnOnce(StorageError) -> EngineError,
    {
        match err {
            StorageError::TableNotFound(_) => {
                error!(table, %operation, error = %err, "catalog table missing from store");
                self.reconcile(operation, table, err.to_string());
                EngineError::Storage(err)
            }
            err if err.is_unavailable() => {
                warn!(table, %operation, error = %err, "DDL rejected");
                EngineError::Storage(err)
            }
            err => {
                warn!(table, %operation, error = %err, "DDL rejected");
                reject(err)
            }
        }
    }

    fn reconcile(&self, operation: Operation, table: &str, cause: String) -> Reconciliation {
        let entry = Reconciliation {
            table: table.to_string(),
            operation,
            cause,
        };
        self.reconciliation.lock().push(entry.clone());
        entry
    }
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
