//! Model factory
//!
//! Builds a [`TableHandle`] from a catalog record: the logical column list
//! together with the physical column specifications the type registry
//! resolves for it. Handles are rebuilt for every operation and never cached.

use std::sync::Arc;

use thiserror::Error;

use crate::catalog::error::CatalogError;
use crate::catalog::{CatalogRecord, Column, SchemaCatalog};
use crate::registry::{RegistryResult, TypeRegistry, UnknownType};
use crate::table::{ColumnSpec, TableBuilder, TableSpec};

/// Model factory error types
#[derive(Debug, Error)]
pub enum ModelError {
    /// No catalog record for the table
    #[error("Table '{0}' does not exist.")]
    TableNotFound(String),
    /// A recorded column has a type the registry does not know
    #[error("Column '{column}' of table '{table}': {source}")]
    UnknownType {
        table: String,
        column: String,
        #[source]
        source: UnknownType,
    },
    /// The record cannot form a valid table
    #[error("Invalid record for table '{table}': {reason}")]
    InvalidRecord { table: String, reason: String },
    /// Catalog read failed
    #[error(transparent)]
    Catalog(CatalogError),
}

impl From<CatalogError> for ModelError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::TableNotFound(name) => ModelError::TableNotFound(name),
            other => ModelError::Catalog(other),
        }
    }
}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Structural projection of one catalog record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHandle {
    record: CatalogRecord,
    spec: TableSpec,
}

impl TableHandle {
    pub fn table_name(&self) -> &str {
        &self.record.table_name
    }

    /// Catalog record the handle was built from
    pub fn record(&self) -> &CatalogRecord {
        &self.record
    }

    /// Physical table definition
    pub fn spec(&self) -> &TableSpec {
        &self.spec
    }

    /// Logical columns in record order
    pub fn columns(&self) -> &[Column] {
        &self.record.columns
    }

    /// Logical column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.record.column(name)
    }

    /// Physical column by name
    pub fn column_spec(&self, name: &str) -> Option<&ColumnSpec> {
        self.spec.get_column(name)
    }

    /// Field names in record order
    pub fn fields(&self) -> Vec<String> {
        self.record.field_names()
    }
}

/// Builds table handles from the catalog
#[derive(Clone)]
pub struct ModelFactory {
    catalog: Arc<dyn SchemaCatalog>,
    registry: TypeRegistry,
}

impl ModelFactory {
    pub fn new(catalog: Arc<dyn SchemaCatalog>, registry: TypeRegistry) -> Self {
        Self { catalog, registry }
    }

    pub fn catalog(&self) -> &Arc<dyn SchemaCatalog> {
        &self.catalog
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Physical column for a logical one
    ///
    /// Every dynamic column is nullable: the catalog does not record
    /// nullability, and a column added to a populated table has no value in
    /// existing rows.
    pub fn physical_column(&self, column: &Column) -> RegistryResult<ColumnSpec> {
        let column_type = self.registry.resolve(&column.type_name)?;
        Ok(ColumnSpec::nullable(column.name.clone(), column_type))
    }

    /// Load the record for `table_name` and project it into a handle
    pub fn build(&self, table_name: &str) -> ModelResult<TableHandle> {
        let record = self.catalog.load(table_name)?;
        self.project(record)
    }

    /// Project an already loaded record
    pub fn project(&self, record: CatalogRecord) -> ModelResult<TableHandle> {
        let mut builder = TableBuilder::new(record.table_name.clone());
        for column in &record.columns {
            let spec = self
                .physical_column(column)
                .map_err(|source| ModelError::UnknownType {
                    table: record.table_name.clone(),
                    column: column.name.clone(),
                    source,
                })?;
            builder = builder.column(spec);
        }

        let spec = builder
            .try_build()
            .map_err(|reason| ModelError::InvalidRecord {
                table: record.table_name.clone(),
                reason,
            })?;

        Ok(TableHandle { record, spec })
    }

    /// Ordered field names of a handle, used as the row schema
    pub fn fields(&self, handle: &TableHandle) -> Vec<String> {
        handle.fields()
    }
}
