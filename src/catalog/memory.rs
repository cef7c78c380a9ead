//! In-memory catalog

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::catalog::error::{CatalogError, CatalogResult};
use crate::catalog::{CatalogRecord, Column, SchemaCatalog, validate_new_record};

/// Catalog held in a map, lost on drop
///
/// Same semantics as the file catalog; used in memory mode and tests.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    records: RwLock<HashMap<String, CatalogRecord>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn update<F>(&self, table_name: &str, mutate: F) -> CatalogResult<()>
    where
        F: FnOnce(&mut CatalogRecord) -> CatalogResult<()>,
    {
        let mut records = self.records.write();
        let record = records
            .get_mut(table_name)
            .ok_or_else(|| CatalogError::TableNotFound(table_name.to_string()))?;

        // Mutate a copy so a failed change leaves the stored record intact
        let mut updated = record.clone();
        mutate(&mut updated)?;
        *record = updated;
        Ok(())
    }
}

impl SchemaCatalog for MemoryCatalog {
    fn load(&self, table_name: &str) -> CatalogResult<CatalogRecord> {
        self.records
            .read()
            .get(table_name)
            .cloned()
            .ok_or_else(|| CatalogError::TableNotFound(table_name.to_string()))
    }

    fn create(&self, table_name: &str, columns: Vec<Column>) -> CatalogResult<()> {
        validate_new_record(table_name, &columns)?;

        let mut records = self.records.write();
        if records.contains_key(table_name) {
            return Err(CatalogError::TableAlreadyExists(table_name.to_string()));
        }
        records.insert(
            table_name.to_string(),
            CatalogRecord::new(table_name, columns),
        );
        Ok(())
    }

    fn append_column(&self, table_name: &str, column: Column) -> CatalogResult<()> {
        self.update(table_name, |record| record.append_column(column))
    }

    fn remove_column(&self, table_name: &str, column_name: &str) -> CatalogResult<()> {
        self.update(table_name, |record| record.remove_column(column_name).map(|_| ()))
    }

    fn replace_column(
        &self,
        table_name: &str,
        old_name: &str,
        new_column: Column,
    ) -> CatalogResult<()> {
        self.update(table_name, |record| {
            record.replace_column(old_name, new_column).map(|_| ())
        })
    }

    fn exists(&self, table_name: &str) -> CatalogResult<bool> {
        Ok(self.records.read().contains_key(table_name))
    }

    fn list_tables(&self) -> CatalogResult<Vec<String>> {
        let mut names: Vec<String> = self.records.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
