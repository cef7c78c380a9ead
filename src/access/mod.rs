//! Record access facade
//!
//! Inserts and lists rows of a dynamic table. Each call takes the table's
//! lock shared with the mutation engine, so the handle it rebuilds from the
//! catalog matches the physical table until the store call returns.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::engine::TableLocks;
use crate::model::{ModelFactory, TableHandle};
use crate::rows::{JsonRow, RowSerializer};
use crate::storage::SchemaStore;

pub mod error;

pub use error::{AccessError, AccessResult};

#[derive(Clone)]
pub struct RecordAccess {
    factory: ModelFactory,
    store: Arc<dyn SchemaStore>,
    locks: Arc<TableLocks>,
}

impl RecordAccess {
    pub fn new(
        factory: ModelFactory,
        store: Arc<dyn SchemaStore>,
        locks: Arc<TableLocks>,
    ) -> Self {
        Self {
            factory,
            store,
            locks,
        }
    }

    fn handle(&self, table: &str) -> AccessResult<TableHandle> {
        self.factory
            .build(table)
            .map_err(|e| AccessError::from_model(table, e))
    }

    /// Validate and insert one row, returning it as stored
    pub fn insert(&self, table: &str, payload: &JsonValue) -> AccessResult<JsonRow> {
        let _guard = self.locks.lock(table);
        let handle = self.handle(table)?;
        let fields = self.factory.fields(&handle);
        let serializer = RowSerializer::new(&fields, handle.spec());

        let values = serializer.validate(payload)?;
        let row = self.store.insert_row(table, &values)?;
        debug!(table, row_id = row.id, "inserted row");

        Ok(serializer.to_json(&row))
    }

    /// All rows of the table in insertion order
    pub fn list(&self, table: &str) -> AccessResult<Vec<JsonRow>> {
        let _guard = self.locks.lock(table);
        let handle = self.handle(table)?;
        let fields = self.factory.fields(&handle);
        let serializer = RowSerializer::new(&fields, handle.spec());

        let rows = self.store.scan_rows(table)?;
        Ok(rows.iter().map(|row| serializer.to_json(row)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, MemoryCatalog, SchemaCatalog};
    use crate::registry::TypeRegistry;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn setup() -> (RecordAccess, Arc<MemoryCatalog>, Arc<MemoryStore>) {
        let catalog = Arc::new(MemoryCatalog::new());
        let store = Arc::new(MemoryStore::new());
        let factory = ModelFactory::new(catalog.clone(), TypeRegistry::builtin());

        let columns = vec![Column::new("age", "number"), Column::new("name", "string")];
        let handle = factory
            .project(crate::catalog::CatalogRecord::new("t1", columns.clone()))
            .unwrap();
        store.create_table(handle.spec()).unwrap();
        catalog.create("t1", columns).unwrap();

        let access = RecordAccess::new(factory, store.clone(), Arc::new(TableLocks::new()));
        (access, catalog, store)
    }

    #[test]
    fn test_insert_and_list() {
        let (access, _, _) = setup();

        let row = access.insert("t1", &json!({"age": 30, "name": "ann"})).unwrap();
        assert_eq!(JsonValue::Object(row), json!({"age": 30, "name": "ann"}));
        access.insert("t1", &json!({"name": "bob"})).unwrap();

        let rows = access.list("t1").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["age"], JsonValue::Null);
        assert_eq!(rows[1]["name"], json!("bob"));
    }

    #[test]
    fn test_insert_invalid_row() {
        let (access, _, store) = setup();
        let err = access.insert("t1", &json!({"age": "old"})).unwrap_err();
        assert_eq!(err.code(), "invalid_row");
        assert!(store.scan_rows("t1").unwrap().is_empty());
    }

    #[test]
    fn test_missing_table() {
        let (access, _, _) = setup();
        let err = access.list("ghost").unwrap_err();
        assert_eq!(err.code(), "table_load_error");
        assert!(access.insert("ghost", &json!({})).is_err());
    }

    #[test]
    fn test_insert_waits_for_table_lock() {
        let locks = Arc::new(TableLocks::new());
        let (access, _, store) = setup();
        let access = RecordAccess::new(access.factory.clone(), store.clone(), locks.clone());

        let guard = locks.lock("t1");
        let writer = {
            let access = access.clone();
            std::thread::spawn(move || access.insert("t1", &json!({"age": 1})))
        };
        std::thread::sleep(std::time::Duration::from_millis(100));
        assert!(!writer.is_finished());
        assert!(store.scan_rows("t1").unwrap().is_empty());

        drop(guard);
        writer.join().unwrap().unwrap();
        assert_eq!(store.scan_rows("t1").unwrap().len(), 1);
        assert_eq!(locks.slot_count(), 0);
    }

    #[test]
    fn test_list_follows_catalog_fields() {
        let (access, catalog, store) = setup();
        access.insert("t1", &json!({"age": 1, "name": "a"})).unwrap();

        store
            .add_column(
                "t1",
                &crate::table::ColumnSpec::nullable("active", crate::types::ColumnType::Bool),
            )
            .unwrap();
        catalog
            .append_column("t1", Column::new("active", "boolean"))
            .unwrap();

        let rows = access.list("t1").unwrap();
        let keys: Vec<&String> = rows[0].keys().collect();
        assert_eq!(keys, vec!["age", "name", "active"]);
        assert_eq!(rows[0]["active"], JsonValue::Null);
    }
}
