use super::*;
use crate::table::TableBuilder;
use crate::types::ColumnType;

fn store_with_t1() -> MemoryStore {
    let store = MemoryStore::new();
    let spec = TableBuilder::new("t1".to_string())
        .column(ColumnSpec::nullable("age", ColumnType::Int32))
        .column(ColumnSpec::nullable("name", ColumnType::Varchar(255)))
        .try_build()
        .unwrap();
    store.create_table(&spec).unwrap();
    store
}

fn named(values: &[(&str, Value)]) -> Vec<(String, Value)> {
    values
        .iter()
        .map(|(n, v)| (n.to_string(), v.clone()))
        .collect()
}

#[test]
fn test_create_table_twice_fails() {
    let store = store_with_t1();
    let spec = TableSpec::new("t1".to_string());

    let result = store.create_table(&spec);
    assert!(matches!(result, Err(StorageError::TableExists(_))));
    assert_eq!(store.describe_table("t1").unwrap().column_count(), 2);
    assert_eq!(store.executed_ddl().len(), 1);
}

#[test]
fn test_create_table_rejects_reserved_column() {
    let store = MemoryStore::new();
    let spec = TableSpec::with_columns(
        "t2".to_string(),
        vec![ColumnSpec::nullable(ROW_ID_COLUMN, ColumnType::Int32)],
    );
    assert!(matches!(
        store.create_table(&spec),
        Err(StorageError::ColumnExists { .. })
    ));
    assert!(store.table_names().is_empty());
}

#[test]
fn test_add_column_backfills_null() {
    let store = store_with_t1();
    store
        .insert_row("t1", &named(&[("age", Value::Int32(30))]))
        .unwrap();

    store
        .add_column("t1", &ColumnSpec::nullable("active", ColumnType::Bool))
        .unwrap();

    let rows = store.scan_rows("t1").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("active"), Some(&Value::Null));
    assert_eq!(rows[0].get("age"), Some(&Value::Int32(30)));
    assert_eq!(
        store.describe_table("t1").unwrap().get_column("active").unwrap().ordinal(),
        2
    );
}

#[test]
fn test_add_column_duplicate_and_not_null() {
    let store = store_with_t1();
    assert!(matches!(
        store.add_column("t1", &ColumnSpec::nullable("age", ColumnType::Bool)),
        Err(StorageError::ColumnExists { .. })
    ));

    store.insert_row("t1", &[]).unwrap();
    let strict = ColumnSpec::new("strict".to_string(), ColumnType::Int32, false, 0);
    assert!(matches!(
        store.add_column("t1", &strict),
        Err(StorageError::NotNull { .. })
    ));
    assert!(matches!(
        store.add_column("nope", &strict),
        Err(StorageError::TableNotFound(_))
    ));
}

#[test]
fn test_alter_column_converts_values() {
    let store = store_with_t1();
    store
        .insert_row("t1", &named(&[("name", Value::Varchar("42".to_string()))]))
        .unwrap();

    let old = ColumnSpec::nullable("name", ColumnType::Varchar(255));
    let new = ColumnSpec::nullable("score", ColumnType::Int32);
    store.alter_column("t1", &old, &new).unwrap();

    let spec = store.describe_table("t1").unwrap();
    assert_eq!(spec.column_names(), vec!["age", "score"]);
    assert_eq!(spec.get_column("score").unwrap().column_type(), ColumnType::Int32);

    let rows = store.scan_rows("t1").unwrap();
    assert_eq!(rows[0].get("score"), Some(&Value::Int32(42)));
}

#[test]
fn test_alter_column_conversion_failure_changes_nothing() {
    let store = store_with_t1();
    store
        .insert_row("t1", &named(&[("name", Value::Varchar("7".to_string()))]))
        .unwrap();
    store
        .insert_row("t1", &named(&[("name", Value::Varchar("abc".to_string()))]))
        .unwrap();
    let ddl_before = store.executed_ddl().len();

    let old = ColumnSpec::nullable("name", ColumnType::Varchar(255));
    let new = ColumnSpec::nullable("name", ColumnType::Int32);
    let err = store.alter_column("t1", &old, &new).unwrap_err();
    assert!(err.is_conversion());

    let rows = store.scan_rows("t1").unwrap();
    assert_eq!(rows[0].get("name"), Some(&Value::Varchar("7".to_string())));
    assert_eq!(
        store.describe_table("t1").unwrap().get_column("name").unwrap().column_type(),
        ColumnType::Varchar(255)
    );
    assert_eq!(store.executed_ddl().len(), ddl_before);
}

#[test]
fn test_alter_column_name_conflict() {
    let store = store_with_t1();
    let old = ColumnSpec::nullable("name", ColumnType::Varchar(255));
    let new = ColumnSpec::nullable("age", ColumnType::Varchar(255));
    assert!(matches!(
        store.alter_column("t1", &old, &new),
        Err(StorageError::ColumnExists { .. })
    ));

    let ghost = ColumnSpec::nullable("ghost", ColumnType::Int32);
    assert!(matches!(
        store.alter_column("t1", &ghost, &new),
        Err(StorageError::ColumnNotFound { .. })
    ));
}

#[test]
fn test_drop_column_renumbers() {
    let store = store_with_t1();
    store
        .insert_row(
            "t1",
            &named(&[
                ("age", Value::Int32(1)),
                ("name", Value::Varchar("a".to_string())),
            ]),
        )
        .unwrap();

    store
        .drop_column("t1", &ColumnSpec::nullable("age", ColumnType::Int32))
        .unwrap();

    let spec = store.describe_table("t1").unwrap();
    assert_eq!(spec.column_names(), vec!["name"]);
    assert_eq!(spec.get_column("name").unwrap().ordinal(), 0);
    let rows = store.scan_rows("t1").unwrap();
    assert_eq!(rows[0].values, named(&[("name", Value::Varchar("a".to_string()))]));

    assert!(matches!(
        store.drop_column("t1", &ColumnSpec::nullable("age", ColumnType::Int32)),
        Err(StorageError::ColumnNotFound { .. })
    ));
}

#[test]
fn test_insert_row_checks_values() {
    let store = store_with_t1();
    assert!(matches!(
        store.insert_row("t1", &named(&[("age", Value::Bool(true))])),
        Err(StorageError::InvalidValue { .. })
    ));
    assert!(matches!(
        store.insert_row("t1", &named(&[("nope", Value::Int32(1))])),
        Err(StorageError::ColumnNotFound { .. })
    ));

    let first = store.insert_row("t1", &[]).unwrap();
    let second = store.insert_row("t1", &[]).unwrap();
    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert_eq!(store.scan_rows("t1").unwrap().len(), 2);
}

#[test]
fn test_ddl_log_renders_sql() {
    let store = store_with_t1();
    store
        .add_column("t1", &ColumnSpec::nullable("active", ColumnType::Bool))
        .unwrap();

    let ddl = store.executed_ddl();
    assert_eq!(ddl.len(), 2);
    assert!(ddl[0].starts_with("CREATE TABLE \"t1\""));
    assert_eq!(ddl[1], "ALTER TABLE \"t1\" ADD COLUMN \"active\" boolean NULL");
}

#[test]
fn test_snapshots_survive_reopen() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    {
        let store = MemoryStore::open(temp_dir.path()).unwrap();
        let spec = TableBuilder::new("t1".to_string())
            .column(ColumnSpec::nullable("age", ColumnType::Int32))
            .try_build()
            .unwrap();
        store.create_table(&spec).unwrap();
        store
            .insert_row("t1", &named(&[("age", Value::Int32(7))]))
            .unwrap();
        store
            .add_column("t1", &ColumnSpec::nullable("active", ColumnType::Bool))
            .unwrap();
    }

    let store = MemoryStore::open(temp_dir.path()).unwrap();
    assert_eq!(store.table_names(), vec!["t1"]);
    assert_eq!(
        store.describe_table("t1").unwrap().column_names(),
        vec!["age", "active"]
    );
    let rows = store.scan_rows("t1").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("age"), Some(&Value::Int32(7)));

    let row = store.insert_row("t1", &[]).unwrap();
    assert_eq!(row.id, 2);

    let leftovers = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().to_string_lossy().ends_with(".tmp"))
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn test_failed_alter_leaves_snapshot_untouched() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let store = MemoryStore::open(temp_dir.path()).unwrap();
    let spec = TableBuilder::new("t1".to_string())
        .column(ColumnSpec::nullable("code", ColumnType::Varchar(255)))
        .try_build()
        .unwrap();
    store.create_table(&spec).unwrap();
    store
        .insert_row("t1", &named(&[("code", Value::Varchar("abc".to_string()))]))
        .unwrap();

    let old = store.describe_table("t1").unwrap().get_column("code").unwrap().clone();
    let new = ColumnSpec::nullable("code", ColumnType::Int32);
    assert!(store.alter_column("t1", &old, &new).unwrap_err().is_conversion());

    let reopened = MemoryStore::open(temp_dir.path()).unwrap();
    assert_eq!(
        reopened.describe_table("t1").unwrap().get_column("code").unwrap().column_type(),
        ColumnType::Varchar(255)
    );
}

#[test]
fn test_tampered_snapshot_is_rejected() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    {
        let store = MemoryStore::open(temp_dir.path()).unwrap();
        let spec = TableBuilder::new("t1".to_string())
            .column(ColumnSpec::nullable("age", ColumnType::Int32))
            .try_build()
            .unwrap();
        store.create_table(&spec).unwrap();
    }

    let path = temp_dir.path().join("t1.heap");
    let content = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, content.replace("\"age\"", "\"agf\"")).unwrap();

    let err = MemoryStore::open(temp_dir.path()).unwrap_err();
    assert!(err.is_unavailable());
}
