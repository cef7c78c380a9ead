//! Schema catalog
//!
//! Durable store of one [`CatalogRecord`] per dynamic table, keyed by table
//! name. Every mutation is a single-record read-modify-write; nothing is
//! cached between calls, so each read reflects the last completed write.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::catalog::error::{CatalogError, CatalogResult};
use crate::table::is_valid_identifier;

pub mod error;
pub mod memory;
pub mod record;

pub use memory::MemoryCatalog;
pub use record::{CatalogRecord, Column};

/// Key-value store of table records
pub trait SchemaCatalog: Send + Sync {
    /// Fetch the record for `table_name`
    fn load(&self, table_name: &str) -> CatalogResult<CatalogRecord>;

    /// Store a new record; fails if one already exists under the name
    fn create(&self, table_name: &str, columns: Vec<Column>) -> CatalogResult<()>;

    /// Append a column to the end of the record
    fn append_column(&self, table_name: &str, column: Column) -> CatalogResult<()>;

    /// Remove a column; a missing column is an error
    fn remove_column(&self, table_name: &str, column_name: &str) -> CatalogResult<()>;

    /// Replace the column named `old_name`; a missing column is an error
    fn replace_column(&self, table_name: &str, old_name: &str, new_column: Column)
    -> CatalogResult<()>;

    /// Whether a record exists for `table_name`
    fn exists(&self, table_name: &str) -> CatalogResult<bool>;

    /// Names of all recorded tables, sorted
    fn list_tables(&self) -> CatalogResult<Vec<String>>;
}

/// Checks shared by every catalog before a record is created
pub(crate) fn validate_new_record(table_name: &str, columns: &[Column]) -> CatalogResult<()> {
    if !is_valid_identifier(table_name) {
        return Err(CatalogError::InvalidArgument(format!(
            "invalid table name '{}'",
            table_name
        )));
    }

    let mut col_names = HashSet::new();
    for col in columns {
        if !col_names.insert(col.name.as_str()) {
            return Err(CatalogError::column_exists(table_name, &col.name));
        }
    }
    Ok(())
}

/// On-disk envelope of a record
#[derive(Debug, Serialize, Deserialize)]
struct RecordFile {
    checksum: u32,
    record: CatalogRecord,
}

impl RecordFile {
    fn seal(record: CatalogRecord) -> CatalogResult<Self> {
        let checksum = record_checksum(&record)?;
        Ok(Self { checksum, record })
    }

    fn verify(self, path: &Path) -> CatalogResult<CatalogRecord> {
        if record_checksum(&self.record)? != self.checksum {
            return Err(CatalogError::Corrupted(format!(
                "checksum mismatch in {:?}",
                path
            )));
        }
        Ok(self.record)
    }
}

fn record_checksum(record: &CatalogRecord) -> CatalogResult<u32> {
    Ok(crc32fast::hash(&serde_json::to_vec(record)?))
}

/// File-backed catalog
///
/// Each record lives in `<data_dir>/system/<table>.tbl` as JSON with a CRC32
/// of the record. Writes go to a temporary file that is renamed over the old
/// one, so a reader never sees a half-written record.
pub struct FileCatalog {
    data_dir: PathBuf,
    system_dir: PathBuf,
    write_lock: RwLock<()>,
}

impl FileCatalog {
    const SYSTEM_DIR: &'static str = "system";
    const TABLE_FILE_EXT: &'static str = "tbl";
    const TEMP_FILE_EXT: &'static str = "tbl.tmp";

    /// Open (creating if needed) the catalog under `data_dir`
    pub fn open(data_dir: impl AsRef<Path>) -> CatalogResult<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let system_dir = data_dir.join(Self::SYSTEM_DIR);

        fs::create_dir_all(&system_dir)?;
        debug!(path = ?system_dir, "opened file catalog");

        Ok(Self {
            data_dir,
            system_dir,
            write_lock: RwLock::new(()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn get_table_file_path(&self, table_name: &str) -> PathBuf {
        self.system_dir
            .join(format!("{}.{}", table_name, Self::TABLE_FILE_EXT))
    }

    fn read_record(&self, table_name: &str) -> CatalogResult<CatalogRecord> {
        if !is_valid_identifier(table_name) {
            return Err(CatalogError::TableNotFound(table_name.to_string()));
        }

        let path = self.get_table_file_path(table_name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CatalogError::TableNotFound(table_name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let file: RecordFile = serde_json::from_slice(&bytes)?;
        file.verify(&path)
    }

    fn write_record(&self, record: &CatalogRecord) -> CatalogResult<()> {
        let path = self.get_table_file_path(&record.table_name);
        let tmp_path = self
            .system_dir
            .join(format!("{}.{}", record.table_name, Self::TEMP_FILE_EXT));

        let file = RecordFile::seal(record.clone())?;
        let bytes = serde_json::to_vec_pretty(&file)?;

        // Contents reach the disk before the rename makes them visible.
        let mut out = File::create(&tmp_path)?;
        out.write_all(&bytes)?;
        out.sync_all()?;
        fs::rename(&tmp_path, &path)?;

        debug!(table = %record.table_name, columns = record.columns.len(), "catalog record written");
        Ok(())
    }

    /// Read-modify-write of one record under the write lock
    fn update<F>(&self, table_name: &str, mutate: F) -> CatalogResult<()>
    where
        F: FnOnce(&mut CatalogRecord) -> CatalogResult<()>,
    {
        let _guard = self.write_lock.write();
        let mut record = self.read_record(table_name)?;
        mutate(&mut record)?;
        self.write_record(&record)
    }
}

impl SchemaCatalog for FileCatalog {
    fn load(&self, table_name: &str) -> CatalogResult<CatalogRecord> {
        let _guard = self.write_lock.read();
        self.read_record(table_name)
    }

    fn create(&self, table_name: &str, columns: Vec<Column>) -> CatalogResult<()> {
        validate_new_record(table_name, &columns)?;

        let _guard = self.write_lock.write();
        if self.get_table_file_path(table_name).exists() {
            return Err(CatalogError::TableAlreadyExists(table_name.to_string()));
        }
        self.write_record(&CatalogRecord::new(table_name, columns))
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
        Ok(is_valid_identifier(table_name) && self.get_table_file_path(table_name).exists())
    }

    fn list_tables(&self) -> CatalogResult<Vec<String>> {
        let _guard = self.write_lock.read();
        let mut names = Vec::new();

        for entry in fs::read_dir(&self.system_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == Self::TABLE_FILE_EXT) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}
