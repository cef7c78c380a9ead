//! Driver configuration
//!
//! Read from a JSON file; every field has a default, so an empty object is a
//! valid configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::error::CatalogResult;
use crate::catalog::{FileCatalog, MemoryCatalog, SchemaCatalog};
use crate::storage::{MemoryStore, SchemaStore, StorageResult};
use crate::types::LogLevel;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Where catalog records and physical tables live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackend {
    /// Catalog files under `<data_dir>/system`, table snapshots under
    /// `<data_dir>/base`
    #[default]
    File,
    /// Process memory for both, lost on exit
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DyntableConfig {
    /// Root directory for durable state.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Catalog backend.
    #[serde(default)]
    pub catalog: CatalogBackend,

    /// Log level used when `RUST_LOG` is not set.
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Table snapshot directory under `data_dir`
pub const STORE_DIR: &str = "base";

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for DyntableConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            catalog: CatalogBackend::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl DyntableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Open the configured catalog backend
    pub fn open_catalog(&self) -> CatalogResult<Arc<dyn SchemaCatalog>> {
        let catalog: Arc<dyn SchemaCatalog> = match self.catalog {
            CatalogBackend::File => Arc::new(FileCatalog::open(&self.data_dir)?),
            CatalogBackend::Memory => Arc::new(MemoryCatalog::new()),
        };
        Ok(catalog)
    }

    /// Open the physical store that goes with the catalog backend
    ///
    /// A durable catalog always gets a durable store, so a restart never
    /// finds catalog records without their tables.
    pub fn open_store(&self) -> StorageResult<Arc<dyn SchemaStore>> {
        let store = match self.catalog {
            CatalogBackend::File => MemoryStore::open(self.data_dir.join(STORE_DIR))?,
            CatalogBackend::Memory => MemoryStore::new(),
        };
        Ok(Arc::new(store))
    }
}
