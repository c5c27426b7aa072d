//! Database storage layer
//!
//! [`TableStore`] is the durable sink the table-creation coordinator writes
//! to. [`JsonFileStorage`] keeps the database in memory and flushes it as a
//! JSON document; each flush goes to a temporary file in the same directory
//! that is then renamed over the target, so a crash never leaves a torn file.
//!
//! # Example
//!
//! ```rust,no_run
//! use zksql_node::database::{JsonFileStorage, TableStore};
//! use zksql_node::types::{Column, DataType, Table};
//!
//! let storage = JsonFileStorage::open("data/db.json", "zksql").unwrap();
//! storage
//!     .create_table(&Table::new("users", vec![Column::new("id", DataType::Integer)]))
//!     .unwrap();
//! storage.write_db().unwrap();
//! ```

use crate::database::schema::{Database, Schema};
use crate::types::Table;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("table {0} already exists in storage")]
    Duplicate(String),

    #[error("invalid database: {0}")]
    Invalid(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable table-definition sink
///
/// `create_table` stages a definition, `write_db` makes every staged change
/// durable. The coordinator calls `drop_table` to undo a staged table whose
/// flush failed.
pub trait TableStore: Send + Sync {
    /// Stage a new table definition
    fn create_table(&self, table: &Table) -> Result<(), StorageError>;

    /// Flush staged changes to durable storage
    fn write_db(&self) -> Result<(), StorageError>;

    /// Remove a staged or stored table definition
    fn drop_table(&self, name: &str) -> Result<(), StorageError>;

    /// All stored table definitions, ordered by name
    fn tables(&self) -> Vec<Table>;
}

/// JSON-file backed table store
#[derive(Debug)]
pub struct JsonFileStorage {
    /// Database file
    path: PathBuf,

    /// In-memory database
    database: Mutex<Database>,
}

impl JsonFileStorage {
    /// Open a database file, starting empty if it does not exist yet
    ///
    /// # Arguments
    /// * `path` - Database file path
    /// * `name` - Database name used when creating a new file
    pub fn open(path: impl AsRef<Path>, name: &str) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let database = if path.exists() {
            Self::load(&path)?
        } else {
            Database::new(Schema::new(name))
        };

        Ok(Self {
            path,
            database: Mutex::new(database),
        })
    }

    /// Load a database from a file
    pub fn load(path: &Path) -> Result<Database, StorageError> {
        let contents = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let database: Database = serde_json::from_str(&contents)?;
        database.validate()?;
        Ok(database)
    }

    /// Database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Database> {
        self.database
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, database: &Database) -> Result<(), StorageError> {
        database.validate()?;
        let json = serde_json::to_vec_pretty(database)?;

        let io_err = |source: std::io::Error| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(io_err)?;

        let mut file = NamedTempFile::new_in(&dir).map_err(io_err)?;
        file.write_all(&json).map_err(io_err)?;
        file.as_file().sync_all().map_err(io_err)?;
        file.persist(&self.path).map_err(|e| io_err(e.error))?;

        Ok(())
    }
}

impl TableStore for JsonFileStorage {
    fn create_table(&self, table: &Table) -> Result<(), StorageError> {
        self.lock().schema.add_table(table.clone())
    }

    fn write_db(&self) -> Result<(), StorageError> {
        let database = self.lock();
        self.persist(&database)
    }

    fn drop_table(&self, name: &str) -> Result<(), StorageError> {
        self.lock().schema.remove_table(name);
        Ok(())
    }

    fn tables(&self) -> Vec<Table> {
        self.lock().schema.tables.values().cloned().collect()
    }
}
