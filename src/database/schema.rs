//! Database schema management
//!
//! This module holds the table definitions that make up the node's database.
//!
//! # Example
//!
//! ```rust
//! use zksql_node::database::{Database, Schema};
//! use zksql_node::types::{Table, Column, DataType};
//!
//! let mut schema = Schema::new("zksql");
//! let table = Table::new(
//!     "accounts",
//!     vec![
//!         Column::new("id", DataType::Integer),
//!         Column::new("balance", DataType::Decimal),
//!     ],
//! );
//! schema.add_table(table).unwrap();
//!
//! let db = Database::new(schema);
//! assert!(db.get_table("accounts").is_some());
//! ```

use crate::database::storage::StorageError;
use crate::types::Table;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Database schema
///
/// Table definitions keyed by name. A `BTreeMap` keeps the persisted file
/// stable across writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Database name
    pub name: String,

    /// Table definitions (name -> table)
    pub tables: BTreeMap<String, Table>,
}

impl Schema {
    /// Create a new database schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: BTreeMap::new(),
        }
    }

    /// Add a table to the schema
    ///
    /// # Returns
    /// `Err(StorageError::Duplicate)` if a table with that name exists
    pub fn add_table(&mut self, table: Table) -> Result<(), StorageError> {
        if self.tables.contains_key(&table.name) {
            return Err(StorageError::Duplicate(table.name));
        }
        self.tables.insert(table.name.clone(), table);
        Ok(())
    }

    /// Remove a table, returning its definition
    pub fn remove_table(&mut self, name: &str) -> Option<Table> {
        self.tables.remove(name)
    }

    /// Get a table by name
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Validate the schema
    ///
    /// Every table must be keyed by its own name and have a structurally
    /// valid, non-empty column list.
    pub fn validate(&self) -> Result<(), StorageError> {
        for (name, table) in &self.tables {
            if name != &table.name {
                return Err(StorageError::Invalid(format!(
                    "table {} stored under key {}",
                    table.name, name
                )));
            }
            table
                .validate(usize::MAX)
                .map_err(|e| StorageError::Invalid(e.to_string()))?;
        }
        Ok(())
    }

    /// Get all table names
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }
}

/// Database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    /// Database schema
    pub schema: Schema,
}

impl Database {
    /// Create a new database
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// Get a table by name
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.schema.get_table(name)
    }

    /// Validate the database
    pub fn validate(&self) -> Result<(), StorageError> {
        self.schema.validate()
    }

    /// Get all table names
    pub fn table_names(&self) -> Vec<String> {
        self.schema.table_names()
    }
}
