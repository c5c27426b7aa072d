//! Table registry
//!
//! The registry maps a table name to its column names and its confirmed
//! commitment. Both live in one entry, so a reader sees either the whole
//! registration or nothing. Only the coordinator writes to it.

use crate::commitment::Commitment;
use crate::types::Table;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A table created through the commit-reveal protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredTable {
    /// Table name
    pub name: String,

    /// Column names in committed order
    pub columns: Vec<String>,

    /// Confirmed on-chain commitment
    pub commitment: Commitment,
}

impl RegisteredTable {
    /// Registration entry for a table definition
    pub fn for_table(table: &Table) -> Self {
        Self {
            name: table.name.clone(),
            columns: table.column_names(),
            commitment: Commitment::for_table(table),
        }
    }
}

/// Registry of created tables
#[derive(Debug, Default)]
pub struct TableRegistry {
    entries: RwLock<HashMap<String, RegisteredTable>>,
}

impl TableRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from stored table definitions
    ///
    /// Commitments are recomputed from the column names; the scheme is
    /// deterministic, so this reproduces the confirmed values.
    pub fn from_tables<'a>(tables: impl IntoIterator<Item = &'a Table>) -> Self {
        let entries = tables
            .into_iter()
            .map(|table| (table.name.clone(), RegisteredTable::for_table(table)))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, RegisteredTable>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, RegisteredTable>> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a registration
    ///
    /// Returns the previous entry if the name was already taken, leaving it in
    /// place.
    pub(crate) fn insert(&self, entry: RegisteredTable) -> Result<(), RegisteredTable> {
        let mut entries = self.write();
        if let Some(existing) = entries.get(&entry.name) {
            return Err(existing.clone());
        }
        entries.insert(entry.name.clone(), entry);
        Ok(())
    }

    /// Registration for a table name
    pub fn get(&self, name: &str) -> Option<RegisteredTable> {
        self.read().get(name).cloned()
    }

    /// Whether a table name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Registered table names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered tables
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
