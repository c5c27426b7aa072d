//! Core types
//!
//! This module defines the data structures shared by the table-creation
//! protocol and the proof verifier:
//! - Table and column definitions
//! - SQL data types
//! - Operation kinds (one proof circuit per kind)

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Table definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name
    pub name: String,

    /// Column definitions, in committed order
    pub columns: Vec<Column>,
}

impl Table {
    /// Create a new table definition
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Get number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Check the definition against structural rules
    ///
    /// A table needs a non-empty name, at least one column, unique column
    /// names and at most `max_cols` columns.
    pub fn validate(&self, max_cols: usize) -> Result<()> {
        let invalid = |reason: String| Error::InvalidTable {
            table: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("table name is empty".to_string()));
        }
        if self.columns.is_empty() {
            return Err(invalid("table has no columns".to_string()));
        }
        if self.columns.len() > max_cols {
            return Err(invalid(format!(
                "{} columns exceed the circuit limit of {}",
                self.columns.len(),
                max_cols
            )));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if column.name.is_empty() {
                return Err(invalid("column name is empty".to_string()));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(invalid(format!("duplicate column: {}", column.name)));
            }
        }

        Ok(())
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Data type
    #[serde(rename = "type")]
    pub data_type: DataType,
}

impl Column {
    /// Create a new column
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// SQL data types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// 32-bit integer
    Integer,

    /// 64-bit integer
    BigInt,

    /// Decimal number (stored as fixed-point integer)
    Decimal,

    /// Variable-length string
    Varchar(usize),

    /// Date (Unix timestamp)
    Date,

    /// Boolean value
    Boolean,
}

/// SQL operation kind
///
/// Each kind has its own circuit and therefore its own verification key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl OperationKind {
    /// All kinds, in key-store order
    pub const ALL: [OperationKind; 4] = [
        OperationKind::Select,
        OperationKind::Insert,
        OperationKind::Update,
        OperationKind::Delete,
    ];

    /// Lowercase tag used on the wire and in key paths
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Select => "select",
            OperationKind::Insert => "insert",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        }
    }

    /// Classify a single SQL statement
    ///
    /// # Example
    /// ```
    /// use zksql_node::types::OperationKind;
    ///
    /// let kind = OperationKind::from_sql("DELETE FROM users WHERE id = 3").unwrap();
    /// assert_eq!(kind, OperationKind::Delete);
    /// ```
    pub fn from_sql(sql: &str) -> Result<Self> {
        let statements = Parser::parse_sql(&GenericDialect {}, sql)
            .map_err(|e| Error::UnsupportedOperation(format!("unparsable statement: {}", e)))?;

        let statement = match statements.as_slice() {
            [statement] => statement,
            _ => {
                return Err(Error::UnsupportedOperation(format!(
                    "expected exactly one statement, got {}",
                    statements.len()
                )))
            }
        };

        match statement {
            Statement::Query { .. } => Ok(OperationKind::Select),
            Statement::Insert { .. } => Ok(OperationKind::Insert),
            Statement::Update { .. } => Ok(OperationKind::Update),
            Statement::Delete { .. } => Ok(OperationKind::Delete),
            other => Err(Error::UnsupportedOperation(
                other.to_string().split_whitespace().next().unwrap_or("").to_lowercase(),
            )),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        match tag {
            "select" => Ok(OperationKind::Select),
            "insert" => Ok(OperationKind::Insert),
            "update" => Ok(OperationKind::Update),
            "delete" => Ok(OperationKind::Delete),
            other => Err(Error::UnsupportedOperation(other.to_string())),
        }
    }
}
