//! zkSQL node: commit-reveal table creation and proof verification for SQL
//! operations
//!
//! A client first posts a commitment to a new table's column names on-chain.
//! The node recomputes that commitment from the creation request and only
//! materializes the table once the chain listener has observed it. Proofs of
//! `select`/`insert`/`update`/`delete` operations are then verified against
//! per-operation verification keys.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use zksql_node::*;
//!
//! # async fn run() -> zksql_node::Result<()> {
//! let pending = Arc::new(PendingCommitmentSet::new());
//! let storage = Arc::new(JsonFileStorage::open("data/db.json", "zksql").unwrap());
//! let coordinator = TableCoordinator::new(
//!     pending.clone(),
//!     storage,
//!     BackoffPolicy::default(),
//!     CircuitParams::default(),
//! );
//!
//! let table = Table::new("users", vec![Column::new("id", DataType::Integer)]);
//! pending.observe(commit_to_table(&table.column_names()));
//! coordinator.request_table_creation(table).await?;
//!
//! let verifier = Verifier::new(
//!     VerificationKeys::load_dir("circuits")?,
//!     Arc::new(SnarkjsBackend::new("snarkjs")),
//! );
//! let proof = ProofArtifact(serde_json::json!({ "protocol": "plonk" }));
//! let valid = verifier.verify_tagged("select", &["1".to_string()], &proof).await?;
//! # Ok(())
//! # }
//! ```

pub use chain::{PendingCommitmentSet, PendingCommitments};
pub use commitment::{commit_to_table, Commitment};
pub use config::{CircuitParams, NodeConfig};
pub use coordinator::{Acknowledgement, BackoffPolicy, RegisteredTable, TableCoordinator};
pub use database::{JsonFileStorage, TableStore};
pub use error::{Error, Result};
pub use proof::{ProofArtifact, ProofBackend, SnarkjsBackend, VerificationKeys, Verifier};
pub use types::{Column, DataType, OperationKind, Table};

/// zkSQL node version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Main modules
pub mod commitment;
pub mod error;
pub mod field;
pub mod types;

pub mod chain;
pub mod config;
pub mod coordinator;
pub mod crypto;
pub mod database;
pub mod proof;
pub mod utils;

#[cfg(feature = "api")]
pub mod api;
