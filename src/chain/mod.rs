//! Chain listener boundary
//!
//! The on-chain listener owns the set of commitments it has seen but that have
//! not been consumed yet. The table-creation coordinator only ever asks
//! whether a commitment is in that set; adding and removing entries is the
//! listener's job.
//!
//! # Example
//!
//! ```rust
//! use zksql_node::chain::{PendingCommitmentSet, PendingCommitments};
//! use zksql_node::commitment::commit_to_table;
//!
//! let pending = PendingCommitmentSet::new();
//! let commitment = commit_to_table(&["id", "name"]);
//! assert!(!pending.contains(&commitment));
//!
//! // listener side
//! pending.observe(commitment);
//! assert!(pending.contains(&commitment));
//! ```

pub mod pending;

pub use pending::{PendingCommitmentSet, PendingCommitments};
