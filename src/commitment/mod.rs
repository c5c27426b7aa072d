//! Table commitment module
//!
//! Provides the commitment engine of the commit-reveal table-creation
//! protocol.
//!
//! # Overview
//!
//! Before a table may be created, the client publishes a commitment to its
//! ordered column names on-chain. The node later recomputes the commitment
//! from the creation request and only materializes the table once the chain
//! listener has observed that exact value. Confirmation is checked by
//! equality, so the scheme must be deterministic and identical on both sides.
//!
//! # Scheme
//!
//! - SHA-256 over a versioned domain tag, the column count, and every column
//!   name length-prefixed
//! - First 31 digest bytes kept, so the commitment is a canonical BN254 scalar
//!   and can be used directly as a circuit public input
//!
//! # Example
//!
//! ```rust
//! use zksql_node::commitment::{commit_to_table, Commitment};
//!
//! let commitment = commit_to_table(&["id", "owner", "balance"]);
//!
//! // what the client posts on-chain
//! println!("commitment: {}", commitment);
//!
//! // round-trips through its decimal public-input form
//! let decimal = commitment.to_decimal();
//! assert_eq!(Commitment::from_decimal(&decimal).unwrap(), commitment);
//! ```

pub mod table;

pub use table::{commit_to_table, Commitment, CommitmentParseError, TABLE_COMMITMENT_DOMAIN};
