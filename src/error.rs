//! Error types
//!
//! One error enum covers both the table-creation protocol and proof
//! verification. Every variant carries a stable wire kind (see [`Error::kind`])
//! so callers can tell "retry later" apart from "fix the input" and
//! "give up".

use crate::commitment::Commitment;
use crate::proof::backend::BackendError;
use std::time::Duration;
use thiserror::Error;

/// Library error type
#[derive(Error, Debug)]
pub enum Error {
    /// The commitment was not observed on-chain within the polling budget
    #[error(
        "commitment {commitment} for table {table} not observed on-chain after {attempts} attempts ({elapsed:?}), commit to on-chain first"
    )]
    ConfirmationTimeout {
        /// Requested table name
        table: String,
        /// Commitment that was polled for
        commitment: Commitment,
        /// Number of membership tests performed
        attempts: u32,
        /// Wall-clock time spent polling
        elapsed: Duration,
    },

    /// A table with this name is already registered
    #[error("table {0} already exists")]
    TableAlreadyExists(String),

    /// Another request is currently creating a table with this name
    #[error("table {0} is being created by a concurrent request")]
    TableConflict(String),

    /// The requested table definition is malformed
    #[error("invalid table {table}: {reason}")]
    InvalidTable {
        /// Requested table name
        table: String,
        /// What is wrong with it
        reason: String,
    },

    /// The storage layer rejected the table write
    #[error("storage write failed: {0}")]
    StorageWriteFailure(String),

    /// Operation tag is not one of select/insert/update/delete
    #[error("unknown SQL operation: {0}")]
    UnsupportedOperation(String),

    /// A public input is not a canonical non-negative integer literal
    #[error("invalid public input #{index} ({value:?}): {reason}")]
    InvalidPublicInput {
        /// Position in the input sequence
        index: usize,
        /// Raw value as submitted
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// Verification could not be performed
    #[error("verification backend error: {0}")]
    VerificationBackend(#[from] BackendError),

    /// Verification keys could not be loaded
    #[error("verification key store error: {0}")]
    KeyStore(String),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Stable snake_case identifier of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ConfirmationTimeout { .. } => "confirmation_timeout",
            Error::TableAlreadyExists(_) => "table_already_exists",
            Error::TableConflict(_) => "table_conflict",
            Error::InvalidTable { .. } => "invalid_table",
            Error::StorageWriteFailure(_) => "storage_write_failure",
            Error::UnsupportedOperation(_) => "unsupported_operation",
            Error::InvalidPublicInput { .. } => "invalid_public_input",
            Error::VerificationBackend(_) => "verification_backend",
            Error::KeyStore(_) => "key_store",
            Error::Config(_) => "config",
        }
    }

    /// Whether resubmitting the same request later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::ConfirmationTimeout { .. } | Error::TableConflict(_)
        )
    }
}

/// Result type for this crate
pub type Result<T> = std::result::Result<T, Error>;
