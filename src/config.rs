//! Node configuration
//!
//! All settings have defaults, so a config file only needs the fields it
//! overrides.
//!
//! # Example
//!
//! ```json
//! {
//!   "listen_addr": "0.0.0.0:8080",
//!   "storage_path": "data/db.json",
//!   "keys_dir": "circuits",
//!   "circuit": { "max_and": 5, "max_or": 2, "max_rows": 10, "max_cols": 5 },
//!   "confirmation": { "initial_delay_ms": 100, "max_attempts": 10 }
//! }
//! ```

use crate::coordinator::BackoffPolicy;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Circuit size bounds shared with clients
///
/// These are fixed by the compiled circuits; the node only publishes them and
/// uses `max_cols` to reject tables no circuit could handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CircuitParams {
    /// Maximum AND terms in a WHERE clause
    #[serde(rename = "maxAND", alias = "max_and")]
    pub max_and: usize,

    /// Maximum OR groups in a WHERE clause
    #[serde(rename = "maxOR", alias = "max_or")]
    pub max_or: usize,

    /// Maximum rows per table
    #[serde(alias = "max_rows")]
    pub max_rows: usize,

    /// Maximum columns per table
    #[serde(alias = "max_cols")]
    pub max_cols: usize,
}

impl Default for CircuitParams {
    fn default() -> Self {
        Self {
            max_and: 5,
            max_or: 2,
            max_rows: 10,
            max_cols: 5,
        }
    }
}

/// On-chain confirmation polling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Delay before the second membership test
    pub initial_delay_ms: u64,

    /// Ceiling for a single delay
    pub max_delay_ms: u64,

    /// Growth factor between delays
    pub multiplier: f64,

    /// Maximum number of membership tests
    pub max_attempts: u32,

    /// Overall polling deadline
    pub deadline_ms: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 100,
            max_delay_ms: 10_000,
            multiplier: 2.0,
            max_attempts: 10,
            deadline_ms: 60_000,
        }
    }
}

impl ConfirmationConfig {
    /// Build the backoff policy used by the coordinator
    pub fn policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            multiplier: self.multiplier,
            max_attempts: self.max_attempts,
            deadline: Duration::from_millis(self.deadline_ms),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::Config("confirmation.max_attempts must be at least 1".to_string()));
        }
        if !(self.multiplier >= 1.0) || !self.multiplier.is_finite() {
            return Err(Error::Config(format!(
                "confirmation.multiplier must be a finite number >= 1, got {}",
                self.multiplier
            )));
        }
        if self.max_delay_ms < self.initial_delay_ms {
            return Err(Error::Config(
                "confirmation.max_delay_ms must not be below initial_delay_ms".to_string(),
            ));
        }
        Ok(())
    }
}

/// Top-level node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// HTTP listen address
    pub listen_addr: SocketAddr,

    /// JSON database file
    pub storage_path: PathBuf,

    /// Directory holding `<kind>/verification_key.json`
    pub keys_dir: PathBuf,

    /// snarkjs executable used for proof verification
    pub snarkjs_bin: PathBuf,

    /// Circuit bounds
    pub circuit: CircuitParams,

    /// Confirmation polling
    pub confirmation: ConfirmationConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            storage_path: PathBuf::from("data/db.json"),
            keys_dir: PathBuf::from("circuits"),
            snarkjs_bin: PathBuf::from("snarkjs"),
            circuit: CircuitParams::default(),
            confirmation: ConfirmationConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&contents)
    }

    /// Parse configuration from JSON text
    pub fn from_json(contents: &str) -> Result<Self> {
        let config: NodeConfig = serde_json::from_str(contents)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.circuit.max_cols == 0 {
            return Err(Error::Config("circuit.maxCols must be at least 1".to_string()));
        }
        self.confirmation.validate()
    }
}
