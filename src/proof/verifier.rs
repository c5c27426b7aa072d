//! Proof-verification dispatcher
//!
//! Routes a proof to the verification key of its operation kind and asks the
//! backend for a verdict. Input problems (unknown kind, non-canonical public
//! input) are reported before any cryptographic work; a proof that does not
//! verify is `Ok(false)`, not an error.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use zksql_node::proof::{ProofArtifact, SnarkjsBackend, VerificationKeys, Verifier};
//! use zksql_node::types::OperationKind;
//!
//! # async fn run() -> zksql_node::Result<()> {
//! let keys = VerificationKeys::load_dir("circuits")?;
//! let verifier = Verifier::new(keys, Arc::new(SnarkjsBackend::new("snarkjs")));
//!
//! let proof = ProofArtifact(serde_json::json!({ "protocol": "plonk" }));
//! let valid = verifier
//!     .verify(OperationKind::Select, &["1".to_string(), "42".to_string()], &proof)
//!     .await?;
//! println!("valid: {}", valid);
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use crate::proof::backend::{BackendError, ProofArtifact, ProofBackend};
use crate::proof::keys::VerificationKeys;
use crate::proof::public_inputs::PublicInputs;
use crate::types::OperationKind;
use std::sync::Arc;

/// Proof verifier
///
/// Stateless apart from the loaded keys; cheap to clone and share.
#[derive(Clone)]
pub struct Verifier {
    keys: Arc<VerificationKeys>,
    backend: Arc<dyn ProofBackend>,
}

impl Verifier {
    /// Create a verifier over a key store and backend
    pub fn new(keys: VerificationKeys, backend: Arc<dyn ProofBackend>) -> Self {
        Self {
            keys: Arc::new(keys),
            backend,
        }
    }

    /// Verify a proof of an operation
    ///
    /// # Arguments
    /// * `kind` - Operation the proof claims to cover
    /// * `public_inputs` - Decimal public inputs, in circuit order
    /// * `proof` - Proof artifact
    ///
    /// # Returns
    /// `Ok(true)` if the proof verifies, `Ok(false)` if it does not
    ///
    /// # Errors
    /// - `InvalidPublicInput` if an input is not a canonical field element
    /// - `VerificationBackend` if the backend could not reach a verdict
    pub async fn verify(
        &self,
        kind: OperationKind,
        public_inputs: &[String],
        proof: &ProofArtifact,
    ) -> Result<bool> {
        let inputs = PublicInputs::canonicalize(public_inputs)?;

        let key = self.keys.get(kind);
        if let Some(expected) = key.n_public() {
            if expected != inputs.len() as u64 {
                log::debug!(
                    "{} proof carries {} public inputs, key expects {}",
                    kind,
                    inputs.len(),
                    expected
                );
            }
        }

        let keys = Arc::clone(&self.keys);
        let backend = Arc::clone(&self.backend);
        let proof = proof.clone();
        let verdict = tokio::task::spawn_blocking(move || {
            backend.verify(keys.get(kind), &inputs, &proof)
        })
        .await
        .map_err(|e| BackendError::Aborted(e.to_string()))?;

        match verdict {
            Ok(valid) => {
                log::info!("{} proof verified: {}", kind, valid);
                Ok(valid)
            }
            Err(e) => {
                log::warn!("{} backend failed on {} proof: {}", self.backend.name(), kind, e);
                Err(Error::VerificationBackend(e))
            }
        }
    }

    /// Verify a proof whose kind arrives as an untyped tag
    ///
    /// # Errors
    /// `UnsupportedOperation` if the tag is not one of
    /// `select`/`insert`/`update`/`delete`, plus everything [`Verifier::verify`]
    /// returns
    pub async fn verify_tagged(
        &self,
        tag: &str,
        public_inputs: &[String],
        proof: &ProofArtifact,
    ) -> Result<bool> {
        let kind: OperationKind = tag.parse()?;
        self.verify(kind, public_inputs, proof).await
    }

    /// Loaded verification keys
    pub fn keys(&self) -> &VerificationKeys {
        &self.keys
    }

    /// Backend name
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }
}
