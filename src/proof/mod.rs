//! Proof verification module
//!
//! Checks zero-knowledge proofs of SQL operations against the verification
//! key of the operation's circuit.
//!
//! The proof module consists of:
//! - `public_inputs`: Canonicalization of decimal public inputs
//! - `keys`: Per-operation verification key store
//! - `backend`: The [`ProofBackend`] seam and the `snarkjs` CLI backend
//! - `verifier`: The dispatcher tying the three together
//!
//! # Workflow
//!
//! 1. **Dispatch**: Map the operation kind to its verification key
//! 2. **Canonicalize**: Reject public inputs that are not field elements
//! 3. **Verify**: Hand key, inputs and proof to the backend

pub mod backend;
pub mod keys;
pub mod public_inputs;
pub mod verifier;

pub use backend::{BackendError, ProofArtifact, ProofBackend, SnarkjsBackend};
pub use keys::{KeySummary, VerificationKey, VerificationKeys, VERIFICATION_KEY_FILE};
pub use public_inputs::PublicInputs;
pub use verifier::Verifier;
