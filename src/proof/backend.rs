//! Proof verification backends
//!
//! [`ProofBackend`] is the seam to the external proving toolkit. The
//! dispatcher hands it a key, canonical public inputs and the proof artifact;
//! the backend answers valid / invalid, or fails.
//!
//! [`SnarkjsBackend`] runs the `snarkjs` CLI, the toolkit the circuits are
//! compiled and proven with.

use crate::proof::keys::VerificationKey;
use crate::proof::public_inputs::PublicInputs;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

/// Backend failures
///
/// A proof that simply does not verify is `Ok(false)`, never one of these.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("malformed proof artifact: {0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("verifier exited with {status:?}: {output}")]
    Process {
        status: Option<i32>,
        output: String,
    },

    #[error("verification task aborted: {0}")]
    Aborted(String),
}

/// Proof as produced by the proving toolkit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProofArtifact(pub serde_json::Value);

impl ProofArtifact {
    /// Proof system named by the proof, if any
    pub fn protocol(&self) -> Option<&str> {
        self.0.get("protocol").and_then(serde_json::Value::as_str)
    }
}

impl From<serde_json::Value> for ProofArtifact {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Proof verification backend
///
/// Implementations may block; the dispatcher calls them from tokio's blocking
/// pool.
pub trait ProofBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Check `proof` against `key` and `inputs`
    fn verify(
        &self,
        key: &VerificationKey,
        inputs: &PublicInputs,
        proof: &ProofArtifact,
    ) -> Result<bool, BackendError>;
}

/// `snarkjs` command-line verifier
///
/// Runs `<program> [args..] <protocol> verify vk.json public.json proof.json`
/// in a scratch directory.
#[derive(Debug, Clone)]
pub struct SnarkjsBackend {
    program: PathBuf,
    args: Vec<OsString>,
}

impl SnarkjsBackend {
    /// Use `program` as the snarkjs executable
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Launch snarkjs through another program, e.g. `npx snarkjs`
    pub fn with_args<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn interpret(status: Option<i32>, output: String) -> Result<bool, BackendError> {
        if output.contains("OK!") {
            Ok(true)
        } else if output.to_lowercase().contains("invalid proof") {
            Ok(false)
        } else {
            Err(BackendError::Process { status, output })
        }
    }
}

impl ProofBackend for SnarkjsBackend {
    fn name(&self) -> &str {
        "snarkjs"
    }

    fn verify(
        &self,
        key: &VerificationKey,
        inputs: &PublicInputs,
        proof: &ProofArtifact,
    ) -> Result<bool, BackendError> {
        if !proof.0.is_object() {
            return Err(BackendError::Malformed("proof must be a JSON object".to_string()));
        }
        let protocol = key.protocol();
        if let Some(claimed) = proof.protocol() {
            if claimed != protocol {
                log::debug!(
                    "{} proof rejected: {} key cannot check a {} proof",
                    key.kind,
                    protocol,
                    claimed
                );
                return Ok(false);
            }
        }

        let scratch = tempfile::tempdir()?;
        let vk_path = scratch.path().join("verification_key.json");
        let public_path = scratch.path().join("public.json");
        let proof_path = scratch.path().join("proof.json");

        std::fs::write(&vk_path, key.artifact.to_string())?;
        std::fs::write(
            &public_path,
            serde_json::Value::from(inputs.to_decimal_strings()).to_string(),
        )?;
        std::fs::write(&proof_path, proof.0.to_string())?;

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(protocol)
            .arg("verify")
            .arg(&vk_path)
            .arg(&public_path)
            .arg(&proof_path)
            .current_dir(scratch.path())
            .output()?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Self::interpret(output.status.code(), text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OperationKind;
    use serde_json::json;

    fn key() -> VerificationKey {
        VerificationKey::new(OperationKind::Select, json!({ "protocol": "plonk", "nPublic": 2 }))
    }

    fn inputs() -> PublicInputs {
        PublicInputs::canonicalize(&["12", "0034"]).unwrap()
    }

    #[test]
    fn test_interpret_output() {
        assert!(SnarkjsBackend::interpret(Some(0), "[INFO]  snarkJS: OK!".to_string()).unwrap());
        assert!(!SnarkjsBackend::interpret(Some(1), "[WARN]  snarkJS: Invalid proof".to_string()).unwrap());
        assert!(matches!(
            SnarkjsBackend::interpret(Some(127), "snarkjs: command not found".to_string()),
            Err(BackendError::Process { status: Some(127), .. })
        ));
    }

    #[test]
    fn test_protocol_mismatch_is_invalid() {
        // never reaches the program
        let backend = SnarkjsBackend::new("/nonexistent/snarkjs");
        let proof = ProofArtifact(json!({ "protocol": "groth16" }));
        assert!(!backend.verify(&key(), &inputs(), &proof).unwrap());
    }

    #[test]
    fn test_non_object_proof_is_malformed() {
        let backend = SnarkjsBackend::new("/nonexistent/snarkjs");
        let proof = ProofArtifact(json!("not a proof"));
        assert!(matches!(
            backend.verify(&key(), &inputs(), &proof),
            Err(BackendError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let backend = SnarkjsBackend::new("/nonexistent/snarkjs");
        let proof = ProofArtifact(json!({ "protocol": "plonk" }));
        assert!(matches!(
            backend.verify(&key(), &inputs(), &proof),
            Err(BackendError::Io(_))
        ));
    }

    #[cfg(unix)]
    fn scripted(script: &str) -> (tempfile::TempDir, SnarkjsBackend) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake-snarkjs.sh");
        std::fs::write(&path, script).unwrap();
        let backend = SnarkjsBackend::with_args("sh", [path.into_os_string()]);
        (dir, backend)
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_program_with_canonical_inputs() {
        // accepts only when invoked as `plonk verify` with canonical signals
        let (_dir, backend) = scripted(
            r#"[ "$1 $2" = "plonk verify" ] || exit 2
grep -q '"34"' "$4" && echo "[INFO]  snarkJS: OK!" || echo "[WARN]  snarkJS: Invalid proof"
"#,
        );
        let proof = ProofArtifact(json!({ "protocol": "plonk" }));
        assert!(backend.verify(&key(), &inputs(), &proof).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_program_reports_invalid() {
        let (_dir, backend) = scripted("echo '[WARN]  snarkJS: Invalid proof'; exit 1\n");
        let proof = ProofArtifact(json!({ "protocol": "plonk" }));
        assert!(!backend.verify(&key(), &inputs(), &proof).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_program_failure_is_error() {
        let (_dir, backend) = scripted("echo 'Error: Invalid vk' >&2; exit 1\n");
        let proof = ProofArtifact(json!({ "protocol": "plonk" }));
        assert!(matches!(
            backend.verify(&key(), &inputs(), &proof),
            Err(BackendError::Process { status: Some(1), .. })
        ));
    }
}
