//! Verification key store
//!
//! One key per operation kind, loaded once at startup from
//! `<dir>/<kind>/verification_key.json`. Keys are kept as opaque JSON
//! artifacts; only the backend interprets them.

use crate::crypto::HashUtils;
use crate::error::{Error, Result};
use crate::types::OperationKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// File name of a key inside its kind directory
pub const VERIFICATION_KEY_FILE: &str = "verification_key.json";

/// Verification key for one circuit
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationKey {
    /// Circuit this key verifies
    pub kind: OperationKind,

    /// Key as produced by the proving toolkit
    pub artifact: serde_json::Value,

    /// Short Blake2b fingerprint of the serialized key
    pub fingerprint: String,
}

impl VerificationKey {
    /// Wrap a key artifact
    pub fn new(kind: OperationKind, artifact: serde_json::Value) -> Self {
        let fingerprint = HashUtils::blake2b_fingerprint(artifact.to_string().as_bytes());
        Self {
            kind,
            artifact,
            fingerprint,
        }
    }

    /// Proof system named by the key, `plonk` if absent
    pub fn protocol(&self) -> &str {
        self.artifact
            .get("protocol")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("plonk")
    }

    /// Number of public inputs the circuit expects, if the key states it
    pub fn n_public(&self) -> Option<u64> {
        self.artifact
            .get("nPublic")
            .and_then(serde_json::Value::as_u64)
    }
}

/// Keys for every operation kind
///
/// Lookup by kind is an exhaustive match, so a loaded store can serve any
/// [`OperationKind`].
#[derive(Debug, Clone)]
pub struct VerificationKeys {
    select: VerificationKey,
    insert: VerificationKey,
    update: VerificationKey,
    delete: VerificationKey,
}

/// Loaded key summary, as published by the health endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySummary {
    /// Proof system
    pub protocol: String,

    /// Key fingerprint
    pub fingerprint: String,
}

impl VerificationKeys {
    /// Build a store from one key per kind
    pub fn new(
        select: serde_json::Value,
        insert: serde_json::Value,
        update: serde_json::Value,
        delete: serde_json::Value,
    ) -> Self {
        Self {
            select: VerificationKey::new(OperationKind::Select, select),
            insert: VerificationKey::new(OperationKind::Insert, insert),
            update: VerificationKey::new(OperationKind::Update, update),
            delete: VerificationKey::new(OperationKind::Delete, delete),
        }
    }

    /// Load `<dir>/<kind>/verification_key.json` for every kind
    ///
    /// # Errors
    /// `KeyStore` if any file is missing or is not a JSON object
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let load = |kind: OperationKind| -> Result<VerificationKey> {
            let path = dir.join(kind.as_str()).join(VERIFICATION_KEY_FILE);
            let contents = std::fs::read_to_string(&path).map_err(|e| {
                Error::KeyStore(format!("cannot read {}: {}", path.display(), e))
            })?;
            let artifact: serde_json::Value = serde_json::from_str(&contents).map_err(|e| {
                Error::KeyStore(format!("malformed key {}: {}", path.display(), e))
            })?;
            if !artifact.is_object() {
                return Err(Error::KeyStore(format!(
                    "malformed key {}: expected a JSON object",
                    path.display()
                )));
            }

            let key = VerificationKey::new(kind, artifact);
            log::info!(
                "loaded {} verification key ({}, fingerprint {})",
                kind,
                key.protocol(),
                key.fingerprint
            );
            Ok(key)
        };

        Ok(Self {
            select: load(OperationKind::Select)?,
            insert: load(OperationKind::Insert)?,
            update: load(OperationKind::Update)?,
            delete: load(OperationKind::Delete)?,
        })
    }

    /// Key for an operation kind
    pub fn get(&self, kind: OperationKind) -> &VerificationKey {
        match kind {
            OperationKind::Select => &self.select,
            OperationKind::Insert => &self.insert,
            OperationKind::Update => &self.update,
            OperationKind::Delete => &self.delete,
        }
    }

    /// Protocol and fingerprint per kind
    pub fn summary(&self) -> BTreeMap<OperationKind, KeySummary> {
        OperationKind::ALL
            .iter()
            .map(|&kind| {
                let key = self.get(kind);
                (
                    kind,
                    KeySummary {
                        protocol: key.protocol().to_string(),
                        fingerprint: key.fingerprint.clone(),
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_keys(dir: &Path) {
        for kind in OperationKind::ALL {
            let kind_dir = dir.join(kind.as_str());
            std::fs::create_dir_all(&kind_dir).unwrap();
            let key = json!({ "protocol": "plonk", "curve": "bn128", "nPublic": 3, "circuit": kind.as_str() });
            std::fs::write(kind_dir.join(VERIFICATION_KEY_FILE), key.to_string()).unwrap();
        }
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_keys(dir.path());

        let keys = VerificationKeys::load_dir(dir.path()).unwrap();
        for kind in OperationKind::ALL {
            let key = keys.get(kind);
            assert_eq!(key.kind, kind);
            assert_eq!(key.protocol(), "plonk");
            assert_eq!(key.n_public(), Some(3));
            assert_eq!(key.artifact["circuit"], kind.as_str());
            assert_eq!(key.fingerprint.len(), 16);
        }
        assert_ne!(
            keys.get(OperationKind::Select).fingerprint,
            keys.get(OperationKind::Delete).fingerprint
        );
    }

    #[test]
    fn test_missing_key_file() {
        let dir = tempfile::tempdir().unwrap();
        write_keys(dir.path());
        std::fs::remove_file(dir.path().join("update").join(VERIFICATION_KEY_FILE)).unwrap();

        let err = VerificationKeys::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, Error::KeyStore(msg) if msg.contains("update")));
    }

    #[test]
    fn test_malformed_key_file() {
        let dir = tempfile::tempdir().unwrap();
        write_keys(dir.path());
        std::fs::write(dir.path().join("insert").join(VERIFICATION_KEY_FILE), "[1, 2]").unwrap();

        assert!(matches!(
            VerificationKeys::load_dir(dir.path()),
            Err(Error::KeyStore(_))
        ));
    }

    #[test]
    fn test_default_protocol() {
        let key = VerificationKey::new(OperationKind::Select, json!({}));
        assert_eq!(key.protocol(), "plonk");
        assert_eq!(key.n_public(), None);
    }

    #[test]
    fn test_summary_covers_every_kind() {
        let keys = VerificationKeys::new(json!({}), json!({}), json!({}), json!({ "protocol": "groth16" }));
        let summary = keys.summary();
        assert_eq!(summary.len(), 4);
        assert_eq!(summary[&OperationKind::Delete].protocol, "groth16");
    }
}
