//! Cryptographic primitives module
//!
//! Hash functions shared by the commitment engine (SHA-256) and the
//! verification key store (Blake2b fingerprints).
//!
//! # Example
//!
//! ```rust
//! use zksql_node::crypto::HashUtils;
//!
//! let digest = HashUtils::sha256_framed(b"DOMAIN", &["id", "name"]);
//! assert_eq!(digest.len(), 32);
//!
//! let fingerprint = HashUtils::blake2b_fingerprint(b"{}");
//! assert_eq!(fingerprint.len(), 16);
//! ```

pub mod hash;

pub use hash::HashUtils;
