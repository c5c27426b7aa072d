//! Hash functions
//!
//! # Framing
//!
//! [`HashUtils::sha256_framed`] hashes a domain separator followed by the item
//! count and every item prefixed with its byte length, all as big-endian
//! `u64`. The framing makes the digest injective over ordered item lists:
//! `["ab", "c"]`, `["a", "bc"]` and `["abc"]` hash differently.

use blake2::{Blake2b512, Digest as Blake2Digest};
use sha2::{Digest, Sha256};

/// Hash utilities
pub struct HashUtils;

impl HashUtils {
    /// SHA-256 over a domain separator and a length-framed ordered item list
    ///
    /// # Arguments
    /// * `domain` - Domain separation tag
    /// * `items` - Ordered items to bind
    ///
    /// # Returns
    /// Raw 32-byte digest
    pub fn sha256_framed<T: AsRef<[u8]>>(domain: &[u8], items: &[T]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        Digest::update(&mut hasher, (domain.len() as u64).to_be_bytes());
        Digest::update(&mut hasher, domain);
        Digest::update(&mut hasher, (items.len() as u64).to_be_bytes());
        for item in items {
            let item = item.as_ref();
            Digest::update(&mut hasher, (item.len() as u64).to_be_bytes());
            Digest::update(&mut hasher, item);
        }
        Digest::finalize(hasher).into()
    }

    /// Short Blake2b fingerprint of an artifact
    ///
    /// First 8 bytes of Blake2b-512, hex-encoded. Used to identify loaded
    /// verification keys in logs; not a security boundary.
    pub fn blake2b_fingerprint(data: &[u8]) -> String {
        let mut hasher = Blake2b512::new();
        Blake2Digest::update(&mut hasher, data);
        let digest = Blake2Digest::finalize(hasher);
        hex::encode(&digest[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framed_is_deterministic() {
        let a = HashUtils::sha256_framed(b"D", &["id", "name"]);
        let b = HashUtils::sha256_framed(b"D", &["id", "name"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_framed_boundaries() {
        let split_a = HashUtils::sha256_framed(b"D", &["ab", "c"]);
        let split_b = HashUtils::sha256_framed(b"D", &["a", "bc"]);
        let joined = HashUtils::sha256_framed(b"D", &["abc"]);
        assert_ne!(split_a, split_b);
        assert_ne!(split_a, joined);
        assert_ne!(split_b, joined);
    }

    #[test]
    fn test_framed_domain_separation() {
        let a = HashUtils::sha256_framed(b"A", &["x"]);
        let b = HashUtils::sha256_framed(b"B", &["x"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_framed_empty_list() {
        let empty: [&str; 0] = [];
        let a = HashUtils::sha256_framed(b"D", &empty);
        let b = HashUtils::sha256_framed(b"D", &[""]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_blake2b_fingerprint() {
        let fp = HashUtils::blake2b_fingerprint(b"{\"protocol\":\"plonk\"}");
        assert_eq!(fp.len(), 16);
        assert_ne!(fp, HashUtils::blake2b_fingerprint(b"{}"));
    }
}
