//! Table column commitments
//!
//! A table commitment binds the ordered list of column names. The client
//! publishes it on-chain before asking the node to create the table, and the
//! node recomputes it from the request to recognize the on-chain entry. Both
//! sides must use this exact scheme.

use crate::crypto::HashUtils;
use crate::types::Table;
use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Domain separator for table commitments
pub const TABLE_COMMITMENT_DOMAIN: &[u8] = b"ZKSQL_TABLE_COLUMNS_V1";

/// Number of digest bytes kept in a commitment
///
/// 31 bytes keep every commitment below 2^248, inside the BN254 scalar field.
const COMMITMENT_VALUE_BYTES: usize = 31;

/// Commitment to an ordered list of column names
///
/// Stored as the little-endian bytes of a BN254 scalar whose most significant
/// byte is always zero. Displayed as a 0x-prefixed big-endian hex word, the
/// way it appears as an on-chain `uint256`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Commitment([u8; 32]);

/// Error parsing a commitment from text
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommitmentParseError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("expected 32 bytes, got {0}")]
    Length(usize),

    #[error("not a decimal integer")]
    Decimal,

    #[error("value does not fit in 248 bits")]
    OutOfRange,
}

impl Commitment {
    fn from_digest(digest: [u8; 32]) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..COMMITMENT_VALUE_BYTES].copy_from_slice(&digest[..COMMITMENT_VALUE_BYTES]);
        Self(bytes)
    }

    fn from_value(value: &BigUint) -> Result<Self, CommitmentParseError> {
        let le = value.to_bytes_le();
        if le.len() > COMMITMENT_VALUE_BYTES {
            return Err(CommitmentParseError::OutOfRange);
        }
        let mut bytes = [0u8; 32];
        bytes[..le.len()].copy_from_slice(&le);
        Ok(Self(bytes))
    }

    /// Commitment for a table definition
    pub fn for_table(table: &Table) -> Self {
        commit_to_table(&table.column_names())
    }

    /// Little-endian scalar bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Integer value of the commitment
    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_le(&self.0)
    }

    /// Decimal form, as used for circuit public inputs
    pub fn to_decimal(&self) -> String {
        self.to_biguint().to_str_radix(10)
    }

    /// Parse the decimal form
    pub fn from_decimal(s: &str) -> Result<Self, CommitmentParseError> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CommitmentParseError::Decimal);
        }
        let value = BigUint::parse_bytes(s.as_bytes(), 10).ok_or(CommitmentParseError::Decimal)?;
        Self::from_value(&value)
    }

    /// 0x-prefixed big-endian hex form
    pub fn to_hex(&self) -> String {
        let mut be = self.0;
        be.reverse();
        format!("0x{}", hex::encode(be))
    }

    /// Parse the hex form (the 0x prefix is optional)
    pub fn from_hex(s: &str) -> Result<Self, CommitmentParseError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let be = hex::decode(digits)?;
        if be.len() != 32 {
            return Err(CommitmentParseError::Length(be.len()));
        }
        Self::from_value(&BigUint::from_bytes_be(&be))
    }
}

/// Commit to an ordered list of column names
///
/// Deterministic and pure. Order matters: a permutation of the same names
/// gives a different commitment. An empty list is accepted and yields a fixed
/// commitment; minimum-column rules are enforced by table validation.
///
/// # Example
/// ```
/// use zksql_node::commitment::commit_to_table;
///
/// let a = commit_to_table(&["id", "name"]);
/// let b = commit_to_table(&["name", "id"]);
/// assert_ne!(a, b);
/// assert_eq!(a, commit_to_table(&["id".to_string(), "name".to_string()]));
/// ```
pub fn commit_to_table<S: AsRef<str>>(column_names: &[S]) -> Commitment {
    let items: Vec<&[u8]> = column_names.iter().map(|n| n.as_ref().as_bytes()).collect();
    Commitment::from_digest(HashUtils::sha256_framed(TABLE_COMMITMENT_DOMAIN, &items))
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", self.to_hex())
    }
}

impl FromStr for Commitment {
    type Err = CommitmentParseError;

    /// Accepts either the 0x-prefixed hex form or the decimal form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("0x") {
            Self::from_hex(s)
        } else {
            Self::from_decimal(s)
        }
    }
}

impl Serialize for Commitment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Commitment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
