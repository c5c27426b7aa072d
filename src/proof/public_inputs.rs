//! Public input canonicalization
//!
//! Public inputs arrive as decimal strings. Each one must be a plain
//! non-negative integer literal below the BN254 scalar modulus; anything else
//! is rejected before a backend ever sees it, so every field element has
//! exactly one accepted spelling.

use crate::error::{Error, Result};
use crate::field::FieldUtils;
use num_bigint::BigUint;
use std::fmt;

/// Canonical public inputs, in submission order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicInputs(Vec<BigUint>);

impl PublicInputs {
    /// Parse and canonicalize raw decimal inputs
    ///
    /// # Errors
    /// `InvalidPublicInput` naming the first offending position
    pub fn canonicalize<S: AsRef<str>>(raw: &[S]) -> Result<Self> {
        raw.iter()
            .enumerate()
            .map(|(index, value)| parse_input(index, value.as_ref()))
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// Canonical decimal strings (no sign, no leading zeros)
    pub fn to_decimal_strings(&self) -> Vec<String> {
        self.0.iter().map(BigUint::to_string).collect()
    }

    /// Number of inputs
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no inputs
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PublicInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.to_decimal_strings().join(", "))
    }
}

fn parse_input(index: usize, value: &str) -> Result<BigUint> {
    let invalid = |reason: &str| Error::InvalidPublicInput {
        index,
        value: value.to_string(),
        reason: reason.to_string(),
    };

    if value.is_empty() {
        return Err(invalid("empty value"));
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("not a non-negative decimal integer"));
    }
    // cheap bound before parsing arbitrarily long strings
    let significant = value.trim_start_matches('0');
    if significant.len() > FieldUtils::modulus_decimal_digits() {
        return Err(invalid("value exceeds the scalar field"));
    }

    let parsed = BigUint::parse_bytes(value.as_bytes(), 10)
        .ok_or_else(|| invalid("not a non-negative decimal integer"))?;
    if FieldUtils::from_biguint(&parsed).is_none() {
        return Err(invalid("value exceeds the scalar field"));
    }
    Ok(parsed)
}
