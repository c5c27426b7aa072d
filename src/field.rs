//! Field arithmetic utilities
//!
//! Circuit public inputs live in the BN254 scalar field.
//! This module converts between field elements and arbitrary-precision
//! unsigned integers and exposes the field modulus used to decide whether a
//! public input has a canonical encoding.

use ff::{Field as _, PrimeField};
use halo2curves::bn256::Fr as Field;
use num_bigint::BigUint;
use std::sync::OnceLock;

/// Field element utilities
///
/// Provides static methods for the field conversions used by the public-input
/// canonicalizer.
pub struct FieldUtils;

impl FieldUtils {
    /// Convert field element to its integer value
    ///
    /// The representation of BN254 scalars is little-endian.
    ///
    /// # Example
    /// ```
    /// use zksql_node::field::FieldUtils;
    /// use num_bigint::BigUint;
    ///
    /// let field = FieldUtils::from_biguint(&BigUint::from(42u32)).unwrap();
    /// assert_eq!(FieldUtils::to_biguint(&field), BigUint::from(42u32));
    /// ```
    pub fn to_biguint(field: &Field) -> BigUint {
        BigUint::from_bytes_le(field.to_repr().as_ref())
    }

    /// Convert an integer to a field element
    ///
    /// Returns `None` if the value is not strictly below the field modulus,
    /// i.e. it has no canonical field representation.
    pub fn from_biguint(value: &BigUint) -> Option<Field> {
        if value >= Self::modulus() {
            return None;
        }

        let bytes = value.to_bytes_le();
        let mut repr = <Field as PrimeField>::Repr::default();
        let slot = repr.as_mut();
        if bytes.len() > slot.len() {
            return None;
        }
        slot[..bytes.len()].copy_from_slice(&bytes);

        Option::from(Field::from_repr(repr))
    }

    /// BN254 scalar field modulus `r`
    pub fn modulus() -> &'static BigUint {
        static MODULUS: OnceLock<BigUint> = OnceLock::new();
        MODULUS.get_or_init(|| Self::to_biguint(&-Field::ONE) + 1u32)
    }

    /// Number of decimal digits of the modulus
    ///
    /// Any canonical field element fits in this many digits, which lets the
    /// canonicalizer reject oversized literals before parsing them.
    pub fn modulus_decimal_digits() -> usize {
        static DIGITS: OnceLock<usize> = OnceLock::new();
        *DIGITS.get_or_init(|| Self::modulus().to_str_radix(10).len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modulus() {
        let expected = BigUint::parse_bytes(
            b"30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001",
            16,
        )
        .unwrap();
        assert_eq!(FieldUtils::modulus(), &expected);
        assert_eq!(FieldUtils::modulus_decimal_digits(), 77);
    }

    #[test]
    fn test_biguint_conversion() {
        let value = BigUint::from(123_456_789u64);
        let field = FieldUtils::from_biguint(&value).unwrap();
        assert_eq!(field, Field::from(123_456_789u64));
        assert_eq!(FieldUtils::to_biguint(&field), value);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let modulus = FieldUtils::modulus().clone();
        assert!(FieldUtils::from_biguint(&modulus).is_none());
        assert!(FieldUtils::from_biguint(&(modulus.clone() + 1u32)).is_none());

        let max = modulus - 1u32;
        let field = FieldUtils::from_biguint(&max).unwrap();
        assert_eq!(field, -Field::ONE);
    }
}
