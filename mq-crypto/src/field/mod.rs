//! Prime-field arithmetic for the coefficients of generated systems.

pub mod helper;

pub use helper::{extended_gcd, gcd, is_prime};

use crate::errors::MQCryptoError;

use serde::{Deserialize, Serialize};

/// A single field element, normalized into `[0, order)`.
pub type Element = i64;
/// A fixed-length block of field elements (plaintext, key or ciphertext).
pub type Block = Vec<Element>;

/// Represents a prime field GF(p) using modular arithmetic.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PrimeField {
    order: u64,
}

impl PrimeField {
    /// Create a new PrimeField with the given order.
    ///
    /// The order must be a prime number.
    pub fn try_with(order: u64) -> Result<Self, MQCryptoError> {
        if !is_prime(order) {
            return Err(MQCryptoError::InvalidFieldOrder(format!(
                "Field order must be prime, got {}",
                order
            )));
        }

        Ok(PrimeField { order })
    }

    /// Returns the order of the field.
    ///
    /// # Example
    ///
    /// ```
    /// # use mq_crypto::field::PrimeField;
    /// let field = PrimeField::try_with(13).unwrap();
    /// assert_eq!(field.order(), 13);
    /// ```
    pub fn order(&self) -> u64 {
        self.order
    }

    /// Normalizes a value to be within the range `[0, order - 1]`.
    ///
    /// Handles negative values correctly by adding the order.
    ///
    /// # Example
    ///
    /// ```
    /// # use mq_crypto::field::PrimeField;
    /// let field = PrimeField::try_with(7).unwrap();
    /// assert_eq!(field.normalize(9), 2);
    /// assert_eq!(field.normalize(-3), 4);
    /// assert_eq!(field.normalize(7), 0);
    /// ```
    pub fn normalize(&self, value: i64) -> Element {
        let p = self.order as i64;

        let rem = value % p;
        if rem < 0 {
            return rem + p;
        }

        rem
    }

    /// Whether `value` already is a normalized element of this field.
    pub fn contains(&self, value: Element) -> bool {
        value >= 0 && (value as u64) < self.order
    }

    /// Computes `(a + b) mod order`.
    ///
    /// # Example
    ///
    /// ```
    /// # use mq_crypto::field::PrimeField;
    /// let field = PrimeField::try_with(7).unwrap();
    /// assert_eq!(field.add(5, 4), 2);
    /// assert_eq!(field.add(-2, 5), 3);
    /// ```
    pub fn add(&self, a: Element, b: Element) -> Element {
        let a_norm = self.normalize(a);
        let b_norm = self.normalize(b);

        self.normalize(a_norm.wrapping_add(b_norm))
    }

    /// Computes `(a - b) mod order`.
    ///
    /// # Example
    ///
    /// ```
    /// # use mq_crypto::field::PrimeField;
    /// let field = PrimeField::try_with(7).unwrap();
    /// assert_eq!(field.sub(5, 4), 1);
    /// assert_eq!(field.sub(2, 5), 4);
    /// ```
    pub fn sub(&self, a: Element, b: Element) -> Element {
        let a_norm = self.normalize(a);
        let b_norm = self.normalize(b);

        self.normalize(a_norm.wrapping_sub(b_norm))
    }

    /// Computes `(a * b) mod order`.
    ///
    /// Uses `i128` internally to prevent overflow before the modulo operation.
    ///
    /// # Example
    ///
    /// ```
    /// # use mq_crypto::field::PrimeField;
    /// let field = PrimeField::try_with(7).unwrap();
    /// assert_eq!(field.mul(5, 4), 6); // 20 mod 7 = 6
    /// assert_eq!(field.mul(-2, 6), 2); // -12 mod 7 = 2
    /// ```
    pub fn mul(&self, a: Element, b: Element) -> Element {
        let a_norm = self.normalize(a);
        let b_norm = self.normalize(b);

        let result = (a_norm as i128 * b_norm as i128) % (self.order as i128);

        self.normalize(result as i64)
    }

    /// Computes the additive inverse `-a mod order`.
    ///
    /// # Example
    ///
    /// ```
    /// # use mq_crypto::field::PrimeField;
    /// let field = PrimeField::try_with(7).unwrap();
    /// assert_eq!(field.neg(3), 4);
    /// assert_eq!(field.neg(0), 0);
    /// ```
    pub fn neg(&self, a: Element) -> Element {
        self.sub(0, a)
    }

    /// Computes the multiplicative inverse `a^-1 mod order`.
    ///
    /// Every non-zero element of a prime field is invertible; only 0 fails.
    ///
    /// # Example
    ///
    /// ```
    /// # use mq_crypto::field::PrimeField;
    /// let field = PrimeField::try_with(7).unwrap();
    /// assert_eq!(field.inv(3).unwrap(), 5); // 3 * 5 = 15 = 1 mod 7
    /// assert!(field.inv(0).is_err());
    /// ```
    pub fn inv(&self, a: Element) -> Result<Element, MQCryptoError> {
        let a_norm = self.normalize(a);
        if a_norm == 0 {
            return Err(MQCryptoError::NoInverse(format!(
                "Cannot invert 0 in GF({})",
                self.order
            )));
        }

        let (g, x, _) = extended_gcd(a_norm, self.order as i64);
        if g != 1 {
            return Err(MQCryptoError::InternalError(format!(
                "gcd({}, {}) != 1 in a prime field",
                a_norm, self.order
            )));
        }

        Ok(self.normalize(x))
    }

    /// Computes `base^exp mod order` by square-and-multiply.
    ///
    /// # Example
    ///
    /// ```
    /// # use mq_crypto::field::PrimeField;
    /// let field = PrimeField::try_with(7).unwrap();
    /// assert_eq!(field.pow(3, 0), 1);
    /// assert_eq!(field.pow(3, 4), 4); // 81 mod 7 = 4
    /// ```
    pub fn pow(&self, base: Element, exp: u32) -> Element {
        let mut result = 1;
        let mut acc = self.normalize(base);
        let mut e = exp;

        while e > 0 {
            if e & 1 == 1 {
                result = self.mul(result, acc);
            }
            acc = self.mul(acc, acc);
            e >>= 1;
        }

        result
    }
}
