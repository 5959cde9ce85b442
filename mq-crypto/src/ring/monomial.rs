use crate::errors::MQCryptoError;

use serde::{Deserialize, Serialize};

use std::cmp::Ordering;

/// An exponent vector over a ring's variables.
///
/// Exponents are kept reduced modulo the field ideal: in GF(p) every element
/// satisfies `x^p = x`, so a non-zero exponent `e` is stored as
/// `((e - 1) mod (p - 1)) + 1`. Over GF(2) monomials are therefore always
/// multilinear, and polynomial systems built from them are satisfiable
/// exactly over the base field without separate field equations.
///
/// The derived `Ord` is a plain lexicographic order on the exponent vector
/// and only fixes the internal storage order of terms; ranking monomials for
/// elimination purposes is the job of [`TermOrder`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Monomial {
    exponents: Vec<u32>,
}

fn reduce_exponent(e: u64, field_order: u64) -> u32 {
    if e == 0 {
        return 0;
    }

    // The multiplicative period p - 1 may not fit in u32; reduce in u64 so
    // exponents below the period pass through untouched for large fields.
    let period = (field_order - 1).max(1);
    (((e - 1) % period) + 1) as u32
}

impl Monomial {
    /// The constant monomial (all exponents zero) over `width` variables.
    pub fn constant(width: usize) -> Self {
        Monomial {
            exponents: vec![0; width],
        }
    }

    /// The monomial consisting of the single variable `index`.
    pub fn variable(width: usize, index: usize) -> Self {
        debug_assert!(index < width);

        let mut exponents = vec![0; width];
        exponents[index] = 1;
        Monomial { exponents }
    }

    /// Builds a monomial from raw exponents, reducing them modulo the field
    /// ideal of GF(`field_order`).
    pub fn from_exponents(exponents: Vec<u32>, field_order: u64) -> Self {
        Monomial {
            exponents: exponents
                .into_iter()
                .map(|e| reduce_exponent(u64::from(e), field_order))
                .collect(),
        }
    }

    /// Number of variables of the ring this monomial is expressed over.
    pub fn width(&self) -> usize {
        self.exponents.len()
    }

    pub fn exponents(&self) -> &[u32] {
        &self.exponents
    }

    pub fn is_constant(&self) -> bool {
        self.exponents.iter().all(|&e| e == 0)
    }

    pub fn total_degree(&self) -> u32 {
        self.exponents.iter().sum()
    }

    /// Product of two monomials over GF(`field_order`), exponents reduced.
    pub fn mul(&self, other: &Self, field_order: u64) -> Self {
        debug_assert_eq!(self.width(), other.width());

        Monomial {
            exponents: self
                .exponents
                .iter()
                .zip(other.exponents.iter())
                .map(|(&a, &b)| reduce_exponent(u64::from(a) + u64::from(b), field_order))
                .collect(),
        }
    }
}

/// Orders within a single variable block.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonomialOrder {
    /// Lexicographic: the first differing exponent decides.
    Lex,
    /// Degree reverse lexicographic: total degree first; on ties the
    /// monomial with the smaller exponent in the last differing position
    /// is the greater one.
    Degrevlex,
}

impl MonomialOrder {
    /// Compares two exponent slices of equal length.
    pub fn compare(&self, a: &[u32], b: &[u32]) -> Ordering {
        debug_assert_eq!(a.len(), b.len());

        match self {
            MonomialOrder::Lex => a.cmp(b),
            MonomialOrder::Degrevlex => {
                let deg_a: u32 = a.iter().sum();
                let deg_b: u32 = b.iter().sum();
                if deg_a != deg_b {
                    return deg_a.cmp(&deg_b);
                }

                for i in (0..a.len()).rev() {
                    if a[i] != b[i] {
                        return b[i].cmp(&a[i]);
                    }
                }

                Ordering::Equal
            }
        }
    }
}

/// One block of a block ordering: a run of `len` consecutive ring variables
/// compared with the given monomial order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermBlock {
    pub len: usize,
    pub order: MonomialOrder,
}

/// A block (elimination) term ordering over a ring's variables.
///
/// Monomials are compared block by block, earlier blocks being more
/// significant, so a Groebner basis computed for this ordering eliminates
/// the variables of earlier blocks first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermOrder {
    blocks: Vec<TermBlock>,
}

impl TermOrder {
    /// A single-block degrevlex ordering over `width` variables.
    pub fn degrevlex(width: usize) -> Self {
        TermOrder {
            blocks: vec![TermBlock {
                len: width,
                order: MonomialOrder::Degrevlex,
            }],
        }
    }

    /// Builds a block ordering from the given blocks.
    pub fn try_with(blocks: Vec<TermBlock>) -> Result<Self, MQCryptoError> {
        if blocks.is_empty() {
            return Err(MQCryptoError::InvalidParameters(
                "A term ordering needs at least one block".to_string(),
            ));
        }
        if blocks.iter().any(|b| b.len == 0) {
            return Err(MQCryptoError::InvalidParameters(
                "Term ordering blocks must not be empty".to_string(),
            ));
        }

        Ok(TermOrder { blocks })
    }

    /// Total number of variables covered by the blocks.
    pub fn width(&self) -> usize {
        self.blocks.iter().map(|b| b.len).sum()
    }

    pub fn blocks(&self) -> &[TermBlock] {
        &self.blocks
    }

    /// Compares two monomials of this ordering's width.
    pub fn compare(&self, a: &Monomial, b: &Monomial) -> Ordering {
        debug_assert_eq!(a.width(), self.width());
        debug_assert_eq!(b.width(), self.width());

        let mut offset = 0;
        for block in &self.blocks {
            let range = offset..offset + block.len;
            let ord = block
                .order
                .compare(&a.exponents()[range.clone()], &b.exponents()[range]);
            if ord != Ordering::Equal {
                return ord;
            }
            offset += block.len;
        }

        Ordering::Equal
    }
}
