//! Substitution boxes and their algebraic relations.

use crate::errors::MQCryptoError;
use crate::ring::{Monomial, Polynomial, PolynomialRing, Variable};

use serde::{Deserialize, Serialize};

/// A substitution box: a lookup table from `bits_in`-bit words to
/// `bits_out`-bit words.
///
/// Bit `i` of a word corresponds to variable index `i` in the algebraic
/// view, least significant bit first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SBox {
    bits_in: usize,
    bits_out: usize,
    lookup: Vec<u64>,
}

impl SBox {
    /// Creates an S-box from its lookup table.
    ///
    /// The table must have exactly `2^bits_in` entries, each below
    /// `2^bits_out`.
    pub fn try_with(
        lookup: Vec<u64>,
        bits_in: usize,
        bits_out: usize,
    ) -> Result<Self, MQCryptoError> {
        if bits_in == 0 || bits_in > 16 || bits_out == 0 || bits_out > 16 {
            return Err(MQCryptoError::InvalidSBox(format!(
                "S-box widths must be between 1 and 16 bits, got {} -> {}",
                bits_in, bits_out
            )));
        }
        if lookup.len() != 1 << bits_in {
            return Err(MQCryptoError::InvalidSBox(format!(
                "Lookup table must have {} entries for {} input bits, got {}",
                1usize << bits_in,
                bits_in,
                lookup.len()
            )));
        }
        if let Some(&entry) = lookup.iter().find(|&&entry| entry >= 1 << bits_out) {
            return Err(MQCryptoError::InvalidSBox(format!(
                "Entry {} does not fit into {} output bits",
                entry, bits_out
            )));
        }

        Ok(SBox {
            bits_in,
            bits_out,
            lookup,
        })
    }

    pub fn bits_in(&self) -> usize {
        self.bits_in
    }

    pub fn bits_out(&self) -> usize {
        self.bits_out
    }

    pub fn lookup(&self) -> &[u64] {
        &self.lookup
    }

    /// Applies the S-box; input bits beyond `bits_in` are ignored.
    pub fn apply(&self, x: u64) -> u64 {
        self.lookup[(x as usize) & ((1 << self.bits_in) - 1)]
    }

    /// Whether the S-box is a bijection on its input space.
    pub fn is_permutation(&self) -> bool {
        if self.bits_in != self.bits_out {
            return false;
        }

        let mut seen = vec![false; self.lookup.len()];
        for &entry in &self.lookup {
            seen[entry as usize] = true;
        }
        seen.into_iter().all(|hit| hit)
    }

    /// Algebraic normal form of output bit `bit` as a coefficient table:
    /// `coeffs[u]` is the GF(2) coefficient of the monomial over the input
    /// bits set in `u`.
    ///
    /// Computed by the Moebius transform of the bit's truth table.
    pub fn anf(&self, bit: usize) -> Result<Vec<bool>, MQCryptoError> {
        if bit >= self.bits_out {
            return Err(MQCryptoError::InvalidParameters(format!(
                "S-box has {} output bits, requested bit {}",
                self.bits_out, bit
            )));
        }

        let size = self.lookup.len();
        let mut coeffs: Vec<bool> = self.lookup.iter().map(|&y| (y >> bit) & 1 == 1).collect();

        let mut step = 1;
        while step < size {
            for x in 0..size {
                if x & step != 0 {
                    let below = coeffs[x ^ step];
                    coeffs[x] ^= below;
                }
            }
            step <<= 1;
        }

        Ok(coeffs)
    }

    /// The algebraic relations of this S-box over a GF(2) polynomial ring:
    /// for each output bit `j` the polynomial `outputs[j] + ANF_j(inputs)`,
    /// which vanishes exactly on the graph of the S-box.
    pub fn polynomials(
        &self,
        ring: &PolynomialRing,
        inputs: &[Variable],
        outputs: &[Variable],
    ) -> Result<Vec<Polynomial>, MQCryptoError> {
        if ring.field().order() != 2 {
            return Err(MQCryptoError::InvalidParameters(format!(
                "S-box relations are expressed over GF(2), not GF({})",
                ring.field().order()
            )));
        }
        if inputs.len() != self.bits_in || outputs.len() != self.bits_out {
            return Err(MQCryptoError::LengthMismatch(format!(
                "S-box is {} -> {} bits but got {} input and {} output variables",
                self.bits_in,
                self.bits_out,
                inputs.len(),
                outputs.len()
            )));
        }
        for &var in inputs.iter().chain(outputs.iter()) {
            ring.name_of(var)?;
        }

        let field = ring.field();
        let width = ring.nvars();

        let mut relations = Vec::with_capacity(self.bits_out);
        for (j, &output) in outputs.iter().enumerate() {
            let mut poly = ring.polynomial_of(output)?;
            for (u, &present) in self.anf(j)?.iter().enumerate() {
                if !present {
                    continue;
                }
                let mut exponents = vec![0u32; width];
                for (i, &input) in inputs.iter().enumerate() {
                    if u & (1 << i) != 0 {
                        exponents[input.index()] = 1;
                    }
                }
                poly.add_term(Monomial::from_exponents(exponents, 2), 1, field);
            }
            relations.push(poly);
        }

        Ok(relations)
    }
}
