use crate::errors::MQCryptoError;
use crate::field::{Element, PrimeField};

use super::monomial::Monomial;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// A sparse multivariate polynomial: a term map from monomials to non-zero,
/// normalized coefficients.
///
/// Arithmetic takes the coefficient field as an explicit parameter, the same
/// way matrix and vector operations elsewhere in this crate take their ring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polynomial {
    #[serde(
        serialize_with = "serialize_terms",
        deserialize_with = "deserialize_terms"
    )]
    terms: BTreeMap<Monomial, Element>,
}

fn serialize_terms<S>(terms: &BTreeMap<Monomial, Element>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    // JSON maps need string keys, so the term map travels as a pair list.
    let pairs: Vec<(&Monomial, &Element)> = terms.iter().collect();
    pairs.serialize(serializer)
}

fn deserialize_terms<'de, D>(deserializer: D) -> Result<BTreeMap<Monomial, Element>, D::Error>
where
    D: Deserializer<'de>,
{
    let pairs = Vec::<(Monomial, Element)>::deserialize(deserializer)?;
    Ok(pairs.into_iter().collect())
}

impl Polynomial {
    /// The zero polynomial.
    pub fn zero() -> Self {
        Polynomial::default()
    }

    /// The constant polynomial `value` over `width` variables.
    pub fn constant(width: usize, value: Element, field: &PrimeField) -> Self {
        let mut poly = Polynomial::zero();
        poly.add_term(Monomial::constant(width), value, field);
        poly
    }

    /// The polynomial consisting of the single variable `index`.
    pub fn variable(width: usize, index: usize) -> Self {
        let mut terms = BTreeMap::new();
        terms.insert(Monomial::variable(width, index), 1);
        Polynomial { terms }
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &BTreeMap<Monomial, Element> {
        &self.terms
    }

    pub fn total_degree(&self) -> u32 {
        self.terms.keys().map(Monomial::total_degree).max().unwrap_or(0)
    }

    /// Indices of the variables appearing with a non-zero exponent.
    pub fn variables(&self) -> BTreeSet<usize> {
        let mut set = BTreeSet::new();
        for monomial in self.terms.keys() {
            for (i, &e) in monomial.exponents().iter().enumerate() {
                if e > 0 {
                    set.insert(i);
                }
            }
        }
        set
    }

    /// Adds `coeff * monomial` in place, dropping the term if it cancels.
    pub fn add_term(&mut self, monomial: Monomial, coeff: Element, field: &PrimeField) {
        let coeff = field.normalize(coeff);
        if coeff == 0 {
            return;
        }

        match self.terms.entry(monomial) {
            Entry::Vacant(slot) => {
                slot.insert(coeff);
            }
            Entry::Occupied(mut slot) => {
                let sum = field.add(*slot.get(), coeff);
                if sum == 0 {
                    slot.remove();
                } else {
                    *slot.get_mut() = sum;
                }
            }
        }
    }

    pub fn add(&self, rhs: &Self, field: &PrimeField) -> Self {
        let mut out = self.clone();
        for (monomial, &coeff) in &rhs.terms {
            out.add_term(monomial.clone(), coeff, field);
        }
        out
    }

    pub fn sub(&self, rhs: &Self, field: &PrimeField) -> Self {
        let mut out = self.clone();
        for (monomial, &coeff) in &rhs.terms {
            out.add_term(monomial.clone(), field.neg(coeff), field);
        }
        out
    }

    pub fn neg(&self, field: &PrimeField) -> Self {
        self.scale(field.neg(1), field)
    }

    pub fn scale(&self, factor: Element, field: &PrimeField) -> Self {
        let mut out = Polynomial::zero();
        for (monomial, &coeff) in &self.terms {
            out.add_term(monomial.clone(), field.mul(coeff, factor), field);
        }
        out
    }

    pub fn mul(&self, rhs: &Self, field: &PrimeField) -> Self {
        let mut out = Polynomial::zero();
        for (ma, &ca) in &self.terms {
            for (mb, &cb) in &rhs.terms {
                out.add_term(ma.mul(mb, field.order()), field.mul(ca, cb), field);
            }
        }
        out
    }

    /// Evaluates the polynomial at a full assignment of the ring's variables.
    pub fn evaluate(
        &self,
        assignment: &[Element],
        field: &PrimeField,
    ) -> Result<Element, MQCryptoError> {
        let mut acc = 0;
        for (monomial, &coeff) in &self.terms {
            if monomial.width() != assignment.len() {
                return Err(MQCryptoError::LengthMismatch(format!(
                    "Assignment length ({}) must match variable count ({})",
                    assignment.len(),
                    monomial.width()
                )));
            }

            let mut term = coeff;
            for (i, &e) in monomial.exponents().iter().enumerate() {
                if e > 0 {
                    term = field.mul(term, field.pow(assignment[i], e));
                }
            }
            acc = field.add(acc, term);
        }

        Ok(acc)
    }

    /// Plugs known values in for a subset of the variables, returning the
    /// polynomial in the remaining ones (still expressed over the full
    /// variable set, with the bound variables no longer occurring).
    pub fn substitute(&self, bindings: &BTreeMap<usize, Element>, field: &PrimeField) -> Self {
        let mut out = Polynomial::zero();
        for (monomial, &coeff) in &self.terms {
            let mut coeff = coeff;
            let mut exponents = monomial.exponents().to_vec();
            for (&index, &value) in bindings {
                if index < exponents.len() && exponents[index] > 0 {
                    coeff = field.mul(coeff, field.pow(value, exponents[index]));
                    exponents[index] = 0;
                }
            }
            out.add_term(
                Monomial::from_exponents(exponents, field.order()),
                coeff,
                field,
            );
        }
        out
    }
}
