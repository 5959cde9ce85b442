//! # Polynomial Ring Module
//!
//! Provides the [`PolynomialRing`] struct: a multivariate polynomial ring
//! over a prime field with named variables and a block term ordering, the
//! setting in which polynomial system generators express their equations.

pub mod monomial;
pub mod polynomial;

pub use monomial::{Monomial, MonomialOrder, TermBlock, TermOrder};
pub use polynomial::Polynomial;

use crate::errors::MQCryptoError;
use crate::field::{Element, PrimeField};

use itertools::Itertools;

use serde::{Deserialize, Serialize};

/// A handle to one variable of a [`PolynomialRing`].
///
/// Handles are only minted by ring methods, so a handle with an in-range
/// index always refers to a variable of the ring that produced it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Variable(pub(crate) usize);

impl Variable {
    /// Position of this variable in the ring's variable list.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A multivariate polynomial ring GF(p)[x_1, ..., x_n] with a term ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolynomialRing {
    field: PrimeField,
    variables: Vec<String>,
    order: TermOrder,
}

impl PolynomialRing {
    /// Creates a ring over `field` with the given variable names and term
    /// ordering.
    ///
    /// Names must be unique and the ordering must cover exactly the given
    /// variables.
    pub fn try_with(
        field: PrimeField,
        variables: Vec<String>,
        order: TermOrder,
    ) -> Result<Self, MQCryptoError> {
        if variables.is_empty() {
            return Err(MQCryptoError::InvalidParameters(
                "A polynomial ring needs at least one variable".to_string(),
            ));
        }

        let duplicates: Vec<&String> = variables.iter().duplicates().collect();
        if !duplicates.is_empty() {
            return Err(MQCryptoError::InvalidParameters(format!(
                "Duplicate variable names: {:?}",
                duplicates
            )));
        }

        if order.width() != variables.len() {
            return Err(MQCryptoError::LengthMismatch(format!(
                "Term ordering covers {} variables but the ring has {}",
                order.width(),
                variables.len()
            )));
        }

        Ok(PolynomialRing {
            field,
            variables,
            order,
        })
    }

    pub fn field(&self) -> &PrimeField {
        &self.field
    }

    pub fn order(&self) -> &TermOrder {
        &self.order
    }

    pub fn nvars(&self) -> usize {
        self.variables.len()
    }

    pub fn variable_names(&self) -> &[String] {
        &self.variables
    }

    /// Whether `var` is a variable of this ring.
    pub fn contains(&self, var: Variable) -> bool {
        var.index() < self.variables.len()
    }

    /// Handle for the variable at `index`.
    pub fn var(&self, index: usize) -> Result<Variable, MQCryptoError> {
        if index >= self.variables.len() {
            return Err(MQCryptoError::UnknownVariable(format!("#{}", index)));
        }
        Ok(Variable(index))
    }

    /// Handle for the variable named `name`.
    pub fn var_by_name(&self, name: &str) -> Result<Variable, MQCryptoError> {
        self.variables
            .iter()
            .position(|n| n == name)
            .map(Variable)
            .ok_or_else(|| MQCryptoError::UnknownVariable(name.to_string()))
    }

    pub fn name_of(&self, var: Variable) -> Result<&str, MQCryptoError> {
        if !self.contains(var) {
            return Err(MQCryptoError::UnknownVariable(format!("#{}", var.index())));
        }
        Ok(&self.variables[var.index()])
    }

    /// The variable `var` as a polynomial of this ring.
    pub fn polynomial_of(&self, var: Variable) -> Result<Polynomial, MQCryptoError> {
        if !self.contains(var) {
            return Err(MQCryptoError::UnknownVariable(format!("#{}", var.index())));
        }
        Ok(Polynomial::variable(self.nvars(), var.index()))
    }

    /// The constant polynomial `value` of this ring.
    pub fn constant(&self, value: Element) -> Polynomial {
        Polynomial::constant(self.nvars(), value, &self.field)
    }

    /// Renders a polynomial with this ring's variable names, terms sorted
    /// descending by the ring's term ordering.
    pub fn render(&self, poly: &Polynomial) -> String {
        if poly.is_zero() {
            return "0".to_string();
        }

        let mut terms: Vec<(&Monomial, &Element)> = poly.terms().iter().collect();
        terms.sort_by(|a, b| self.order.compare(b.0, a.0));

        terms
            .into_iter()
            .map(|(monomial, &coeff)| self.render_term(monomial, coeff))
            .join(" + ")
    }

    fn render_term(&self, monomial: &Monomial, coeff: Element) -> String {
        if monomial.is_constant() {
            return coeff.to_string();
        }

        let factors = monomial
            .exponents()
            .iter()
            .enumerate()
            .filter(|&(_, &e)| e > 0)
            .map(|(i, &e)| {
                if e == 1 {
                    self.variables[i].clone()
                } else {
                    format!("{}^{}", self.variables[i], e)
                }
            })
            .join("*");

        if coeff == 1 {
            factors
        } else {
            format!("{}*{}", coeff, factors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_ring() -> PolynomialRing {
        PolynomialRing::try_with(
            PrimeField::try_with(2).unwrap(),
            vec!["x".to_string(), "y".to_string(), "z".to_string()],
            TermOrder::degrevlex(3),
        )
        .unwrap()
    }

    #[test]
    fn test_ring_creation() {
        assert!(
            PolynomialRing::try_with(
                PrimeField::try_with(2).unwrap(),
                vec!["x".to_string(), "x".to_string()],
                TermOrder::degrevlex(2),
            )
            .is_err()
        );
        assert!(
            PolynomialRing::try_with(
                PrimeField::try_with(2).unwrap(),
                vec!["x".to_string()],
                TermOrder::degrevlex(2),
            )
            .is_err()
        );
        assert_eq!(toy_ring().nvars(), 3);
    }

    #[test]
    fn test_variable_lookup() -> Result<(), MQCryptoError> {
        let ring = toy_ring();
        let y = ring.var_by_name("y")?;
        assert_eq!(y.index(), 1);
        assert_eq!(ring.name_of(y)?, "y");
        assert!(ring.contains(y));
        assert!(ring.var_by_name("w").is_err());
        assert!(ring.var(3).is_err());
        Ok(())
    }

    #[test]
    fn test_render() -> Result<(), MQCryptoError> {
        let ring = toy_ring();
        let field = *ring.field();
        let x = ring.polynomial_of(ring.var_by_name("x")?)?;
        let y = ring.polynomial_of(ring.var_by_name("y")?)?;
        let z = ring.polynomial_of(ring.var_by_name("z")?)?;

        let poly = x
            .mul(&y, &field)
            .add(&z, &field)
            .add(&ring.constant(1), &field);
        assert_eq!(ring.render(&poly), "x*y + z + 1");
        assert_eq!(ring.render(&Polynomial::zero()), "0");
        Ok(())
    }

    #[test]
    fn test_render_exponents_and_coefficients() -> Result<(), MQCryptoError> {
        let ring = PolynomialRing::try_with(
            PrimeField::try_with(5).unwrap(),
            vec!["x".to_string(), "y".to_string()],
            TermOrder::degrevlex(2),
        )?;
        let field = *ring.field();
        let x = ring.polynomial_of(ring.var_by_name("x")?)?;

        let poly = x.mul(&x, &field).scale(3, &field);
        assert_eq!(ring.render(&poly), "3*x^2");
        Ok(())
    }
}
