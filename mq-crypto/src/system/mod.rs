//! Polynomial systems: the output of a generator.

use crate::errors::MQCryptoError;
use crate::field::Element;
use crate::ring::{Polynomial, PolynomialRing, Variable};

use serde::{Deserialize, Serialize};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Maps key-variable names to their known values when a system was built
/// with (part of) the key fixed.
pub type SolutionMap = BTreeMap<String, Element>;

/// An ordered collection of polynomial equations (each understood as
/// `p = 0`) together with the ring they are expressed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolynomialSystem {
    ring: Arc<PolynomialRing>,
    equations: Vec<Polynomial>,
}

impl PolynomialSystem {
    /// Bundles equations with their ring, checking that every equation is
    /// expressed over the ring's variables.
    pub fn try_with(
        ring: Arc<PolynomialRing>,
        equations: Vec<Polynomial>,
    ) -> Result<Self, MQCryptoError> {
        for (i, equation) in equations.iter().enumerate() {
            for monomial in equation.terms().keys() {
                if monomial.width() != ring.nvars() {
                    return Err(MQCryptoError::LengthMismatch(format!(
                        "Equation {} is expressed over {} variables but the ring has {}",
                        i,
                        monomial.width(),
                        ring.nvars()
                    )));
                }
            }
        }

        Ok(PolynomialSystem { ring, equations })
    }

    pub fn ring(&self) -> &Arc<PolynomialRing> {
        &self.ring
    }

    pub fn equations(&self) -> &[Polynomial] {
        &self.equations
    }

    pub fn len(&self) -> usize {
        self.equations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    /// The variables still occurring in the system, in ring order.
    pub fn variables(&self) -> Vec<Variable> {
        let mut indices = BTreeSet::new();
        for equation in &self.equations {
            indices.extend(equation.variables());
        }
        indices.into_iter().map(Variable).collect()
    }

    /// Plugs known values in for a subset of the ring's variables.
    ///
    /// An equation that collapses to a non-zero constant is kept; it makes
    /// the inconsistency of the instantiated system visible to consumers.
    pub fn substitute(
        &self,
        bindings: &BTreeMap<usize, Element>,
    ) -> Result<Self, MQCryptoError> {
        let field = self.ring.field();
        for (&index, &value) in bindings {
            if index >= self.ring.nvars() {
                return Err(MQCryptoError::UnknownVariable(format!("#{}", index)));
            }
            if !field.contains(value) {
                return Err(MQCryptoError::ElementOutOfRange {
                    element: value,
                    order: field.order(),
                });
            }
        }

        let equations = self
            .equations
            .iter()
            .map(|equation| equation.substitute(bindings, field))
            .collect();

        Ok(PolynomialSystem {
            ring: self.ring.clone(),
            equations,
        })
    }

    /// Whether a full assignment of the ring's variables zeroes every
    /// equation.
    pub fn is_satisfied_by(&self, assignment: &[Element]) -> Result<bool, MQCryptoError> {
        let field = self.ring.field();
        for equation in &self.equations {
            if equation.evaluate(assignment, field)? != 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn to_json(&self) -> Result<String, MQCryptoError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(data: &str) -> Result<Self, MQCryptoError> {
        Ok(serde_json::from_str(data)?)
    }
}

impl fmt::Display for PolynomialSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for equation in &self.equations {
            writeln!(f, "{}", self.ring.render(equation))?;
        }
        Ok(())
    }
}
