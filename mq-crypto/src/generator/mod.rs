//! The capability contract every polynomial system generator implements.

use crate::errors::MQCryptoError;
use crate::field::{Block, Element};
use crate::ring::{PolynomialRing, TermOrder, Variable};
use crate::sbox::SBox;
use crate::system::{PolynomialSystem, SolutionMap};

use rand::RngCore;

use serde::{Deserialize, Serialize};

use std::fmt;
use std::sync::Arc;

/// A format template for indexed variable names: a role prefix followed by a
/// zero-padded round index and position index, e.g. `k%02d%02d` producing
/// `k0003` for round 0, position 3.
///
/// With fixed widths and in-range indices the produced names have fixed
/// length per role, so distinct (round, position) pairs never collide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarFormat {
    prefix: String,
    round_width: usize,
    index_width: usize,
}

impl VarFormat {
    pub fn try_with(
        prefix: &str,
        round_width: usize,
        index_width: usize,
    ) -> Result<Self, MQCryptoError> {
        if prefix.is_empty() {
            return Err(MQCryptoError::InvalidParameters(
                "Variable prefix must not be empty".to_string(),
            ));
        }
        if round_width == 0 || index_width == 0 {
            return Err(MQCryptoError::InvalidParameters(
                "Index widths must be at least 1 digit".to_string(),
            ));
        }

        Ok(VarFormat {
            prefix: prefix.to_string(),
            round_width,
            index_width,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The variable name for one (round, position) pair.
    pub fn name(&self, round: usize, index: usize) -> String {
        let round = format!("{:0width$}", round, width = self.round_width);
        let index = format!("{:0width$}", index, width = self.index_width);
        format!("{}{}{}", self.prefix, round, index)
    }

    /// The ordered names for positions `0..count` of one round.
    pub fn names(&self, round: usize, count: usize) -> Vec<String> {
        (0..count).map(|index| self.name(round, index)).collect()
    }
}

impl fmt::Display for VarFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}%0{}d%0{}d",
            self.prefix, self.round_width, self.index_width
        )
    }
}

fn not_implemented(capability: &'static str) -> MQCryptoError {
    MQCryptoError::NotImplemented { capability }
}

/// Contract for generators of polynomial systems.
///
/// Given a block-cipher-like primitive, an implementation produces systems
/// of multivariate polynomial equations over a finite field whose solutions
/// are exactly the valid (plaintext, key, ciphertext) relations of the
/// primitive, ready for a Groebner-basis or SAT back end.
///
/// Every operation has a default body failing with
/// [`MQCryptoError::NotImplemented`], so a caller can always tell a missing
/// capability apart from a domain error. `vars` has a real default built on
/// `ring` and `var_names`.
pub trait PolynomialSystemGenerator {
    /// The polynomial ring the generated systems are expressed over.
    ///
    /// Deterministic and cached: repeated calls return the identical ring
    /// instance.
    fn ring(&self) -> Result<Arc<PolynomialRing>, MQCryptoError> {
        Err(not_implemented("ring"))
    }

    /// The S-box of the primitive, set at construction.
    fn sbox(&self) -> Result<&SBox, MQCryptoError> {
        Err(not_implemented("sbox"))
    }

    /// The name template for the given variable role.
    fn var_format(&self, name: &str) -> Result<VarFormat, MQCryptoError> {
        let _ = name;
        Err(not_implemented("var_format"))
    }

    /// The ordered variable names of one role for one round.
    fn var_names(&self, name: &str, round: usize) -> Result<Vec<String>, MQCryptoError> {
        let _ = (name, round);
        Err(not_implemented("var_names"))
    }

    /// The ring variables of one role for one round.
    fn vars(&self, name: &str, round: usize) -> Result<Vec<Variable>, MQCryptoError> {
        let ring = self.ring()?;
        self.var_names(name, round)?
            .iter()
            .map(|var_name| ring.var_by_name(var_name))
            .collect()
    }

    /// A block term ordering eliminating round variables before key
    /// variables.
    fn block_order(&self) -> Result<TermOrder, MQCryptoError> {
        Err(not_implemented("block_order"))
    }

    /// Encrypts `plaintext` under `key`; both must have the configured
    /// block length.
    fn encrypt(&self, plaintext: &[Element], key: &[Element]) -> Result<Block, MQCryptoError> {
        let _ = (plaintext, key);
        Err(not_implemented("encrypt"))
    }

    /// Builds the polynomial system for this primitive together with a map
    /// of the key variables whose values are known.
    ///
    /// Supplied plaintext/key values are substituted into the system; with
    /// both supplied the ciphertext is computed and substituted as well.
    /// With no arguments the system is fully symbolic and the map is empty.
    fn polynomial_system(
        &self,
        plaintext: Option<&[Element]>,
        key: Option<&[Element]>,
    ) -> Result<(PolynomialSystem, SolutionMap), MQCryptoError> {
        let _ = (plaintext, key);
        Err(not_implemented("polynomial_system"))
    }

    /// A uniformly random block of field elements; for sampling and tests,
    /// not for key material.
    fn random_element(&self, rng: &mut dyn RngCore) -> Result<Block, MQCryptoError> {
        let _ = rng;
        Err(not_implemented("random_element"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::PrimeField;

    struct Bare;

    impl PolynomialSystemGenerator for Bare {}

    #[test]
    fn test_var_format_names() -> Result<(), MQCryptoError> {
        let format = VarFormat::try_with("k", 2, 2)?;
        assert_eq!(format.name(0, 3), "k0003");
        assert_eq!(format.name(12, 7), "k1207");
        assert_eq!(format.names(1, 3), vec!["k0100", "k0101", "k0102"]);
        assert_eq!(format.to_string(), "k%02d%02d");

        assert!(VarFormat::try_with("", 2, 2).is_err());
        assert!(VarFormat::try_with("k", 0, 2).is_err());
        Ok(())
    }

    #[test]
    fn test_defaults_signal_not_implemented() {
        let bare = Bare;
        for (result, capability) in [
            (bare.ring().map(|_| ()), "ring"),
            (bare.sbox().map(|_| ()), "sbox"),
            (bare.var_format("key").map(|_| ()), "var_format"),
            (bare.block_order().map(|_| ()), "block_order"),
            (bare.encrypt(&[], &[]).map(|_| ()), "encrypt"),
            (bare.polynomial_system(None, None).map(|_| ()), "polynomial_system"),
        ] {
            match result {
                Err(MQCryptoError::NotImplemented { capability: c }) => {
                    assert_eq!(c, capability)
                }
                other => panic!("expected NotImplemented for {}, got {:?}", capability, other),
            }
        }

        // vars fails through its ring dependency, still as NotImplemented
        assert!(matches!(
            bare.vars("key", 0),
            Err(MQCryptoError::NotImplemented { capability: "ring" })
        ));
    }

    struct NamesOnly {
        ring: Arc<PolynomialRing>,
    }

    impl PolynomialSystemGenerator for NamesOnly {
        fn ring(&self) -> Result<Arc<PolynomialRing>, MQCryptoError> {
            Ok(self.ring.clone())
        }

        fn var_names(&self, name: &str, round: usize) -> Result<Vec<String>, MQCryptoError> {
            if name != "key" {
                return Err(MQCryptoError::UnknownRole(name.to_string()));
            }
            Ok(VarFormat::try_with("k", 2, 2)?.names(round, 2))
        }
    }

    #[test]
    fn test_default_vars_resolves_in_ring() -> Result<(), MQCryptoError> {
        let ring = Arc::new(PolynomialRing::try_with(
            PrimeField::try_with(2)?,
            vec!["k0000".to_string(), "k0001".to_string()],
            TermOrder::degrevlex(2),
        )?);
        let generator = NamesOnly { ring: ring.clone() };

        let vars = generator.vars("key", 0)?;
        assert_eq!(vars.len(), 2);
        assert!(vars.iter().all(|v| ring.contains(*v)));

        // unknown roles surface as UnknownRole, not NotImplemented
        assert!(matches!(
            generator.vars("tweak", 0),
            Err(MQCryptoError::UnknownRole(_))
        ));
        Ok(())
    }
}
