//! A toy substitution-permutation network over GF(2) and its polynomial
//! system generator.
//!
//! The cipher is PRESENT-shaped: each round XORs a round key into the
//! state, sends the state through a layer of parallel S-boxes and
//! interleaves the output bits; the last round additionally XORs in a
//! whitening key. The key schedule is linear (bit rotation plus a round
//! constant), so the generated systems contain one set of key variables
//! for the master key and the round keys appear as linear polynomials.
//!
//! Variable roles: `"state"` (x, rounds 0..=rounds, round 0 holding the
//! plaintext and the last round the ciphertext), `"sbox"` (w, the S-box
//! layer inputs of rounds 1..=rounds) and `"key"` (k, round 0 only). The
//! ring lists later rounds first and the key last, matching the
//! elimination order of [`block_order`](PolynomialSystemGenerator::block_order).

use crate::errors::MQCryptoError;
use crate::field::{Block, Element, PrimeField};
use crate::generator::{PolynomialSystemGenerator, VarFormat};
use crate::ring::{
    MonomialOrder, Polynomial, PolynomialRing, TermBlock, TermOrder, Variable,
};
use crate::sbox::SBox;
use crate::system::{PolynomialSystem, SolutionMap};

use rand::RngCore;

use tracing::debug;

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// Polynomial system generator for a toy SPN block cipher.
#[derive(Debug)]
pub struct SpnGenerator {
    field: PrimeField,
    sbox: SBox,
    sboxes: usize,
    rounds: usize,
    round_width: usize,
    index_width: usize,
    ring_cell: OnceLock<Arc<PolynomialRing>>,
}

fn decimal_width(value: usize) -> usize {
    let mut digits = 1;
    let mut v = value;
    while v >= 10 {
        digits += 1;
        v /= 10;
    }
    digits.max(2)
}

fn round_constant_bit(round: usize, position: usize) -> Element {
    if position >= usize::BITS as usize {
        return 0;
    }
    ((round >> position) & 1) as Element
}

fn pack(bits: &[Element]) -> u64 {
    let mut word = 0;
    for (i, &bit) in bits.iter().enumerate() {
        word |= (bit as u64) << i;
    }
    word
}

impl SpnGenerator {
    /// Creates a generator for an SPN with `sboxes` parallel copies of
    /// `sbox` per round and `rounds` rounds.
    ///
    /// The S-box must be a permutation so every round is invertible; the
    /// block size is `sbox.bits_in() * sboxes`.
    pub fn try_with(sbox: SBox, sboxes: usize, rounds: usize) -> Result<Self, MQCryptoError> {
        if rounds == 0 {
            return Err(MQCryptoError::InvalidParameters(
                "Number of rounds must be > 0".to_string(),
            ));
        }
        if sboxes == 0 {
            return Err(MQCryptoError::InvalidParameters(
                "Number of S-box positions must be > 0".to_string(),
            ));
        }
        if sbox.bits_in() != sbox.bits_out() {
            return Err(MQCryptoError::InvalidParameters(format!(
                "S-box must be square, got {} -> {} bits",
                sbox.bits_in(),
                sbox.bits_out()
            )));
        }
        if !sbox.is_permutation() {
            return Err(MQCryptoError::InvalidParameters(
                "S-box must be a permutation so rounds are invertible".to_string(),
            ));
        }

        let block = sbox.bits_in() * sboxes;
        if block < 2 {
            return Err(MQCryptoError::InvalidParameters(
                "Block size must be at least 2 bits".to_string(),
            ));
        }

        let field = PrimeField::try_with(2)?;

        debug!(
            block,
            rounds,
            sbox_bits = sbox.bits_in(),
            "configured SPN generator"
        );

        Ok(SpnGenerator {
            field,
            sbox,
            sboxes,
            rounds,
            round_width: decimal_width(rounds),
            index_width: decimal_width(block - 1),
            ring_cell: OnceLock::new(),
        })
    }

    pub fn block_size(&self) -> usize {
        self.sbox.bits_in() * self.sboxes
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn field(&self) -> &PrimeField {
        &self.field
    }

    fn nvars(&self) -> usize {
        (2 * self.rounds + 2) * self.block_size()
    }

    // Ring layout: [x_rounds, w_rounds, ..., x_1, w_1], x_0, k.
    fn state_offset(&self, round: usize) -> usize {
        let block = self.block_size();
        if round == 0 {
            self.rounds * 2 * block
        } else {
            (self.rounds - round) * 2 * block
        }
    }

    fn sbox_offset(&self, round: usize) -> usize {
        (self.rounds - round) * 2 * self.block_size() + self.block_size()
    }

    fn key_offset(&self) -> usize {
        (self.rounds * 2 + 1) * self.block_size()
    }

    /// The round permutation: bit `j` of the S-box layer output moves to
    /// `j * sboxes mod (block - 1)`, the last bit staying put. `sboxes`
    /// and `block - 1` are coprime, so this is always a bijection.
    fn permute(&self, j: usize) -> usize {
        let block = self.block_size();
        if j == block - 1 {
            block - 1
        } else {
            (j * self.sboxes) % (block - 1)
        }
    }

    fn check_block(&self, block: &[Element], what: &str) -> Result<(), MQCryptoError> {
        if block.len() != self.block_size() {
            return Err(MQCryptoError::LengthMismatch(format!(
                "{} length ({}) must match the block size ({})",
                what,
                block.len(),
                self.block_size()
            )));
        }
        for &element in block {
            if !self.field.contains(element) {
                return Err(MQCryptoError::ElementOutOfRange {
                    element,
                    order: self.field.order(),
                });
            }
        }
        Ok(())
    }

    fn round_key_value(&self, key: &[Element], round: usize, position: usize) -> Element {
        let source = (position + round) % self.block_size();
        self.field
            .add(key[source], round_constant_bit(round, position))
    }

    fn round_key_polynomial(
        &self,
        ring: &PolynomialRing,
        round: usize,
        position: usize,
    ) -> Result<Polynomial, MQCryptoError> {
        let source = (position + round) % self.block_size();
        let mut poly = ring.polynomial_of(ring.var(self.key_offset() + source)?)?;
        if round_constant_bit(round, position) == 1 {
            poly = poly.add(&ring.constant(1), &self.field);
        }
        Ok(poly)
    }

    /// Runs the cipher, returning all round states (index 0 holding the
    /// plaintext, the last the ciphertext) and all S-box layer inputs.
    fn forward(
        &self,
        plaintext: &[Element],
        key: &[Element],
    ) -> Result<(Vec<Block>, Vec<Block>), MQCryptoError> {
        self.check_block(plaintext, "Plaintext")?;
        self.check_block(key, "Key")?;

        let block = self.block_size();
        let bits = self.sbox.bits_in();

        let mut states = Vec::with_capacity(self.rounds + 1);
        let mut layer_inputs = Vec::with_capacity(self.rounds);
        states.push(plaintext.to_vec());

        for round in 1..=self.rounds {
            let state = &states[round - 1];

            // 1) add the previous round key
            let layer_input: Block = (0..block)
                .map(|i| self.field.add(state[i], self.round_key_value(key, round - 1, i)))
                .collect();

            // 2) S-box layer
            let mut substituted = vec![0; block];
            for s in 0..self.sboxes {
                let word = self.sbox.apply(pack(&layer_input[s * bits..(s + 1) * bits]));
                for j in 0..bits {
                    substituted[s * bits + j] = ((word >> j) & 1) as Element;
                }
            }

            // 3) bit permutation, plus the whitening key after the last round
            let mut next = vec![0; block];
            for j in 0..block {
                next[self.permute(j)] = substituted[j];
            }
            if round == self.rounds {
                for (i, bit) in next.iter_mut().enumerate() {
                    *bit = self.field.add(*bit, self.round_key_value(key, self.rounds, i));
                }
            }

            layer_inputs.push(layer_input);
            states.push(next);
        }

        Ok((states, layer_inputs))
    }

    /// The full satisfying assignment of the symbolic system induced by one
    /// (plaintext, key) pair, in ring variable order.
    pub fn witness(
        &self,
        plaintext: &[Element],
        key: &[Element],
    ) -> Result<Vec<Element>, MQCryptoError> {
        let (states, layer_inputs) = self.forward(plaintext, key)?;
        let block = self.block_size();

        let mut assignment = vec![0; self.nvars()];
        for (round, state) in states.iter().enumerate() {
            assignment[self.state_offset(round)..self.state_offset(round) + block]
                .copy_from_slice(state);
        }
        for (round, layer_input) in layer_inputs.iter().enumerate() {
            assignment[self.sbox_offset(round + 1)..self.sbox_offset(round + 1) + block]
                .copy_from_slice(layer_input);
        }
        assignment[self.key_offset()..self.key_offset() + block].copy_from_slice(key);

        Ok(assignment)
    }

    fn elimination_order(&self) -> Result<TermOrder, MQCryptoError> {
        let block = self.block_size();
        let mut blocks = Vec::with_capacity(self.rounds + 2);
        for _ in 0..self.rounds {
            blocks.push(TermBlock {
                len: 2 * block,
                order: MonomialOrder::Degrevlex,
            });
        }
        // plaintext, then the key as the last block to be eliminated into
        blocks.push(TermBlock {
            len: block,
            order: MonomialOrder::Degrevlex,
        });
        blocks.push(TermBlock {
            len: block,
            order: MonomialOrder::Degrevlex,
        });
        TermOrder::try_with(blocks)
    }

    fn build_ring(&self) -> Result<PolynomialRing, MQCryptoError> {
        let mut names = Vec::with_capacity(self.nvars());
        for round in (1..=self.rounds).rev() {
            names.extend(self.var_names("state", round)?);
            names.extend(self.var_names("sbox", round)?);
        }
        names.extend(self.var_names("state", 0)?);
        names.extend(self.var_names("key", 0)?);

        PolynomialRing::try_with(self.field, names, self.elimination_order()?)
    }

    /// The symbolic round equations over `ring`.
    fn equations(&self, ring: &PolynomialRing) -> Result<Vec<Polynomial>, MQCryptoError> {
        let block = self.block_size();
        let bits = self.sbox.bits_in();

        let mut equations = Vec::with_capacity(self.rounds * 2 * block);
        for round in 1..=self.rounds {
            // 1) key addition: w_r + x_{r-1} + rk_{r-1} = 0
            for i in 0..block {
                let layer_input = ring.polynomial_of(ring.var(self.sbox_offset(round) + i)?)?;
                let state = ring.polynomial_of(ring.var(self.state_offset(round - 1) + i)?)?;
                let round_key = self.round_key_polynomial(ring, round - 1, i)?;
                equations.push(
                    layer_input
                        .add(&state, &self.field)
                        .add(&round_key, &self.field),
                );
            }

            // 2) S-box layer through the permutation:
            //    x_r[pi(t)] + ANF(w_r sbox chunk) = 0, the last round also
            //    carrying the whitening key
            for s in 0..self.sboxes {
                let inputs: Vec<Variable> = (0..bits)
                    .map(|j| ring.var(self.sbox_offset(round) + s * bits + j))
                    .collect::<Result<_, _>>()?;
                let outputs: Vec<Variable> = (0..bits)
                    .map(|j| ring.var(self.state_offset(round) + self.permute(s * bits + j)))
                    .collect::<Result<_, _>>()?;

                let mut relations = self.sbox.polynomials(ring, &inputs, &outputs)?;
                if round == self.rounds {
                    for (j, relation) in relations.iter_mut().enumerate() {
                        let round_key = self.round_key_polynomial(
                            ring,
                            self.rounds,
                            self.permute(s * bits + j),
                        )?;
                        *relation = relation.add(&round_key, &self.field);
                    }
                }
                equations.extend(relations);
            }
        }

        Ok(equations)
    }
}

impl PolynomialSystemGenerator for SpnGenerator {
    fn ring(&self) -> Result<Arc<PolynomialRing>, MQCryptoError> {
        if let Some(ring) = self.ring_cell.get() {
            return Ok(ring.clone());
        }
        let ring = Arc::new(self.build_ring()?);
        // get_or_init keeps the first published ring under concurrent
        // first access; a losing builder's ring is simply dropped
        Ok(self.ring_cell.get_or_init(|| ring).clone())
    }

    fn sbox(&self) -> Result<&SBox, MQCryptoError> {
        Ok(&self.sbox)
    }

    fn var_format(&self, name: &str) -> Result<VarFormat, MQCryptoError> {
        let prefix = match name {
            "state" => "x",
            "sbox" => "w",
            "key" => "k",
            _ => return Err(MQCryptoError::UnknownRole(name.to_string())),
        };
        VarFormat::try_with(prefix, self.round_width, self.index_width)
    }

    fn var_names(&self, name: &str, round: usize) -> Result<Vec<String>, MQCryptoError> {
        let in_range = match name {
            "state" => round <= self.rounds,
            "sbox" => (1..=self.rounds).contains(&round),
            "key" => round == 0,
            _ => return Err(MQCryptoError::UnknownRole(name.to_string())),
        };
        if !in_range {
            return Err(MQCryptoError::InvalidParameters(format!(
                "Role '{}' has no round {} in a {}-round SPN",
                name, round, self.rounds
            )));
        }

        Ok(self.var_format(name)?.names(round, self.block_size()))
    }

    fn block_order(&self) -> Result<TermOrder, MQCryptoError> {
        self.elimination_order()
    }

    fn encrypt(&self, plaintext: &[Element], key: &[Element]) -> Result<Block, MQCryptoError> {
        let (mut states, _) = self.forward(plaintext, key)?;
        states
            .pop()
            .ok_or_else(|| MQCryptoError::InternalError("No final state".to_string()))
    }

    fn polynomial_system(
        &self,
        plaintext: Option<&[Element]>,
        key: Option<&[Element]>,
    ) -> Result<(PolynomialSystem, SolutionMap), MQCryptoError> {
        let ring = self.ring()?;
        let block = self.block_size();

        let mut system = PolynomialSystem::try_with(ring.clone(), self.equations(&ring)?)?;

        let mut bindings: BTreeMap<usize, Element> = BTreeMap::new();
        let mut solution: SolutionMap = SolutionMap::new();

        if let Some(plaintext) = plaintext {
            self.check_block(plaintext, "Plaintext")?;
            for (i, &value) in plaintext.iter().enumerate() {
                bindings.insert(self.state_offset(0) + i, value);
            }
        }

        if let Some(key) = key {
            self.check_block(key, "Key")?;
            for (i, &value) in key.iter().enumerate() {
                let index = self.key_offset() + i;
                bindings.insert(index, value);
                solution.insert(ring.name_of(ring.var(index)?)?.to_string(), value);
            }
        }

        if let (Some(plaintext), Some(key)) = (plaintext, key) {
            let ciphertext = self.encrypt(plaintext, key)?;
            for (i, &value) in ciphertext.iter().enumerate() {
                bindings.insert(self.state_offset(self.rounds) + i, value);
            }
        }

        if !bindings.is_empty() {
            system = system.substitute(&bindings)?;
        }

        debug!(
            equations = system.len(),
            variables = block * (2 * self.rounds + 2),
            bound = bindings.len(),
            "assembled polynomial system"
        );

        Ok((system, solution))
    }

    fn random_element(&self, rng: &mut dyn RngCore) -> Result<Block, MQCryptoError> {
        Ok((0..self.block_size())
            .map(|_| self.field.normalize(rng.next_u64() as i64))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::sboxes::{PRESENT_SBOX, PRINTCIPHER_SBOX};

    use quickcheck::quickcheck;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn toy_generator() -> SpnGenerator {
        SpnGenerator::try_with(PRESENT_SBOX.clone(), 1, 1).unwrap()
    }

    #[test]
    fn test_validation() {
        assert!(SpnGenerator::try_with(PRESENT_SBOX.clone(), 0, 1).is_err());
        assert!(SpnGenerator::try_with(PRESENT_SBOX.clone(), 1, 0).is_err());

        let collapse = SBox::try_with(vec![0, 0, 1, 2], 2, 2).unwrap();
        assert!(SpnGenerator::try_with(collapse, 2, 1).is_err());

        let narrow = SBox::try_with(vec![0, 1, 1, 0], 2, 1).unwrap();
        assert!(SpnGenerator::try_with(narrow, 2, 1).is_err());
    }

    #[test]
    fn test_ring_is_cached() -> Result<(), MQCryptoError> {
        let generator = toy_generator();
        let first = generator.ring()?;
        let second = generator.ring()?;
        assert!(Arc::ptr_eq(&first, &second));
        Ok(())
    }

    #[test]
    fn test_var_names_shape() -> Result<(), MQCryptoError> {
        let generator = toy_generator();
        assert_eq!(generator.var_format("key")?.to_string(), "k%02d%02d");
        assert_eq!(
            generator.var_names("key", 0)?,
            vec!["k0000", "k0001", "k0002", "k0003"]
        );
        assert!(matches!(
            generator.var_names("tweak", 0),
            Err(MQCryptoError::UnknownRole(_))
        ));
        assert!(generator.var_names("sbox", 0).is_err());
        assert!(generator.var_names("state", 2).is_err());
        Ok(())
    }

    #[test]
    fn test_var_names_disjoint_across_rounds() -> Result<(), MQCryptoError> {
        let generator = SpnGenerator::try_with(PRINTCIPHER_SBOX.clone(), 2, 3)?;
        for r1 in 0..=3 {
            for r2 in 0..=3 {
                if r1 == r2 {
                    continue;
                }
                let a = generator.var_names("state", r1)?;
                let b = generator.var_names("state", r2)?;
                assert!(a.iter().all(|name| !b.contains(name)));
            }
        }
        Ok(())
    }

    #[test]
    fn test_vars_belong_to_ring() -> Result<(), MQCryptoError> {
        let generator = SpnGenerator::try_with(PRESENT_SBOX.clone(), 2, 2)?;
        let ring = generator.ring()?;
        for (role, round) in [("state", 0), ("state", 2), ("sbox", 1), ("key", 0)] {
            let vars = generator.vars(role, round)?;
            assert_eq!(vars.len(), generator.block_size());
            for (var, name) in vars.iter().zip(generator.var_names(role, round)?) {
                assert!(ring.contains(*var));
                assert_eq!(ring.name_of(*var)?, name);
            }
        }
        Ok(())
    }

    #[test]
    fn test_encrypt_single_round_by_hand() -> Result<(), MQCryptoError> {
        // one 4-bit S-box, one round: the permutation is the identity, so
        // C = S(P ^ K) ^ rk_1 with rk_1 = rot1(K) ^ 0b0001
        let generator = toy_generator();
        let plaintext = vec![0, 1, 0, 1];
        let key = vec![1, 1, 0, 0];

        let p = 0b1010u64; // bit i = plaintext[i]
        let k = 0b0011u64;
        let substituted = PRESENT_SBOX.apply(p ^ k);
        let rot1 = ((k >> 1) | (k << 3)) & 0xF;
        let expected = substituted ^ rot1 ^ 0b0001;

        let ciphertext = generator.encrypt(&plaintext, &key)?;
        assert_eq!(pack(&ciphertext), expected);
        Ok(())
    }

    #[test]
    fn test_input_validation() {
        let generator = toy_generator();
        assert!(matches!(
            generator.encrypt(&[0, 1], &[0, 0, 0, 0]),
            Err(MQCryptoError::LengthMismatch(_))
        ));
        assert!(matches!(
            generator.encrypt(&[0, 1, 0, 2], &[0, 0, 0, 0]),
            Err(MQCryptoError::ElementOutOfRange { .. })
        ));
        assert!(
            generator
                .polynomial_system(Some(&[0, 1]), None)
                .is_err()
        );
    }

    #[test]
    fn test_symbolic_system_shape() -> Result<(), MQCryptoError> {
        let generator = SpnGenerator::try_with(PRESENT_SBOX.clone(), 2, 2)?;
        let block = generator.block_size();

        let (system, solution) = generator.polynomial_system(None, None)?;
        assert!(solution.is_empty());
        assert_eq!(system.len(), 2 * 2 * block);
        // every ring variable occurs in the fully symbolic system
        assert_eq!(system.variables().len(), (2 * 2 + 2) * block);

        let order = generator.block_order()?;
        assert_eq!(order.blocks().len(), 2 + 2);
        assert_eq!(order.blocks()[0].len, 2 * block);
        assert_eq!(order.width(), system.ring().nvars());
        Ok(())
    }

    #[test]
    fn test_witness_satisfies_symbolic_system() -> Result<(), MQCryptoError> {
        let generator = SpnGenerator::try_with(PRINTCIPHER_SBOX.clone(), 2, 2)?;
        let mut rng = StdRng::seed_from_u64(7);
        let plaintext = generator.random_element(&mut rng)?;
        let key = generator.random_element(&mut rng)?;

        let (system, _) = generator.polynomial_system(None, None)?;
        assert!(system.is_satisfied_by(&generator.witness(&plaintext, &key)?)?);

        // a perturbed key breaks at least one equation against the original
        // witness's intermediates
        let mut witness = generator.witness(&plaintext, &key)?;
        let key_index = system.ring().var_by_name("k0000")?.index();
        witness[key_index] = generator.field().sub(1, witness[key_index]);
        assert!(!system.is_satisfied_by(&witness)?);
        Ok(())
    }

    #[test]
    fn test_substituted_system_and_solution_map() -> Result<(), MQCryptoError> {
        let generator = SpnGenerator::try_with(PRESENT_SBOX.clone(), 1, 2)?;
        let mut rng = StdRng::seed_from_u64(99);
        let plaintext = generator.random_element(&mut rng)?;
        let key = generator.random_element(&mut rng)?;

        let (system, solution) = generator.polynomial_system(Some(&plaintext), Some(&key))?;
        assert_eq!(solution.len(), generator.block_size());
        for (i, name) in generator.var_names("key", 0)?.iter().enumerate() {
            assert_eq!(solution.get(name), Some(&key[i]));
        }

        // plaintext, key and ciphertext variables are gone from the system
        let remaining = system.variables();
        for role_round in [("state", 0), ("state", 2), ("key", 0)] {
            for var in generator.vars(role_round.0, role_round.1)? {
                assert!(!remaining.contains(&var));
            }
        }

        assert!(system.is_satisfied_by(&generator.witness(&plaintext, &key)?)?);
        Ok(())
    }

    #[test]
    fn test_random_element_is_a_binary_block() -> Result<(), MQCryptoError> {
        let generator = toy_generator();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..32 {
            let block = generator.random_element(&mut rng)?;
            assert_eq!(block.len(), 4);
            assert!(block.iter().all(|&bit| bit == 0 || bit == 1));
        }
        Ok(())
    }

    quickcheck! {
        fn prop_witness_satisfies_system(seed: u64) -> bool {
            let generator = SpnGenerator::try_with(PRESENT_SBOX.clone(), 1, 2).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let plaintext = generator.random_element(&mut rng).unwrap();
            let key = generator.random_element(&mut rng).unwrap();

            let (system, _) = generator.polynomial_system(None, None).unwrap();
            let witness = generator.witness(&plaintext, &key).unwrap();
            system.is_satisfied_by(&witness).unwrap()
        }
    }
}
