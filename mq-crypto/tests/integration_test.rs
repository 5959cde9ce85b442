use mq_crypto::errors::MQCryptoError;
use mq_crypto::generator::PolynomialSystemGenerator;
use mq_crypto::preset::sboxes::PRESENT_SBOX;
use mq_crypto::spn::SpnGenerator;
use mq_crypto::system::PolynomialSystem;

use rand::SeedableRng;
use rand::rngs::StdRng;

use std::sync::Arc;

#[test]
fn happy_flow() -> Result<(), MQCryptoError> {
    let generator = SpnGenerator::try_with(PRESENT_SBOX.clone(), 2, 2)?;
    let mut rng = StdRng::seed_from_u64(12345);

    let plaintext = generator.random_element(&mut rng)?;
    let key = generator.random_element(&mut rng)?;
    let ciphertext = generator.encrypt(&plaintext, &key)?;
    assert_eq!(ciphertext.len(), generator.block_size());

    let (system, solution) = generator.polynomial_system(Some(&plaintext), Some(&key))?;
    assert_eq!(solution.len(), generator.block_size());

    // the run of the cipher itself satisfies the instantiated system
    let witness = generator.witness(&plaintext, &key)?;
    assert!(system.is_satisfied_by(&witness)?);

    // and the symbolic system as well
    let (symbolic, empty) = generator.polynomial_system(None, None)?;
    assert!(empty.is_empty());
    assert!(symbolic.is_satisfied_by(&witness)?);

    Ok(())
}

#[test]
fn ring_identity_across_calls() -> Result<(), MQCryptoError> {
    let generator = SpnGenerator::try_with(PRESENT_SBOX.clone(), 1, 3)?;
    assert!(Arc::ptr_eq(&generator.ring()?, &generator.ring()?));
    Ok(())
}

#[test]
fn encryption_is_deterministic_and_key_dependent() -> Result<(), MQCryptoError> {
    let generator = SpnGenerator::try_with(PRESENT_SBOX.clone(), 2, 3)?;
    let mut rng = StdRng::seed_from_u64(5);

    let plaintext = generator.random_element(&mut rng)?;
    let key_a = generator.random_element(&mut rng)?;
    let mut key_b = key_a.clone();
    key_b[0] = 1 - key_b[0];

    assert_eq!(
        generator.encrypt(&plaintext, &key_a)?,
        generator.encrypt(&plaintext, &key_a)?
    );
    assert_ne!(
        generator.encrypt(&plaintext, &key_a)?,
        generator.encrypt(&plaintext, &key_b)?
    );
    Ok(())
}

#[test]
fn system_survives_serialization() -> Result<(), MQCryptoError> {
    let generator = SpnGenerator::try_with(PRESENT_SBOX.clone(), 1, 1)?;
    let (system, _) = generator.polynomial_system(None, None)?;

    let restored = PolynomialSystem::from_json(&system.to_json()?)?;
    assert_eq!(system, restored);

    let mut rng = StdRng::seed_from_u64(17);
    let plaintext = generator.random_element(&mut rng)?;
    let key = generator.random_element(&mut rng)?;
    assert!(restored.is_satisfied_by(&generator.witness(&plaintext, &key)?)?);
    Ok(())
}
