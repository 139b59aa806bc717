//! Demo of the elgamal-phe library. Set `RUST_LOG=elgamal_phe=debug` to see
//! the library's diagnostics.

use elgamal_phe::wire::{ciphertext_size, plaintext_size};
use elgamal_phe::{
    decode_signed, Decryptor, ElGamal, ElGamalConfig, Encryptor, HomomorphicMode,
    HomomorphicOperations, KeyPair, Result, SignatureEngine, Signer, Verifier,
};
use log::info;
use num_bigint::{BigInt, BigUint};

const KEY_BITS: u64 = 512;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== ElGamal Partially Homomorphic Encryption Demo ===\n");

    // ========== MULTIPLICATIVE MODE ==========
    println!("--- Multiplicative Mode ---");
    let config = ElGamalConfig::default().with_safe_primes(false);
    let keypair = KeyPair::generate(KEY_BITS, &config)?;
    info!("generated {}", keypair);

    let elgamal = ElGamal::with_config(config);
    let ct_a = elgamal.encrypt(&keypair.public_key, &BigUint::from(6u32))?;
    let ct_b = elgamal.encrypt(&keypair.public_key, &BigUint::from(7u32))?;

    let ct_product = elgamal.multiply(&ct_a, &ct_b, &keypair.public_key)?;
    let product = elgamal.decrypt(&keypair.private_key, &ct_product)?;
    println!("Homomorphic product: 6 * 7 = {}", product);

    let ct_cube = elgamal.power(&ct_a, &BigInt::from(3), &keypair.public_key)?;
    println!(
        "Homomorphic power: 6^3 = {}",
        elgamal.decrypt(&keypair.private_key, &ct_cube)?
    );

    // ========== ADDITIVE MODE ==========
    println!("\n--- Additive Mode ---");
    let config = ElGamalConfig::default()
        .with_mode(HomomorphicMode::Additive)
        .with_field_size(1 << 12)
        .with_safe_primes(false);
    let keypair = KeyPair::generate(KEY_BITS, &config)?;
    let elgamal = ElGamal::with_config(config);
    let pk = &keypair.public_key;

    let values = [10u32, 20, 30];
    let weights = [BigInt::from(2), BigInt::from(3), BigInt::from(-1)];
    let ciphertexts = values
        .iter()
        .map(|v| elgamal.encrypt(pk, &BigUint::from(*v)))
        .collect::<Result<Vec<_>>>()?;

    let ct_sum = elgamal.sum(&ciphertexts, pk, ciphertexts.len())?;
    println!(
        "Homomorphic sum: 10 + 20 + 30 = {}",
        elgamal.decrypt(&keypair.private_key, &ct_sum)?
    );

    let ct_dot = elgamal.sum_of_products(pk, &ciphertexts, &weights)?;
    println!(
        "Encrypted dot product: 2*10 + 3*20 - 1*30 = {}",
        elgamal.decrypt(&keypair.private_key, &ct_dot)?
    );

    let ct_diff = elgamal.subtract(&ciphertexts[0], &ciphertexts[2], pk)?;
    let diff = elgamal.decrypt(&keypair.private_key, &ct_diff)?;
    println!("Signed difference: 10 - 30 = {}", decode_signed(&diff, pk));

    // ========== WIRE FORMAT ==========
    println!("\n--- Wire Format ---");
    let block = elgamal.encrypt_block(pk, &[0x01, 0x00])?;
    let recovered = elgamal.decrypt_block(&keypair.private_key, &block)?;
    println!(
        "Plaintext block: {} bytes, ciphertext block: {} bytes",
        plaintext_size(pk.modulus()),
        ciphertext_size(pk.modulus())
    );
    println!("Block round trip: {}", BigUint::from_bytes_be(&recovered));

    // ========== SIGNATURES ==========
    println!("\n--- Signatures ---");
    let message = b"transfer 100 to alice";
    let signature = keypair.private_key.sign_message(message)?;
    println!("{}", signature);
    println!(
        "Signature valid: {}",
        keypair.public_key.verify_message(message, &signature)?
    );
    println!(
        "Tampered message valid: {}",
        keypair.public_key.verify_message(b"transfer 900 to alice", &signature)?
    );

    let mut engine = SignatureEngine::new();
    engine.init_verify(keypair.public_key.clone().into())?;
    engine.update(b"transfer 100 ")?;
    engine.update(b"to alice")?;
    println!("Streamed verification: {}", engine.verify(&signature)?);
    println!(
        "Length-prefixed signature: {} bytes",
        signature.to_bytes().len()
    );

    Ok(())
}
