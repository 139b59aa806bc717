//! # ElGamal Partially Homomorphic Encryption Library
//!
//! This library provides ElGamal encryption and signatures with:
//! - Multiplicative and additive (exponential) homomorphic modes
//! - Discrete-log lookup tables for bounded additive decryption
//! - Encrypted sums and dot products with plaintext weights
//! - SHA-256 based ElGamal signatures with a streaming engine
//!
//! ## Features
//!
//! - **Mode per engine**: the homomorphism is chosen when an [`ElGamal`] engine is built
//! - **Signed plaintexts**: additive lookup tables can index negative values
//! - **Wire formats**: modulus-derived fixed-width ciphertext blocks and
//!   length-prefixed signatures
//!
//! ## Example
//!
//! ```rust
//! use elgamal_phe::{Decryptor, ElGamal, Encryptor, HomomorphicMode, HomomorphicOperations, KeyPair};
//!
//! // Generate keys with a lookup table for additive decryption
//! let keypair = KeyPair::generate_for_testing(512, HomomorphicMode::Additive).unwrap();
//!
//! // Create ElGamal instance for additive operations
//! let elgamal = ElGamal::new(HomomorphicMode::Additive);
//!
//! // Encrypt values
//! let ct1 = elgamal.encrypt(&keypair.public_key, &10u32.into()).unwrap();
//! let ct2 = elgamal.encrypt(&keypair.public_key, &20u32.into()).unwrap();
//!
//! // Perform homomorphic addition
//! let sum = elgamal.add(&ct1, &ct2, &keypair.public_key).unwrap();
//!
//! // Decrypt result
//! let result = elgamal.decrypt(&keypair.private_key, &sum).unwrap();
//! assert_eq!(result, 30u32.into());
//! ```

pub mod encryption;
pub mod error;
pub mod homomorphic;
pub mod keys;
pub mod signature;
pub mod types;
pub mod utils;
pub mod wire;

#[cfg(test)]
mod test_utils;

// Re-export main types for convenience
pub use encryption::{decode_signed, Decryptor, ElGamal, Encryptor};
pub use error::{ElGamalError, Result};
pub use homomorphic::HomomorphicOperations;
pub use keys::{DlogTable, ElGamalKey, KeyPair, PrivateKey, PublicKey};
pub use signature::{
    sign, sign_with_rng, verify, MessageDigest, Signature, SignatureEngine, Signer, Verifier,
};
pub use types::{Ciphertext, ElGamalConfig, HomomorphicMode};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::{BigInt, ToBigUint};

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_basic_workflow() {
        let keypair = KeyPair::generate_for_testing(512, HomomorphicMode::Multiplicative);
        assert!(keypair.is_ok());

        let keypair = keypair.unwrap();
        let elgamal = ElGamal::new(HomomorphicMode::Multiplicative);

        let m = 42u32.to_biguint().unwrap();
        let ct = elgamal.encrypt(&keypair.public_key, &m).unwrap();
        let decrypted = elgamal.decrypt(&keypair.private_key, &ct).unwrap();

        assert_eq!(m, decrypted);
    }

    #[test]
    fn test_additive_dot_product_workflow() {
        let keypair = test_utils::test_keypair(HomomorphicMode::Additive);
        let elgamal = ElGamal::new(HomomorphicMode::Additive);

        let votes: Vec<_> = [1u32, 0, 1, 1]
            .iter()
            .map(|v| elgamal.encrypt(&keypair.public_key, &(*v).into()).unwrap())
            .collect();
        let weights: Vec<BigInt> = [3, 5, 7, 11].iter().map(|w| BigInt::from(*w)).collect();

        let tally = elgamal
            .sum_of_products(&keypair.public_key, &votes, &weights)
            .unwrap();
        assert_eq!(
            elgamal.decrypt(&keypair.private_key, &tally).unwrap(),
            21u32.to_biguint().unwrap()
        );
    }
}
