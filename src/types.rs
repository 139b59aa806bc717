//! Core types and data structures

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Homomorphic encryption mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HomomorphicMode {
    /// Standard ElGamal - ciphertext products decrypt to plaintext products
    Multiplicative,
    /// Exponential ElGamal - ciphertext products decrypt to plaintext sums
    /// (bounded message space, decryption needs a discrete-log table)
    Additive,
}

impl fmt::Display for HomomorphicMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HomomorphicMode::Multiplicative => write!(f, "Multiplicative"),
            HomomorphicMode::Additive => write!(f, "Additive"),
        }
    }
}

/// ElGamal ciphertext `(c1, c2)`.
///
/// A ciphertext does not record the key or mode that produced it; every
/// operation combining ciphertexts takes the public key explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ciphertext {
    pub(crate) c1: BigUint,
    pub(crate) c2: BigUint,
}

impl Ciphertext {
    /// Create a new ciphertext
    pub fn new(c1: BigUint, c2: BigUint) -> Self {
        Ciphertext { c1, c2 }
    }

    /// `g^r mod p`
    pub fn c1(&self) -> &BigUint {
        &self.c1
    }

    /// `m * h^r mod p` or `g^m * h^r mod p`, depending on mode
    pub fn c2(&self) -> &BigUint {
        &self.c2
    }

    pub fn into_parts(self) -> (BigUint, BigUint) {
        (self.c1, self.c2)
    }

    /// Get the size in bytes of the minimal big-endian encodings
    pub fn size_bytes(&self) -> usize {
        self.c1.to_bytes_be().len() + self.c2.to_bytes_be().len()
    }
}

impl fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ciphertext({} bytes)", self.size_bytes())
    }
}

/// Default bound on additive-mode plaintexts.
pub const DEFAULT_FIELD_SIZE: u64 = 1 << 16;

/// Configuration for ElGamal operations
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElGamalConfig {
    /// Homomorphism captured by engines built from this config
    pub mode: HomomorphicMode,
    /// Plaintexts in `[0, field_size)` are decryptable in additive mode
    pub field_size: u64,
    /// Whether generated lookup tables also index negative exponents
    pub signed_plaintexts: bool,
    /// Number of Miller-Rabin rounds for primality testing
    pub primality_test_rounds: usize,
    /// Whether to use safe primes (p = 2q + 1)
    pub use_safe_primes: bool,
}

impl Default for ElGamalConfig {
    fn default() -> Self {
        ElGamalConfig {
            mode: HomomorphicMode::Multiplicative,
            field_size: DEFAULT_FIELD_SIZE,
            signed_plaintexts: true,
            primality_test_rounds: 20,
            use_safe_primes: true,
        }
    }
}

impl ElGamalConfig {
    pub fn with_mode(mut self, mode: HomomorphicMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_field_size(mut self, field_size: u64) -> Self {
        self.field_size = field_size;
        self
    }

    pub fn with_signed_plaintexts(mut self, signed: bool) -> Self {
        self.signed_plaintexts = signed;
        self
    }

    pub fn with_primality_test_rounds(mut self, rounds: usize) -> Self {
        self.primality_test_rounds = rounds;
        self
    }

    pub fn with_safe_primes(mut self, use_safe_primes: bool) -> Self {
        self.use_safe_primes = use_safe_primes;
        self
    }
}
