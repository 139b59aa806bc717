//! Core ElGamal encryption and decryption operations

use log::debug;
use num_bigint::{BigInt, BigUint};
use num_traits::One;
use rand::{thread_rng, CryptoRng, RngCore};

use crate::error::{ElGamalError, Result};
use crate::keys::{PrivateKey, PublicKey};
use crate::types::{Ciphertext, ElGamalConfig, HomomorphicMode};
use crate::utils::{mod_exp, mod_inverse, random_below, reduce_exponent};

/// Capability to encrypt field elements under a public key
pub trait Encryptor {
    fn encrypt(&self, public_key: &PublicKey, plaintext: &BigUint) -> Result<Ciphertext>;
}

/// Capability to recover plaintexts with a private key
pub trait Decryptor {
    fn decrypt(&self, private_key: &PrivateKey, ciphertext: &Ciphertext) -> Result<BigUint>;
}

/// ElGamal homomorphic encryption engine.
///
/// The mode is fixed when the engine is built and selects both the
/// encryption transform and the homomorphic algebra. The engine holds no
/// key material, so one instance can serve any number of keys and threads.
#[derive(Clone, Debug)]
pub struct ElGamal {
    mode: HomomorphicMode,
    config: ElGamalConfig,
}

impl ElGamal {
    /// Create a new ElGamal engine with specified mode
    pub fn new(mode: HomomorphicMode) -> Self {
        Self::with_config(ElGamalConfig::default().with_mode(mode))
    }

    /// Create a new ElGamal engine from a configuration; the mode is taken
    /// from `config.mode`.
    pub fn with_config(config: ElGamalConfig) -> Self {
        ElGamal {
            mode: config.mode,
            config,
        }
    }

    /// Get the homomorphic mode
    pub fn mode(&self) -> HomomorphicMode {
        self.mode
    }

    /// Get the configuration
    pub fn config(&self) -> &ElGamalConfig {
        &self.config
    }

    /// Encrypt drawing the nonce from the supplied generator
    pub fn encrypt_with_rng<R: RngCore + CryptoRng + ?Sized>(
        &self,
        rng: &mut R,
        public_key: &PublicKey,
        plaintext: &BigUint,
    ) -> Result<Ciphertext> {
        let r = random_below(rng, &public_key.subgroup_order())?;
        self.encrypt_with_randomness(public_key, plaintext, Some(r))
    }

    /// Encrypt with specific randomness (for testing or known-answer vectors).
    /// `None` draws `r` uniformly from `[0, (p-1)/2)`.
    pub fn encrypt_with_randomness(
        &self,
        public_key: &PublicKey,
        plaintext: &BigUint,
        randomness: Option<BigUint>,
    ) -> Result<Ciphertext> {
        let p = &public_key.p;
        if plaintext >= p {
            return Err(ElGamalError::PlaintextOutOfRange);
        }

        let r = match randomness {
            Some(r) => r,
            None => random_below(&mut thread_rng(), &public_key.subgroup_order())?,
        };

        let c1 = mod_exp(&public_key.g, &r, p);
        let h_r = mod_exp(&public_key.h, &r, p);

        let c2 = match self.mode {
            HomomorphicMode::Multiplicative => (plaintext * h_r) % p,
            HomomorphicMode::Additive => {
                // Encode message in exponent: g^m
                let g_m = mod_exp(&public_key.g, plaintext, p);
                (h_r * g_m) % p
            }
        };

        Ok(Ciphertext::new(c1, c2))
    }

    /// Encrypt a signed plaintext in additive mode. Negative values are
    /// encoded as `(p - 1) - |m|`, which `g` maps to `g^m`.
    pub fn encrypt_signed(&self, public_key: &PublicKey, plaintext: &BigInt) -> Result<Ciphertext> {
        if self.mode != HomomorphicMode::Additive {
            return Err(ElGamalError::UnsupportedOperation {
                mode: self.mode,
                operation: "signed encryption",
            });
        }

        let p_minus_1 = &public_key.p - BigUint::one();
        let encoded = reduce_exponent(plaintext, &p_minus_1);
        self.encrypt(public_key, &encoded)
    }

    /// Look up the exponent of `g^m`.
    ///
    /// Exponents beyond the table's field size are reduced modulo `p - 1`,
    /// which keeps externally built tables that store raw upper-half
    /// exponents compatible.
    fn solve_discrete_log(&self, private_key: &PrivateKey, g_m: &BigUint) -> Result<BigUint> {
        let table = private_key
            .dlog_table()
            .ok_or(ElGamalError::MissingLookupTable)?;

        let m = table.lookup(g_m).ok_or_else(|| {
            debug!(
                "no discrete log for recovered element in table of {} entries",
                table.len()
            );
            ElGamalError::DiscreteLogNotFound
        })?;

        if m > table.field_size() {
            Ok(m % (&private_key.p - BigUint::one()))
        } else {
            Ok(m.clone())
        }
    }
}

impl Encryptor for ElGamal {
    /// Encrypt a plaintext message in `[0, p)`
    fn encrypt(&self, public_key: &PublicKey, plaintext: &BigUint) -> Result<Ciphertext> {
        self.encrypt_with_rng(&mut thread_rng(), public_key, plaintext)
    }
}

impl Decryptor for ElGamal {
    /// Decrypt a ciphertext using the private key
    fn decrypt(&self, private_key: &PrivateKey, ciphertext: &Ciphertext) -> Result<BigUint> {
        let p = &private_key.p;
        if &ciphertext.c1 >= p || &ciphertext.c2 >= p {
            return Err(ElGamalError::CiphertextOutOfRange);
        }

        // Shared secret s = c1^x = h^r
        let s = mod_exp(&ciphertext.c1, &private_key.x, p);
        let s_inv = mod_inverse(&s, p).ok_or(ElGamalError::ModularInverseError)?;
        let recovered = (&ciphertext.c2 * s_inv) % p;

        match self.mode {
            HomomorphicMode::Multiplicative => Ok(recovered),
            HomomorphicMode::Additive => self.solve_discrete_log(private_key, &recovered),
        }
    }
}

/// Interpret an additive-mode exponent as a signed integer: values above
/// `(p - 1) / 2` stand for `value - (p - 1)`.
pub fn decode_signed(value: &BigUint, public_key: &PublicKey) -> BigInt {
    let p_minus_1 = &public_key.p - BigUint::one();
    if value > &public_key.subgroup_order() {
        BigInt::from(value.clone()) - BigInt::from(p_minus_1)
    } else {
        BigInt::from(value.clone())
    }
}
