//! Key generation and management

use log::debug;
use num_bigint::BigUint;
use num_traits::One;
use rand::{thread_rng, CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroize;

use crate::error::{ElGamalError, Result};
use crate::types::{ElGamalConfig, HomomorphicMode};
use crate::utils::{
    find_generator, generate_prime, generate_safe_prime, mod_exp, mod_inverse, random_below,
};

/// Smallest modulus accepted by key generation.
pub const MIN_KEY_BITS: u64 = 512;

/// ElGamal public key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    pub(crate) p: BigUint, // Prime modulus
    pub(crate) g: BigUint, // Generator
    pub(crate) h: BigUint, // g^x mod p (public key component)
}

impl PublicKey {
    /// Create a new public key
    pub fn new(p: BigUint, g: BigUint, h: BigUint) -> Self {
        PublicKey { p, g, h }
    }

    /// Get the prime modulus
    pub fn modulus(&self) -> &BigUint {
        &self.p
    }

    /// Get the generator
    pub fn generator(&self) -> &BigUint {
        &self.g
    }

    /// Get the public component (g^x mod p)
    pub fn public_component(&self) -> &BigUint {
        &self.h
    }

    /// Get the bit size of the modulus
    pub fn bit_size(&self) -> u64 {
        self.p.bits()
    }

    /// `(p - 1) / 2`, the order of the prime-order subgroup of a safe prime.
    /// Encryption nonces are drawn below this bound.
    pub fn subgroup_order(&self) -> BigUint {
        (&self.p - BigUint::one()) >> 1u32
    }

    /// Validate the public key
    pub fn validate(&self) -> Result<()> {
        if self.p <= BigUint::from(2u32) {
            return Err(ElGamalError::InvalidParameter(
                "Modulus p must be > 2".to_string(),
            ));
        }

        if self.g <= BigUint::one() || self.g >= self.p {
            return Err(ElGamalError::InvalidParameter(
                "Generator g must be in range (1, p)".to_string(),
            ));
        }

        if self.h <= BigUint::one() || self.h >= self.p {
            return Err(ElGamalError::InvalidParameter(
                "Public component h must be in range (1, p)".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({} bits)", self.bit_size())
    }
}

/// Discrete-log lookup table: `g^m mod p -> m` over a bounded plaintext field.
///
/// Built once, then only read. Signed tables additionally map `g^-k` to the
/// exponent `(p - 1) - k`, the upper-half encoding of `-k`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DlogTable {
    entries: HashMap<BigUint, BigUint>,
    field_size: BigUint,
}

impl DlogTable {
    /// Build the table for exponents `[0, field_size)`, and `(-field_size, 0)`
    /// when `signed` is set.
    pub fn build(g: &BigUint, p: &BigUint, field_size: u64, signed: bool) -> Result<Self> {
        let p_minus_1 = p - BigUint::one();
        let bound = BigUint::from(field_size);
        if field_size == 0 || bound >= p_minus_1 {
            return Err(ElGamalError::InvalidParameter(format!(
                "field size {} must be in [1, p - 1)",
                field_size
            )));
        }

        let capacity = if signed { 2 * field_size } else { field_size };
        let mut entries = HashMap::with_capacity(capacity as usize);

        let mut current = BigUint::one();
        for m in 0..field_size {
            entries.entry(current.clone()).or_insert_with(|| BigUint::from(m));
            current = (&current * g) % p;
        }

        if signed {
            let g_inv = mod_inverse(g, p).ok_or(ElGamalError::ModularInverseError)?;
            let mut current = g_inv.clone();
            for k in 1..field_size {
                entries
                    .entry(current.clone())
                    .or_insert_with(|| &p_minus_1 - k);
                current = (&current * &g_inv) % p;
            }
        }

        debug!(
            "built {}discrete-log table with {} entries",
            if signed { "signed " } else { "" },
            entries.len()
        );

        Ok(DlogTable {
            entries,
            field_size: bound,
        })
    }

    /// Wrap a table produced elsewhere.
    pub fn from_entries(entries: HashMap<BigUint, BigUint>, field_size: BigUint) -> Self {
        DlogTable {
            entries,
            field_size,
        }
    }

    pub fn lookup(&self, element: &BigUint) -> Option<&BigUint> {
        self.entries.get(element)
    }

    /// Upper bound of the supported plaintext field
    pub fn field_size(&self) -> &BigUint {
        &self.field_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Overwrite every limb of a `BigUint` in place.
///
/// Bits are cleared from the bottom up so the buffer is all zero before
/// normalisation truncates it.
fn zeroize_biguint(n: &mut BigUint) {
    for bit in 0..n.bits() {
        n.set_bit(bit, false);
    }
}

/// ElGamal private key `(p, g, x)` plus, for additive mode, a lookup table.
///
/// The secret exponent is wiped on drop.
#[derive(Clone)]
pub struct PrivateKey {
    pub(crate) p: BigUint,
    pub(crate) g: BigUint,
    pub(crate) x: BigUint, // Secret exponent
    pub(crate) dlog_table: Option<Arc<DlogTable>>,
}

impl PrivateKey {
    /// Create a new private key without a lookup table
    pub fn new(p: BigUint, g: BigUint, x: BigUint) -> Self {
        PrivateKey {
            p,
            g,
            x,
            dlog_table: None,
        }
    }

    /// Attach a discrete-log table, enabling additive-mode decryption
    pub fn with_lookup_table(mut self, table: DlogTable) -> Self {
        self.dlog_table = Some(Arc::new(table));
        self
    }

    pub fn modulus(&self) -> &BigUint {
        &self.p
    }

    pub fn generator(&self) -> &BigUint {
        &self.g
    }

    /// Get the secret exponent
    pub fn secret_exponent(&self) -> &BigUint {
        &self.x
    }

    pub fn dlog_table(&self) -> Option<&DlogTable> {
        self.dlog_table.as_deref()
    }

    /// Derive the matching public key `(p, g, g^x mod p)`
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            p: self.p.clone(),
            g: self.g.clone(),
            h: mod_exp(&self.g, &self.x, &self.p),
        }
    }
}

impl Zeroize for PrivateKey {
    fn zeroize(&mut self) {
        zeroize_biguint(&mut self.x);
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.p == other.p && self.g == other.g && self.x == other.x
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("p", &self.p)
            .field("g", &self.g)
            .field("x", &"***")
            .field("dlog_table", &self.dlog_table.as_ref().map(|t| t.len()))
            .finish()
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(***)")
    }
}

/// Either half of a key pair, for APIs that accept a key before knowing
/// which role it must play.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElGamalKey {
    Public(PublicKey),
    Private(PrivateKey),
}

impl ElGamalKey {
    pub fn kind(&self) -> &'static str {
        match self {
            ElGamalKey::Public(_) => "public",
            ElGamalKey::Private(_) => "private",
        }
    }

    pub fn into_public(self) -> Result<PublicKey> {
        match self {
            ElGamalKey::Public(pk) => Ok(pk),
            ElGamalKey::Private(_) => Err(ElGamalError::KeyTypeMismatch {
                expected: "public",
                found: "private",
            }),
        }
    }

    pub fn into_private(self) -> Result<PrivateKey> {
        match self {
            ElGamalKey::Private(sk) => Ok(sk),
            ElGamalKey::Public(_) => Err(ElGamalError::KeyTypeMismatch {
                expected: "private",
                found: "public",
            }),
        }
    }
}

impl From<PublicKey> for ElGamalKey {
    fn from(pk: PublicKey) -> Self {
        ElGamalKey::Public(pk)
    }
}

impl From<PrivateKey> for ElGamalKey {
    fn from(sk: PrivateKey) -> Self {
        ElGamalKey::Private(sk)
    }
}

/// ElGamal key pair
#[derive(Clone, Debug)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub private_key: PrivateKey,
}

impl KeyPair {
    /// Generate a new ElGamal key pair with specified bit size
    ///
    /// In additive mode the private key also receives a lookup table covering
    /// `config.field_size`.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use elgamal_phe::{ElGamalConfig, KeyPair};
    ///
    /// let keypair = KeyPair::generate(1024, &ElGamalConfig::default()).expect("Failed to generate keys");
    /// ```
    pub fn generate(bit_size: u64, config: &ElGamalConfig) -> Result<Self> {
        Self::generate_with_rng(&mut thread_rng(), bit_size, config)
    }

    pub fn generate_with_rng<R: RngCore + CryptoRng + ?Sized>(
        rng: &mut R,
        bit_size: u64,
        config: &ElGamalConfig,
    ) -> Result<Self> {
        if bit_size < MIN_KEY_BITS {
            return Err(ElGamalError::InvalidKeySize(bit_size));
        }

        let rounds = config.primality_test_rounds;
        let (p, q) = if config.use_safe_primes {
            generate_safe_prime(rng, bit_size, rounds)?
        } else {
            // q is then only a cofactor hint for the generator search
            let p = generate_prime(rng, bit_size, rounds)?;
            let q = (&p - 1u32) >> 1u32;
            (p, q)
        };

        let g = find_generator(rng, &p, &q);

        // x in [1, p - 2]
        let x = random_below(rng, &(&p - 2u32))? + 1u32;

        let table = match config.mode {
            HomomorphicMode::Additive => Some(DlogTable::build(
                &g,
                &p,
                config.field_size,
                config.signed_plaintexts,
            )?),
            HomomorphicMode::Multiplicative => None,
        };

        debug!("generated {}-bit {} key pair", p.bits(), config.mode);
        Self::from_components(p, g, x, table)
    }

    /// Generate a key pair quickly for testing (without safe primes)
    pub fn generate_for_testing(bit_size: u64, mode: HomomorphicMode) -> Result<Self> {
        let config = ElGamalConfig::default()
            .with_mode(mode)
            .with_safe_primes(false)
            .with_field_size(1 << 12);
        Self::generate(bit_size, &config)
    }

    /// Create a key pair from existing components
    pub fn from_components(
        p: BigUint,
        g: BigUint,
        x: BigUint,
        table: Option<DlogTable>,
    ) -> Result<Self> {
        if x < BigUint::one() || x > &p - 2u32 {
            return Err(ElGamalError::InvalidParameter(
                "Secret exponent x must be in range [1, p - 2]".to_string(),
            ));
        }

        let mut private_key = PrivateKey::new(p, g, x);
        if let Some(table) = table {
            private_key = private_key.with_lookup_table(table);
        }
        let public_key = private_key.public_key();

        public_key.validate()?;

        Ok(KeyPair {
            public_key,
            private_key,
        })
    }

    /// Get the bit size of the keys
    pub fn bit_size(&self) -> u64 {
        self.public_key.bit_size()
    }
}

impl fmt::Display for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair({} bits)", self.bit_size())
    }
}
