//! ElGamal digital signatures over SHA-256 digests
//!
//! Signing draws a nonce `k` coprime to `p - 1`, sets `r = g^k mod p` and
//! `s = (d - x*r) * k^-1 mod (p - 1)`. A signature verifies iff
//! `h^r * r^s == g^d (mod p)` with `0 < r < p - 1` and `0 < s < p - 2`.
//!
//! Three entry points share that core:
//! - the free functions [`sign`], [`sign_with_rng`] and [`verify`];
//! - the [`Signer`] and [`Verifier`] traits on the key types;
//! - [`SignatureEngine`], an init-then-stream state machine.

use log::{debug, trace};
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{thread_rng, CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{ElGamalError, Result};
use crate::keys::{ElGamalKey, PrivateKey, PublicKey};
use crate::utils::{gcd, mod_exp, mod_inverse, random_below};

/// Length of a SHA-256 digest in bytes
pub const DIGEST_SIZE: usize = 32;

/// Upper bound on nonce draws before signing gives up.
const MAX_NONCE_ATTEMPTS: usize = 10_000;

/// SHA-256 digest of a message. Signing and verification only ever see this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageDigest([u8; DIGEST_SIZE]);

impl MessageDigest {
    /// Hash `message` with SHA-256
    pub fn of(message: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(message);
        Self::from_hasher(hasher)
    }

    pub fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        MessageDigest(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// The digest as an unsigned big-endian integer
    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    fn from_hasher(hasher: Sha256) -> Self {
        let mut bytes = [0u8; DIGEST_SIZE];
        bytes.copy_from_slice(&hasher.finalize());
        MessageDigest(bytes)
    }
}

/// ElGamal signature `(r, s)`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub(crate) r: BigUint,
    pub(crate) s: BigUint,
}

impl Signature {
    pub fn new(r: BigUint, s: BigUint) -> Self {
        Signature { r, s }
    }

    pub fn r(&self) -> &BigUint {
        &self.r
    }

    pub fn s(&self) -> &BigUint {
        &self.s
    }

    /// Length-prefixed encoding: a `u32` big-endian byte count before each
    /// of `r` and `s`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let r = self.r.to_bytes_be();
        let s = self.s.to_bytes_be();

        let mut out = Vec::with_capacity(8 + r.len() + s.len());
        for component in [&r, &s] {
            out.extend_from_slice(&(component.len() as u32).to_be_bytes());
            out.extend_from_slice(component);
        }
        out
    }

    /// Parse the encoding produced by [`Signature::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (r, rest) = read_prefixed(bytes, "r")?;
        let (s, rest) = read_prefixed(rest, "s")?;
        if !rest.is_empty() {
            return Err(ElGamalError::InvalidEncoding(format!(
                "{} trailing bytes after signature",
                rest.len()
            )));
        }
        Ok(Signature::new(r, s))
    }

    /// Fixed-width encoding: `r` then `s`, each right-aligned in
    /// `(bits(p) + 7) / 8` bytes.
    pub fn to_fixed_bytes(&self, public_key: &PublicKey) -> Result<Vec<u8>> {
        let width = component_width(public_key);
        let mut out = vec![0u8; 2 * width];
        for (i, (name, component)) in [("r", &self.r), ("s", &self.s)].into_iter().enumerate() {
            let bytes = component.to_bytes_be();
            if bytes.len() > width {
                return Err(ElGamalError::SignatureOutOfRange { component: name });
            }
            let end = (i + 1) * width;
            out[end - bytes.len()..end].copy_from_slice(&bytes);
        }
        Ok(out)
    }

    /// Parse the encoding produced by [`Signature::to_fixed_bytes`]
    pub fn from_fixed_bytes(bytes: &[u8], public_key: &PublicKey) -> Result<Self> {
        let width = component_width(public_key);
        if bytes.len() != 2 * width {
            return Err(ElGamalError::InvalidEncoding(format!(
                "expected {} signature bytes, got {}",
                2 * width,
                bytes.len()
            )));
        }
        let (r, s) = bytes.split_at(width);
        Ok(Signature::new(
            BigUint::from_bytes_be(r),
            BigUint::from_bytes_be(s),
        ))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(r: {:x}, s: {:x})", self.r, self.s)
    }
}

fn component_width(public_key: &PublicKey) -> usize {
    ((public_key.bit_size() + 7) / 8) as usize
}

fn read_prefixed<'a>(bytes: &'a [u8], name: &str) -> Result<(BigUint, &'a [u8])> {
    if bytes.len() < 4 {
        return Err(ElGamalError::InvalidEncoding(format!(
            "missing length prefix for {}",
            name
        )));
    }
    let (prefix, rest) = bytes.split_at(4);
    let len = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
    if rest.len() < len {
        return Err(ElGamalError::InvalidEncoding(format!(
            "{} declares {} bytes, only {} remain",
            name,
            len,
            rest.len()
        )));
    }
    let (value, rest) = rest.split_at(len);
    Ok((BigUint::from_bytes_be(value), rest))
}

/// Sign `digest` with a thread-local RNG
pub fn sign(private_key: &PrivateKey, digest: &MessageDigest) -> Result<Signature> {
    sign_with_rng(&mut thread_rng(), private_key, digest)
}

/// Sign `digest`, drawing the nonce from `rng`.
///
/// Nonces not coprime to `p - 1` are rejected, as are nonces that would
/// produce an `r` or `s` outside the ranges [`verify`] accepts.
pub fn sign_with_rng<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    private_key: &PrivateKey,
    digest: &MessageDigest,
) -> Result<Signature> {
    let p = &private_key.p;
    if *p <= BigUint::from(4u32) {
        return Err(ElGamalError::InvalidParameter(
            "modulus too small to sign with".to_string(),
        ));
    }

    let one = BigUint::one();
    let p_minus_1 = p - &one;
    let p_minus_2 = p - 2u32;
    let order = BigInt::from(p_minus_1.clone());
    let d = BigInt::from(digest.to_biguint());
    let x = BigInt::from(private_key.x.clone());

    // k in [2, p - 2]
    let k_span = p - 3u32;

    for attempt in 1..=MAX_NONCE_ATTEMPTS {
        let k = random_below(rng, &k_span)? + 2u32;
        if gcd(&k, &p_minus_1) != one {
            trace!("nonce draw {} not invertible mod p-1", attempt);
            continue;
        }

        let r = mod_exp(&private_key.g, &k, p);
        if r >= p_minus_1 {
            trace!("nonce draw {} gave r out of range", attempt);
            continue;
        }

        let k_inv = mod_inverse(&k, &p_minus_1).ok_or(ElGamalError::ModularInverseError)?;
        let diff = (&d - &x * BigInt::from(r.clone())).mod_floor(&order);
        let s = match diff.to_biguint() {
            Some(diff) => (diff * k_inv) % &p_minus_1,
            None => return Err(ElGamalError::ModularInverseError),
        };
        if s.is_zero() || s >= p_minus_2 {
            trace!("nonce draw {} gave s out of range", attempt);
            continue;
        }

        return Ok(Signature { r, s });
    }

    Err(ElGamalError::CryptoError(format!(
        "no usable nonce after {} attempts",
        MAX_NONCE_ATTEMPTS
    )))
}

/// Verify `signature` over `digest`.
///
/// Returns `Ok(false)` for a well-formed signature that does not match and
/// [`ElGamalError::SignatureOutOfRange`] when `r` or `s` is outside its range.
pub fn verify(
    public_key: &PublicKey,
    digest: &MessageDigest,
    signature: &Signature,
) -> Result<bool> {
    let p = &public_key.p;
    let p_minus_1 = p - 1u32;
    let p_minus_2 = p - 2u32;

    if signature.r.is_zero() || signature.r >= p_minus_1 {
        debug!("rejecting signature: r outside (0, p-1)");
        return Err(ElGamalError::SignatureOutOfRange { component: "r" });
    }
    if signature.s.is_zero() || signature.s >= p_minus_2 {
        debug!("rejecting signature: s outside (0, p-2)");
        return Err(ElGamalError::SignatureOutOfRange { component: "s" });
    }

    let lhs = (mod_exp(&public_key.h, &signature.r, p) * mod_exp(&signature.r, &signature.s, p)) % p;
    let rhs = mod_exp(&public_key.g, &digest.to_biguint(), p);

    Ok(lhs == rhs)
}

/// Signing capability
pub trait Signer {
    fn sign_digest(&self, digest: &MessageDigest) -> Result<Signature>;

    /// Hash `message` and sign the digest
    fn sign_message(&self, message: &[u8]) -> Result<Signature> {
        self.sign_digest(&MessageDigest::of(message))
    }
}

/// Verification capability
pub trait Verifier {
    fn verify_digest(&self, digest: &MessageDigest, signature: &Signature) -> Result<bool>;

    /// Hash `message` and verify the signature over its digest
    fn verify_message(&self, message: &[u8], signature: &Signature) -> Result<bool> {
        self.verify_digest(&MessageDigest::of(message), signature)
    }
}

impl Signer for PrivateKey {
    fn sign_digest(&self, digest: &MessageDigest) -> Result<Signature> {
        sign(self, digest)
    }
}

impl Verifier for PublicKey {
    fn verify_digest(&self, digest: &MessageDigest, signature: &Signature) -> Result<bool> {
        verify(self, digest, signature)
    }
}

enum EngineState {
    Uninitialized,
    SignReady(PrivateKey),
    VerifyReady(PublicKey),
}

impl EngineState {
    fn name(&self) -> &'static str {
        match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::SignReady(_) => "initialized for signing",
            EngineState::VerifyReady(_) => "initialized for verification",
        }
    }
}

/// Streaming sign/verify in the init-update-finish style.
///
/// An engine is initialized for exactly one role at a time; message bytes
/// are fed with [`update`](Self::update) and hashed incrementally. Finishing
/// a signature or verification resets the digest but keeps the key, so the
/// engine can process the next message. Not meant to be shared between
/// concurrent flows.
///
/// ```rust
/// use elgamal_phe::{HomomorphicMode, KeyPair, SignatureEngine};
///
/// let keypair = KeyPair::generate_for_testing(512, HomomorphicMode::Multiplicative).unwrap();
///
/// let mut signer = SignatureEngine::new();
/// signer.init_sign(keypair.private_key.clone().into()).unwrap();
/// signer.update(b"hello ").unwrap();
/// signer.update(b"world").unwrap();
/// let signature = signer.sign().unwrap();
///
/// let mut verifier = SignatureEngine::new();
/// verifier.init_verify(keypair.public_key.clone().into()).unwrap();
/// verifier.update(b"hello world").unwrap();
/// assert!(verifier.verify(&signature).unwrap());
/// ```
pub struct SignatureEngine {
    state: EngineState,
    hasher: Sha256,
}

impl SignatureEngine {
    pub fn new() -> Self {
        SignatureEngine {
            state: EngineState::Uninitialized,
            hasher: Sha256::new(),
        }
    }

    /// Enter the signing role. Fails with `KeyTypeMismatch` for a public key.
    pub fn init_sign(&mut self, key: ElGamalKey) -> Result<()> {
        let private_key = key.into_private()?;
        self.state = EngineState::SignReady(private_key);
        self.hasher = Sha256::new();
        Ok(())
    }

    /// Enter the verification role. Fails with `KeyTypeMismatch` for a private key.
    pub fn init_verify(&mut self, key: ElGamalKey) -> Result<()> {
        let public_key = key.into_public()?;
        self.state = EngineState::VerifyReady(public_key);
        self.hasher = Sha256::new();
        Ok(())
    }

    /// Feed message bytes into the running digest
    pub fn update(&mut self, data: &[u8]) -> Result<()> {
        if let EngineState::Uninitialized = self.state {
            return Err(self.misuse("update"));
        }
        self.hasher.update(data);
        Ok(())
    }

    pub fn sign(&mut self) -> Result<Signature> {
        self.sign_with_rng(&mut thread_rng())
    }

    pub fn sign_with_rng<R: RngCore + CryptoRng + ?Sized>(&mut self, rng: &mut R) -> Result<Signature> {
        let private_key = match &self.state {
            EngineState::SignReady(private_key) => private_key,
            _ => return Err(self.misuse("sign")),
        };
        let digest = MessageDigest::from_hasher(std::mem::take(&mut self.hasher));
        sign_with_rng(rng, private_key, &digest)
    }

    pub fn verify(&mut self, signature: &Signature) -> Result<bool> {
        let public_key = match &self.state {
            EngineState::VerifyReady(public_key) => public_key,
            _ => return Err(self.misuse("verify")),
        };
        let digest = MessageDigest::from_hasher(std::mem::take(&mut self.hasher));
        verify(public_key, &digest, signature)
    }

    fn misuse(&self, operation: &'static str) -> ElGamalError {
        ElGamalError::ProtocolMisuse {
            operation,
            state: self.state.name(),
        }
    }
}

impl Default for SignatureEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SignatureEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureEngine")
            .field("state", &self.state.name())
            .finish()
    }
}
