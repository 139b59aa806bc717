//! Fixed-width byte encodings for plaintexts and ciphertexts
//!
//! Widths are derived from the modulus. A ciphertext is `c1` followed by
//! `c2`, each right-aligned (zero-padded on the left) in half of the buffer.
//! For a 1024-bit modulus each half is 129 bytes.

use num_bigint::BigUint;

use crate::encryption::{Decryptor, ElGamal, Encryptor};
use crate::error::{ElGamalError, Result};
use crate::keys::{PrivateKey, PublicKey};
use crate::types::Ciphertext;

/// Width of an encoded plaintext: `(bits(p) + 8) / 8`
pub fn plaintext_size(modulus: &BigUint) -> usize {
    ((modulus.bits() + 8) / 8) as usize
}

/// Width of an encoded ciphertext: `2 * ((bits(p) + 12) / 8)`
pub fn ciphertext_size(modulus: &BigUint) -> usize {
    2 * ((modulus.bits() + 12) / 8) as usize
}

/// Write `value` right-aligned into `out`; false if it does not fit.
fn right_align(value: &BigUint, out: &mut [u8]) -> bool {
    let bytes = value.to_bytes_be();
    if bytes.len() > out.len() {
        return false;
    }
    let start = out.len() - bytes.len();
    out[start..].copy_from_slice(&bytes);
    true
}

pub fn encode_plaintext(plaintext: &BigUint, modulus: &BigUint) -> Result<Vec<u8>> {
    if plaintext >= modulus {
        return Err(ElGamalError::PlaintextOutOfRange);
    }
    let mut out = vec![0u8; plaintext_size(modulus)];
    if !right_align(plaintext, &mut out) {
        return Err(ElGamalError::PlaintextOutOfRange);
    }
    Ok(out)
}

/// Read an unsigned big-endian plaintext of at most `plaintext_size` bytes
pub fn decode_plaintext(bytes: &[u8], modulus: &BigUint) -> Result<BigUint> {
    let size = plaintext_size(modulus);
    if bytes.len() > size {
        return Err(ElGamalError::InvalidEncoding(format!(
            "plaintext block is {} bytes, at most {} allowed",
            bytes.len(),
            size
        )));
    }
    let value = BigUint::from_bytes_be(bytes);
    if &value >= modulus {
        return Err(ElGamalError::PlaintextOutOfRange);
    }
    Ok(value)
}

pub fn encode_ciphertext(ciphertext: &Ciphertext, modulus: &BigUint) -> Result<Vec<u8>> {
    if &ciphertext.c1 >= modulus || &ciphertext.c2 >= modulus {
        return Err(ElGamalError::CiphertextOutOfRange);
    }
    let mut out = vec![0u8; ciphertext_size(modulus)];
    let (first, second) = out.split_at_mut(ciphertext_size(modulus) / 2);
    if !right_align(&ciphertext.c1, first) || !right_align(&ciphertext.c2, second) {
        return Err(ElGamalError::CiphertextOutOfRange);
    }
    Ok(out)
}

/// Split an encoded ciphertext at its midpoint. The length must match
/// `ciphertext_size` exactly.
pub fn decode_ciphertext(bytes: &[u8], modulus: &BigUint) -> Result<Ciphertext> {
    let size = ciphertext_size(modulus);
    if bytes.len() != size {
        return Err(ElGamalError::InvalidEncoding(format!(
            "expected {} ciphertext bytes, got {}",
            size,
            bytes.len()
        )));
    }
    let (first, second) = bytes.split_at(size / 2);
    let c1 = BigUint::from_bytes_be(first);
    let c2 = BigUint::from_bytes_be(second);
    if &c1 >= modulus || &c2 >= modulus {
        return Err(ElGamalError::CiphertextOutOfRange);
    }
    Ok(Ciphertext::new(c1, c2))
}

impl ElGamal {
    /// Encrypt a big-endian plaintext block into the fixed-width wire format
    pub fn encrypt_block(&self, public_key: &PublicKey, block: &[u8]) -> Result<Vec<u8>> {
        let plaintext = decode_plaintext(block, &public_key.p)?;
        let ciphertext = self.encrypt(public_key, &plaintext)?;
        encode_ciphertext(&ciphertext, &public_key.p)
    }

    /// Decrypt a wire-format ciphertext; the output is `plaintext_size` bytes
    pub fn decrypt_block(&self, private_key: &PrivateKey, block: &[u8]) -> Result<Vec<u8>> {
        let ciphertext = decode_ciphertext(block, &private_key.p)?;
        let plaintext = self.decrypt(private_key, &ciphertext)?;
        encode_plaintext(&plaintext, &private_key.p)
    }
}
