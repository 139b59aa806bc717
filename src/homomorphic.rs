//! Homomorphic operations on ciphertexts
//!
//! Both modes combine ciphertexts the same way underneath: component-wise
//! products and component-wise powers mod `p`. What that computes on the
//! plaintexts depends on the mode, so each mode gets its own vocabulary:
//!
//! | operation         | additive mode          | multiplicative mode    |
//! |-------------------|------------------------|------------------------|
//! | component product | `add`: `m1 + m2`       | `multiply`: `m1 * m2`  |
//! | component power   | `scalar_multiply`: `k*m` | `power`: `m^k`       |
//! | inverse product   | `subtract`: `m1 - m2`  | `divide`: `m1 / m2`    |
//! | fold              | `sum`, `sum_of_products` | `product`            |
//!
//! Calling an operation of the other mode returns
//! [`ElGamalError::UnsupportedOperation`].

use num_bigint::{BigInt, BigUint};
use num_traits::One;

use crate::encryption::{ElGamal, Encryptor};
use crate::error::{ElGamalError, Result};
use crate::keys::PublicKey;
use crate::types::{Ciphertext, HomomorphicMode};
use crate::utils::{mod_exp, mod_inverse, reduce_exponent};

/// Trait for homomorphic operations
pub trait HomomorphicOperations {
    /// Additive mode: encryption of `scalar * m`. Negative scalars are
    /// reduced modulo `p - 1`.
    fn scalar_multiply(
        &self,
        ciphertext: &Ciphertext,
        scalar: &BigInt,
        public_key: &PublicKey,
    ) -> Result<Ciphertext>;

    /// Additive mode: encryption of `m_a + m_b`
    fn add(&self, ct_a: &Ciphertext, ct_b: &Ciphertext, public_key: &PublicKey)
        -> Result<Ciphertext>;

    /// Additive mode: `add(ct_a, scalar_multiply(ct_b, -1))`
    fn subtract(
        &self,
        ct_a: &Ciphertext,
        ct_b: &Ciphertext,
        public_key: &PublicKey,
    ) -> Result<Ciphertext>;

    /// Additive mode: fold `add` over the first `min(limit, len)` ciphertexts,
    /// starting from a fresh encryption of zero. `limit == 0` returns that
    /// encryption of zero.
    fn sum(&self, values: &[Ciphertext], public_key: &PublicKey, limit: usize)
        -> Result<Ciphertext>;

    /// Additive mode: encrypted dot product of `ciphertexts` with plaintext
    /// `weights`. Both slices must have the same length.
    fn sum_of_products(
        &self,
        public_key: &PublicKey,
        ciphertexts: &[Ciphertext],
        weights: &[BigInt],
    ) -> Result<Ciphertext>;

    /// Multiplicative mode: encryption of `m_a * m_b mod p`
    fn multiply(
        &self,
        ct_a: &Ciphertext,
        ct_b: &Ciphertext,
        public_key: &PublicKey,
    ) -> Result<Ciphertext>;

    /// Multiplicative mode: encryption of `m_a * m_b^-1 mod p`
    fn divide(
        &self,
        ct_numerator: &Ciphertext,
        ct_denominator: &Ciphertext,
        public_key: &PublicKey,
    ) -> Result<Ciphertext>;

    /// Multiplicative mode: encryption of `m^exponent mod p`
    fn power(
        &self,
        ciphertext: &Ciphertext,
        exponent: &BigInt,
        public_key: &PublicKey,
    ) -> Result<Ciphertext>;

    /// Multiplicative mode: fold `multiply` over the first `min(limit, len)`
    /// ciphertexts, starting from a fresh encryption of one.
    fn product(
        &self,
        values: &[Ciphertext],
        public_key: &PublicKey,
        limit: usize,
    ) -> Result<Ciphertext>;
}

/// Component-wise product mod p
fn combine(ct_a: &Ciphertext, ct_b: &Ciphertext, p: &BigUint) -> Ciphertext {
    Ciphertext::new((&ct_a.c1 * &ct_b.c1) % p, (&ct_a.c2 * &ct_b.c2) % p)
}

/// Component-wise power mod p
fn exponentiate(ct: &Ciphertext, exp: &BigInt, p: &BigUint) -> Ciphertext {
    let exp = reduce_exponent(exp, &(p - BigUint::one()));
    Ciphertext::new(mod_exp(&ct.c1, &exp, p), mod_exp(&ct.c2, &exp, p))
}

impl ElGamal {
    fn require_mode(&self, mode: HomomorphicMode, operation: &'static str) -> Result<()> {
        if self.mode() != mode {
            return Err(ElGamalError::UnsupportedOperation {
                mode: self.mode(),
                operation,
            });
        }
        Ok(())
    }

    fn fold(
        &self,
        identity: Ciphertext,
        values: &[Ciphertext],
        public_key: &PublicKey,
        limit: usize,
    ) -> Ciphertext {
        values
            .iter()
            .take(limit)
            .fold(identity, |acc, ct| combine(&acc, ct, &public_key.p))
    }
}

impl HomomorphicOperations for ElGamal {
    fn scalar_multiply(
        &self,
        ciphertext: &Ciphertext,
        scalar: &BigInt,
        public_key: &PublicKey,
    ) -> Result<Ciphertext> {
        self.require_mode(HomomorphicMode::Additive, "scalar multiplication")?;
        Ok(exponentiate(ciphertext, scalar, &public_key.p))
    }

    fn add(
        &self,
        ct_a: &Ciphertext,
        ct_b: &Ciphertext,
        public_key: &PublicKey,
    ) -> Result<Ciphertext> {
        self.require_mode(HomomorphicMode::Additive, "addition")?;
        Ok(combine(ct_a, ct_b, &public_key.p))
    }

    fn subtract(
        &self,
        ct_a: &Ciphertext,
        ct_b: &Ciphertext,
        public_key: &PublicKey,
    ) -> Result<Ciphertext> {
        let neg_b = self.scalar_multiply(ct_b, &BigInt::from(-1), public_key)?;
        self.add(ct_a, &neg_b, public_key)
    }

    fn sum(
        &self,
        values: &[Ciphertext],
        public_key: &PublicKey,
        limit: usize,
    ) -> Result<Ciphertext> {
        self.require_mode(HomomorphicMode::Additive, "sum")?;
        let zero = self.encrypt(public_key, &BigUint::from(0u32))?;
        Ok(self.fold(zero, values, public_key, limit))
    }

    fn sum_of_products(
        &self,
        public_key: &PublicKey,
        ciphertexts: &[Ciphertext],
        weights: &[BigInt],
    ) -> Result<Ciphertext> {
        self.require_mode(HomomorphicMode::Additive, "sum of products")?;

        if ciphertexts.len() != weights.len() {
            return Err(ElGamalError::LengthMismatch(format!(
                "ciphertexts: {}, weights: {}",
                ciphertexts.len(),
                weights.len()
            )));
        }

        let terms = ciphertexts
            .iter()
            .zip(weights)
            .map(|(ct, w)| self.scalar_multiply(ct, w, public_key))
            .collect::<Result<Vec<_>>>()?;

        self.sum(&terms, public_key, terms.len())
    }

    fn multiply(
        &self,
        ct_a: &Ciphertext,
        ct_b: &Ciphertext,
        public_key: &PublicKey,
    ) -> Result<Ciphertext> {
        self.require_mode(HomomorphicMode::Multiplicative, "multiplication")?;
        Ok(combine(ct_a, ct_b, &public_key.p))
    }

    fn divide(
        &self,
        ct_numerator: &Ciphertext,
        ct_denominator: &Ciphertext,
        public_key: &PublicKey,
    ) -> Result<Ciphertext> {
        self.require_mode(HomomorphicMode::Multiplicative, "division")?;

        let p = &public_key.p;
        let c1_inv = mod_inverse(&ct_denominator.c1, p).ok_or(ElGamalError::ModularInverseError)?;
        let c2_inv = mod_inverse(&ct_denominator.c2, p).ok_or(ElGamalError::ModularInverseError)?;

        Ok(combine(ct_numerator, &Ciphertext::new(c1_inv, c2_inv), p))
    }

    fn power(
        &self,
        ciphertext: &Ciphertext,
        exponent: &BigInt,
        public_key: &PublicKey,
    ) -> Result<Ciphertext> {
        self.require_mode(HomomorphicMode::Multiplicative, "power")?;
        Ok(exponentiate(ciphertext, exponent, &public_key.p))
    }

    fn product(
        &self,
        values: &[Ciphertext],
        public_key: &PublicKey,
        limit: usize,
    ) -> Result<Ciphertext> {
        self.require_mode(HomomorphicMode::Multiplicative, "product")?;
        let one = self.encrypt(public_key, &BigUint::one())?;
        Ok(self.fold(one, values, public_key, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryption::{decode_signed, Decryptor};
    use crate::keys::KeyPair;
    use crate::test_utils::test_keypair;

    fn additive() -> (KeyPair, ElGamal) {
        (
            test_keypair(HomomorphicMode::Additive),
            ElGamal::new(HomomorphicMode::Additive),
        )
    }

    fn multiplicative() -> (KeyPair, ElGamal) {
        (
            test_keypair(HomomorphicMode::Multiplicative),
            ElGamal::new(HomomorphicMode::Multiplicative),
        )
    }

    fn enc(elgamal: &ElGamal, keypair: &KeyPair, m: u32) -> Ciphertext {
        elgamal.encrypt(&keypair.public_key, &BigUint::from(m)).unwrap()
    }

    fn dec(elgamal: &ElGamal, keypair: &KeyPair, ct: &Ciphertext) -> BigUint {
        elgamal.decrypt(&keypair.private_key, ct).unwrap()
    }

    #[test]
    fn test_homomorphic_addition() {
        let (keypair, elgamal) = additive();
        let ct1 = enc(&elgamal, &keypair, 15);
        let ct2 = enc(&elgamal, &keypair, 25);

        let ct_sum = elgamal.add(&ct1, &ct2, &keypair.public_key).unwrap();
        assert_eq!(dec(&elgamal, &keypair, &ct_sum), BigUint::from(40u32));

        // operands are untouched
        assert_eq!(dec(&elgamal, &keypair, &ct1), BigUint::from(15u32));
        assert_eq!(dec(&elgamal, &keypair, &ct2), BigUint::from(25u32));
    }

    #[test]
    fn test_scalar_multiplication() {
        let (keypair, elgamal) = additive();
        let ct = enc(&elgamal, &keypair, 12);

        let scaled = elgamal
            .scalar_multiply(&ct, &BigInt::from(7), &keypair.public_key)
            .unwrap();
        assert_eq!(dec(&elgamal, &keypair, &scaled), BigUint::from(84u32));

        let negated = elgamal
            .scalar_multiply(&ct, &BigInt::from(-3), &keypair.public_key)
            .unwrap();
        let value = dec(&elgamal, &keypair, &negated);
        assert_eq!(decode_signed(&value, &keypair.public_key), BigInt::from(-36));
    }

    #[test]
    fn test_subtraction() {
        let (keypair, elgamal) = additive();
        let ct_a = enc(&elgamal, &keypair, 200);
        let ct_b = enc(&elgamal, &keypair, 120);

        let diff = elgamal.subtract(&ct_a, &ct_b, &keypair.public_key).unwrap();
        assert_eq!(dec(&elgamal, &keypair, &diff), BigUint::from(80u32));

        let negative = elgamal.subtract(&ct_b, &ct_a, &keypair.public_key).unwrap();
        let value = dec(&elgamal, &keypair, &negative);
        assert_eq!(decode_signed(&value, &keypair.public_key), BigInt::from(-80));
    }

    #[test]
    fn test_sum_respects_limit() {
        let (keypair, elgamal) = additive();
        let values: Vec<_> = [10u32, 20, 15, 5]
            .iter()
            .map(|v| enc(&elgamal, &keypair, *v))
            .collect();

        let all = elgamal.sum(&values, &keypair.public_key, 100).unwrap();
        assert_eq!(dec(&elgamal, &keypair, &all), BigUint::from(50u32));

        let first_two = elgamal.sum(&values, &keypair.public_key, 2).unwrap();
        assert_eq!(dec(&elgamal, &keypair, &first_two), BigUint::from(30u32));

        let none = elgamal.sum(&values, &keypair.public_key, 0).unwrap();
        assert_eq!(dec(&elgamal, &keypair, &none), BigUint::from(0u32));

        let empty = elgamal.sum(&[], &keypair.public_key, 3).unwrap();
        assert_eq!(dec(&elgamal, &keypair, &empty), BigUint::from(0u32));
    }

    #[test]
    fn test_sum_of_products() {
        let (keypair, elgamal) = additive();
        let ciphertexts: Vec<_> = [10u32, 20, 30]
            .iter()
            .map(|v| enc(&elgamal, &keypair, *v))
            .collect();
        let weights = vec![BigInt::from(2), BigInt::from(3), BigInt::from(4)];

        // 2*10 + 3*20 + 4*30 = 200
        let result = elgamal
            .sum_of_products(&keypair.public_key, &ciphertexts, &weights)
            .unwrap();
        assert_eq!(dec(&elgamal, &keypair, &result), BigUint::from(200u32));
    }

    #[test]
    fn test_sum_of_products_length_mismatch() {
        let (keypair, elgamal) = additive();
        let ciphertexts = vec![enc(&elgamal, &keypair, 1), enc(&elgamal, &keypair, 2)];
        let weights = vec![BigInt::from(1)];

        assert!(matches!(
            elgamal.sum_of_products(&keypair.public_key, &ciphertexts, &weights),
            Err(ElGamalError::LengthMismatch(_))
        ));
    }

    #[test]
    fn test_homomorphic_multiplication() {
        let (keypair, elgamal) = multiplicative();
        let ct1 = enc(&elgamal, &keypair, 7);
        let ct2 = enc(&elgamal, &keypair, 6);

        let ct_product = elgamal.multiply(&ct1, &ct2, &keypair.public_key).unwrap();
        assert_eq!(dec(&elgamal, &keypair, &ct_product), BigUint::from(42u32));
    }

    #[test]
    fn test_division_in_multiplicative_mode() {
        let (keypair, elgamal) = multiplicative();
        let ct_a = enc(&elgamal, &keypair, 84);
        let ct_b = enc(&elgamal, &keypair, 12);

        let quotient = elgamal.divide(&ct_a, &ct_b, &keypair.public_key).unwrap();
        assert_eq!(dec(&elgamal, &keypair, &quotient), BigUint::from(7u32));
    }

    #[test]
    fn test_power_and_product() {
        let (keypair, elgamal) = multiplicative();
        let ct = enc(&elgamal, &keypair, 3);

        let cubed = elgamal.power(&ct, &BigInt::from(3), &keypair.public_key).unwrap();
        assert_eq!(dec(&elgamal, &keypair, &cubed), BigUint::from(27u32));

        let inverse = elgamal.power(&ct, &BigInt::from(-1), &keypair.public_key).unwrap();
        let three_inv = mod_inverse(&BigUint::from(3u32), &keypair.public_key.p).unwrap();
        assert_eq!(dec(&elgamal, &keypair, &inverse), three_inv);

        let values: Vec<_> = [2u32, 3, 5, 7]
            .iter()
            .map(|v| enc(&elgamal, &keypair, *v))
            .collect();
        let product = elgamal.product(&values, &keypair.public_key, values.len()).unwrap();
        assert_eq!(dec(&elgamal, &keypair, &product), BigUint::from(210u32));

        let identity = elgamal.product(&values, &keypair.public_key, 0).unwrap();
        assert_eq!(dec(&elgamal, &keypair, &identity), BigUint::one());
    }

    #[test]
    fn test_operations_are_mode_checked() {
        let (keypair, elgamal) = multiplicative();
        let ct = enc(&elgamal, &keypair, 2);
        let pk = &keypair.public_key;

        assert!(matches!(
            elgamal.add(&ct, &ct, pk),
            Err(ElGamalError::UnsupportedOperation { mode: HomomorphicMode::Multiplicative, .. })
        ));
        assert!(elgamal.subtract(&ct, &ct, pk).is_err());
        assert!(elgamal.scalar_multiply(&ct, &BigInt::from(2), pk).is_err());
        assert!(elgamal.sum(&[ct.clone()], pk, 1).is_err());
        assert!(elgamal
            .sum_of_products(pk, &[ct.clone()], &[BigInt::from(1)])
            .is_err());

        let (keypair, elgamal) = additive();
        let ct = enc(&elgamal, &keypair, 2);
        let pk = &keypair.public_key;

        assert!(matches!(
            elgamal.multiply(&ct, &ct, pk),
            Err(ElGamalError::UnsupportedOperation { mode: HomomorphicMode::Additive, .. })
        ));
        assert!(elgamal.divide(&ct, &ct, pk).is_err());
        assert!(elgamal.power(&ct, &BigInt::from(2), pk).is_err());
        assert!(elgamal.product(&[ct.clone()], pk, 1).is_err());
    }
}
