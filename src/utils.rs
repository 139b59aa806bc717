//! Modular arithmetic helpers and the prime search used by key generation

use log::debug;
use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::{ExtendedGcd, Integer};
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};

use crate::error::{ElGamalError, Result};

/// Draw a uniformly distributed integer in `[0, bound)`.
///
/// `RandBigInt::gen_biguint_below` rejects candidates at or above the bound
/// instead of reducing them, so small values are not favoured.
pub fn random_below<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    bound: &BigUint,
) -> Result<BigUint> {
    if bound.is_zero() {
        return Err(ElGamalError::InvalidParameter(
            "random bound must be positive".to_string(),
        ));
    }
    Ok(rng.gen_biguint_below(bound))
}

/// Modular exponentiation: base^exp mod modulus
pub fn mod_exp(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    base.modpow(exp, modulus)
}

/// Modular inverse of `a` mod `m`, or `None` when `gcd(a, m) != 1`.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    if m.is_zero() {
        return None;
    }

    let a = BigInt::from(a.clone());
    let m = BigInt::from(m.clone());
    let ExtendedGcd { gcd, x, .. } = a.extended_gcd(&m);
    if !gcd.is_one() {
        return None;
    }

    x.mod_floor(&m).to_biguint()
}

pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    a.gcd(b)
}

/// Reduce a signed exponent into `[0, order)`.
///
/// Every element of Z*_p satisfies `a^(p-1) = 1`, so exponents may be taken
/// modulo `p - 1`; this is how negative scalars are applied to ciphertexts.
pub fn reduce_exponent(exp: &BigInt, order: &BigUint) -> BigUint {
    let order = BigInt::from(order.clone());
    exp.mod_floor(&order).to_biguint().unwrap_or_default()
}

/// Generate a safe prime `p = 2q + 1` of exactly `bit_size` bits.
///
/// Returns `(p, q)`.
pub fn generate_safe_prime<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    bit_size: u64,
    rounds: usize,
) -> Result<(BigUint, BigUint)> {
    if bit_size < 3 {
        return Err(ElGamalError::InvalidKeySize(bit_size));
    }

    let max_iterations = if bit_size <= 512 { 500_000 } else { 200_000 };

    for iteration in 1..=max_iterations {
        let mut q = rng.gen_biguint(bit_size - 1);
        q.set_bit(0, true);
        q.set_bit(bit_size - 2, true);

        if !is_probable_prime(rng, &q, rounds) {
            continue;
        }

        let p = &q * 2u32 + 1u32;
        if p.bits() == bit_size && is_probable_prime(rng, &p, rounds) {
            debug!("found {}-bit safe prime after {} candidates", bit_size, iteration);
            return Ok((p, q));
        }
    }

    Err(ElGamalError::CryptoError(format!(
        "Failed to generate {}-bit safe prime after {} iterations",
        bit_size, max_iterations
    )))
}

/// Generate a prime of exactly `bit_size` bits, not necessarily safe.
pub fn generate_prime<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    bit_size: u64,
    rounds: usize,
) -> Result<BigUint> {
    if bit_size < 2 {
        return Err(ElGamalError::InvalidKeySize(bit_size));
    }

    let max_iterations = 100_000;

    for _ in 0..max_iterations {
        let mut candidate = rng.gen_biguint(bit_size);
        candidate.set_bit(0, true);
        candidate.set_bit(bit_size - 1, true);

        if is_probable_prime(rng, &candidate, rounds) {
            return Ok(candidate);
        }
    }

    Err(ElGamalError::CryptoError(format!(
        "Failed to generate {}-bit prime after {} iterations",
        bit_size, max_iterations
    )))
}

/// Miller-Rabin primality test
pub fn is_probable_prime<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    n: &BigUint,
    rounds: usize,
) -> bool {
    let two = BigUint::from(2u32);
    let three = BigUint::from(3u32);

    if n < &two {
        return false;
    }
    if n == &two || n == &three {
        return true;
    }
    if n.is_even() {
        return false;
    }

    let n_minus_1 = n - BigUint::one();
    let (s, d) = factor_powers_of_two(&n_minus_1);

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_1);
        let mut x = mod_exp(&a, &d, n);

        if x.is_one() || x == n_minus_1 {
            continue;
        }

        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n_minus_1 {
                continue 'witness;
            }
        }

        return false;
    }

    true
}

/// Factor out powers of 2 from n, returning `(s, d)` with `n = 2^s * d`.
pub fn factor_powers_of_two(n: &BigUint) -> (u64, BigUint) {
    let s = n.trailing_zeros().unwrap_or(0);
    (s, n >> s)
}

/// Find a generator for the multiplicative group modulo `p = 2q + 1`.
///
/// For a safe prime the only subgroup orders are 1, 2, q and 2q, so ruling
/// out `g^2 = 1` and `g^q = 1` leaves a primitive root.
pub fn find_generator<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    p: &BigUint,
    q: &BigUint,
) -> BigUint {
    let two = BigUint::from(2u32);
    let p_minus_1 = p - BigUint::one();

    loop {
        let g = rng.gen_biguint_range(&two, &p_minus_1);

        if !mod_exp(&g, &two, p).is_one() && !mod_exp(&g, q, p).is_one() {
            return g;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    #[test]
    fn test_mod_inverse() {
        let a = BigUint::from(3u32);
        let m = BigUint::from(11u32);
        let inv = mod_inverse(&a, &m).unwrap();

        assert_eq!(inv, BigUint::from(4u32));
        assert_eq!((a * inv) % m, BigUint::one());
    }

    #[test]
    fn test_mod_inverse_not_invertible() {
        assert!(mod_inverse(&BigUint::from(6u32), &BigUint::from(22u32)).is_none());
        assert!(mod_inverse(&BigUint::zero(), &BigUint::from(23u32)).is_none());
        assert!(mod_inverse(&BigUint::from(3u32), &BigUint::zero()).is_none());
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(&BigUint::from(12u32), &BigUint::from(18u32)), BigUint::from(6u32));
        assert_eq!(gcd(&BigUint::from(7u32), &BigUint::from(22u32)), BigUint::one());
    }

    #[test]
    fn test_reduce_exponent() {
        let order = BigUint::from(22u32);
        assert_eq!(reduce_exponent(&BigInt::from(-1), &order), BigUint::from(21u32));
        assert_eq!(reduce_exponent(&BigInt::from(-23), &order), BigUint::from(21u32));
        assert_eq!(reduce_exponent(&BigInt::from(5), &order), BigUint::from(5u32));
        assert_eq!(reduce_exponent(&BigInt::from(44), &order), BigUint::zero());
    }

    #[test]
    fn test_random_below_stays_in_range() {
        let mut rng = thread_rng();
        let bound = BigUint::from(11u32);
        for _ in 0..200 {
            assert!(random_below(&mut rng, &bound).unwrap() < bound);
        }
        assert!(random_below(&mut rng, &BigUint::zero()).is_err());
    }

    #[test]
    fn test_random_below_covers_small_range() {
        let mut rng = thread_rng();
        let bound = BigUint::from(4u32);
        let mut seen = [false; 4];
        for _ in 0..500 {
            let v = random_below(&mut rng, &bound).unwrap();
            seen[v.to_u32_digits().first().copied().unwrap_or(0) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_is_probable_prime() {
        let mut rng = thread_rng();
        for p in [2u32, 3, 5, 7, 11, 13, 23, 7919] {
            assert!(is_probable_prime(&mut rng, &BigUint::from(p), 20), "{} is prime", p);
        }
        for c in [0u32, 1, 4, 6, 8, 9, 10, 12, 15, 561, 7917] {
            assert!(!is_probable_prime(&mut rng, &BigUint::from(c), 20), "{} is composite", c);
        }
    }

    #[test]
    fn test_factor_powers_of_two() {
        let (s, d) = factor_powers_of_two(&BigUint::from(48u32));
        assert_eq!(s, 4);
        assert_eq!(d, BigUint::from(3u32));
    }

    #[test]
    fn test_find_generator_small_safe_prime() {
        let mut rng = thread_rng();
        let p = BigUint::from(23u32);
        let q = BigUint::from(11u32);
        let g = find_generator(&mut rng, &p, &q);

        // A primitive root mod 23 reaches all 22 non-zero residues.
        let mut seen = std::collections::HashSet::new();
        let mut acc = BigUint::one();
        for _ in 0..22 {
            acc = (&acc * &g) % &p;
            seen.insert(acc.clone());
        }
        assert_eq!(seen.len(), 22);
    }

    #[test]
    fn test_safe_prime_generation_small() {
        let mut rng = thread_rng();
        let (p, q) = generate_safe_prime(&mut rng, 64, 20).unwrap();
        assert_eq!(p, &q * 2u32 + 1u32);
        assert_eq!(p.bits(), 64);
        assert!(is_probable_prime(&mut rng, &q, 20));
    }
}
