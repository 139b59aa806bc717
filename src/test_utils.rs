//! Fixed key material for unit tests.

use num_bigint::BigUint;
use num_traits::Num;

use crate::keys::{DlogTable, KeyPair};
use crate::types::HomomorphicMode;

/// 256-bit safe prime, `(p - 1) / 2` is prime.
pub(crate) const TEST_P: &str = "c998ff967972196995c8de6284b5bf11a36ae4d26bd3767468e33bd0e61a5a7f";
/// Primitive root mod `TEST_P`.
pub(crate) const TEST_G: u32 = 5;
pub(crate) const TEST_X: &str = "23f72218796f474e7c9861519386be3dc6d09b39f1241522d2b2269b15e6ad9e";
/// `TEST_G ^ TEST_X mod TEST_P`
pub(crate) const TEST_H: &str = "921d7b27cd28c429dc7ab806d4cf2b8162a7954726efe12e913717621652a7bc";

pub(crate) const TEST_FIELD_SIZE: u64 = 1000;

pub(crate) fn hex(value: &str) -> BigUint {
    BigUint::from_str_radix(value, 16).unwrap()
}

/// 256-bit key pair; additive keys carry a signed table over `TEST_FIELD_SIZE`.
pub(crate) fn test_keypair(mode: HomomorphicMode) -> KeyPair {
    let p = hex(TEST_P);
    let g = BigUint::from(TEST_G);
    let table = match mode {
        HomomorphicMode::Additive => Some(DlogTable::build(&g, &p, TEST_FIELD_SIZE, true).unwrap()),
        HomomorphicMode::Multiplicative => None,
    };
    let keypair = KeyPair::from_components(p, g, hex(TEST_X), table).unwrap();
    assert_eq!(keypair.public_key.h, hex(TEST_H));
    keypair
}

/// `p = 23, g = 5, x = 6`, so `h = 8`.
pub(crate) fn toy_keypair(mode: HomomorphicMode) -> KeyPair {
    let p = BigUint::from(23u32);
    let g = BigUint::from(5u32);
    let table = match mode {
        HomomorphicMode::Additive => Some(DlogTable::build(&g, &p, 10, true).unwrap()),
        HomomorphicMode::Multiplicative => None,
    };
    KeyPair::from_components(p, g, BigUint::from(6u32), table).unwrap()
}
