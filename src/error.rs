//! Error types for the ElGamal library

use thiserror::Error;

use crate::types::HomomorphicMode;

pub type Result<T> = std::result::Result<T, ElGamalError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElGamalError {
    #[error("Invalid key size: {0} bits (must be at least 512)")]
    InvalidKeySize(u64),

    #[error("Key type mismatch: expected a {expected} key, got a {found} key")]
    KeyTypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Plaintext must lie in [0, p)")]
    PlaintextOutOfRange,

    #[error("Ciphertext component must lie in [0, p)")]
    CiphertextOutOfRange,

    #[error("Signature component {component} is outside its valid range")]
    SignatureOutOfRange { component: &'static str },

    /// The recovered group element has no entry in the discrete-log table:
    /// wrong key, corrupted ciphertext, or a plaintext outside the field.
    #[error("Discrete log not found in lookup table")]
    DiscreteLogNotFound,

    #[error("Private key carries no discrete-log lookup table (required in additive mode)")]
    MissingLookupTable,

    #[error("Mismatched lengths: {0}")]
    LengthMismatch(String),

    #[error("Operation not supported in {mode:?} mode: {operation}")]
    UnsupportedOperation {
        mode: HomomorphicMode,
        operation: &'static str,
    },

    #[error("Cannot {operation} while signature engine is {state}")]
    ProtocolMisuse {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Failed to compute modular inverse")]
    ModularInverseError,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Cryptographic error: {0}")]
    CryptoError(String),
}
