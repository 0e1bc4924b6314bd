//! Cryptographic error types for `cadenas-crypto-core`.

use thiserror::Error;

/// Errors produced by cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key derivation failed (parameter validation).
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Padding, format, or encoding failure during decrypt — the ciphertext
    /// does not open under the given key. Deliberately carries no detail:
    /// callers surface this as "wrong PIN", never as cipher internals.
    #[error("decryption failed: invalid padding or corrupt ciphertext")]
    Decryption,

    /// The OS secure random source is unavailable. Encryption and salt
    /// generation fail outright rather than degrading to weak randomness.
    #[error("secure randomness unavailable: {0}")]
    Rng(String),
}
