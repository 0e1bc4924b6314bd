//! Vault error types for `cadenas-vault`.

use cadenas_crypto_core::CryptoError;
use thiserror::Error;

/// Errors produced by vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Cryptographic operation failed (delegated from crypto-core).
    /// `CryptoError::Decryption` means the supplied PIN does not open the
    /// record — callers present it as "wrong PIN", same as
    /// [`VaultError::InvalidCredential`].
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Register called while an identity already exists. Exactly one PIN is
    /// registered at a time.
    #[error("an identity is already registered")]
    AlreadyRegistered,

    /// The supplied PIN does not match the stored identity, or no identity
    /// is registered for an operation that needs one.
    #[error("invalid credential")]
    InvalidCredential,

    /// The named service has no record in the vault.
    #[error("service not found: {0}")]
    NotFound(String),

    /// Durable store read/write failed. An environment problem, not a wrong
    /// PIN — callers should retry or report, never swallow.
    #[error("storage unavailable: {0}")]
    Storage(String),

    /// Vault payload encode/decode failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for VaultError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
