//! PBKDF2 key derivation for PIN-based vault keys.
//!
//! This module provides:
//! - [`derive`] — derive a 256-bit key from a PIN + salt using PBKDF2-HMAC-SHA256
//! - [`generate_salt`] — fresh registration salt from the OS CSPRNG
//! - [`Pbkdf2Params`] — serializable parameter set (stored with the identity record)
//! - [`DerivedKey`] — opaque key handle, never persisted, never exported
//!
//! # Determinism Contract
//!
//! The same (PIN, salt, iteration count) triple always yields bit-identical
//! key material. The vault relies on this to decrypt records after a restart
//! without ever storing the key itself. The salt is generated once at
//! registration and persisted alongside the identity — the key is not.

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretBox};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use zeroize::Zeroize;

use crate::error::CryptoError;

/// Output length of the KDF in bytes (256 bits, AES-256 key).
pub const KEY_LEN: usize = 32;

/// Registration salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// PBKDF2 parameter set — stored with the identity record.
///
/// Persisting the parameters next to the salt means the iteration count can
/// be raised for future registrations without breaking existing vaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pbkdf2Params {
    /// Number of PBKDF2 rounds over HMAC-SHA256.
    pub iterations: u32,
}

impl Default for Pbkdf2Params {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Opaque 256-bit symmetric key handle.
///
/// The raw bytes are held in a [`SecretBox`] (zeroized on drop) and are only
/// reachable from inside this crate — calling code can encrypt and decrypt
/// with a `DerivedKey` but can never read it back out.
pub struct DerivedKey {
    inner: SecretBox<[u8; KEY_LEN]>,
}

impl DerivedKey {
    /// Wrap raw key material. The caller should zeroize its copy afterwards.
    pub(crate) fn new(bytes: &[u8; KEY_LEN]) -> Self {
        Self {
            inner: SecretBox::new(Box::new(*bytes)),
        }
    }

    /// Expose the raw key for cipher construction. Crate-internal only.
    pub(crate) fn expose(&self) -> &[u8; KEY_LEN] {
        self.inner.expose_secret()
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(***)")
    }
}

// ---------------------------------------------------------------------------
// Core KDF
// ---------------------------------------------------------------------------

/// Derive a 256-bit key from a PIN and salt using PBKDF2-HMAC-SHA256.
///
/// Deterministic: the same inputs always produce the same key. Any PIN string
/// is accepted, including short or empty ones — no length or complexity rule
/// is enforced here, so the effective strength of the vault is bounded by the
/// entropy of the PIN. That constraint belongs to this design and is
/// documented rather than patched over.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` if:
/// - The salt is shorter than 16 bytes
/// - The iteration count is zero
pub fn derive(pin: &str, salt: &[u8], params: &Pbkdf2Params) -> Result<DerivedKey, CryptoError> {
    if salt.len() < SALT_LEN {
        return Err(CryptoError::KeyDerivation(format!(
            "salt too short: {} bytes (minimum {SALT_LEN})",
            salt.len()
        )));
    }
    if params.iterations == 0 {
        return Err(CryptoError::KeyDerivation(
            "iteration count must be non-zero".into(),
        ));
    }

    let mut output = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(pin.as_bytes(), salt, params.iterations, &mut output);

    let key = DerivedKey::new(&output);
    output.zeroize();
    Ok(key)
}

/// Generate a fresh random registration salt from the OS CSPRNG.
///
/// # Errors
///
/// Returns `CryptoError::Rng` if the OS random source is unavailable —
/// registration must fail rather than fall back to a predictable salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN], CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| CryptoError::Rng(format!("CSPRNG fill failed: {e}")))?;
    Ok(salt)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
