//! AES-256-CBC encryption of individual vault secrets.
//!
//! One [`EncryptedRecord`] holds one secret: a fresh random 16-byte IV plus
//! the PKCS#7-padded ciphertext. CBC carries no authentication tag — a
//! padding (or UTF-8) failure on decrypt is the only wrong-key signal, and a
//! wrong key can in principle produce garbage that passes both checks. That
//! limitation is part of this system's storage contract; see `DESIGN.md`.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::error::CryptoError;
use crate::kdf::DerivedKey;

/// AES-CBC initialization vector length in bytes (one AES block).
pub const IV_LEN: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Ciphertext container for one stored secret.
///
/// Both fields serialize as plain numeric byte arrays (JSON `number[]`), so
/// records survive any JSON-shaped key-value store without binary handling.
/// The serialized field name for the ciphertext is `encrypted`.
#[must_use = "encrypted records must be stored"]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedRecord {
    /// Random 128-bit IV, unique per encryption call.
    pub iv: [u8; IV_LEN],
    /// PKCS#7-padded AES-256-CBC ciphertext.
    #[serde(rename = "encrypted")]
    pub ciphertext: Vec<u8>,
}

/// Encrypt a plaintext secret under a derived key.
///
/// A new random IV is drawn from the OS CSPRNG for every call: encrypting the
/// same plaintext twice under the same key yields different records.
///
/// # Errors
///
/// Returns `CryptoError::Rng` if the OS random source is unavailable —
/// encryption fails outright rather than reusing or zero-filling an IV.
pub fn encrypt(key: &DerivedKey, plaintext: &str) -> Result<EncryptedRecord, CryptoError> {
    let mut iv = [0u8; IV_LEN];
    OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|e| CryptoError::Rng(format!("CSPRNG fill failed: {e}")))?;

    let ciphertext = Aes256CbcEnc::new(key.expose().into(), (&iv).into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    Ok(EncryptedRecord { iv, ciphertext })
}

/// Decrypt a stored record back to its plaintext secret.
///
/// The result is wrapped in [`Zeroizing`] so the revealed secret is wiped
/// from memory when the caller drops it.
///
/// # Errors
///
/// Returns `CryptoError::Decryption` when the padding is invalid for the
/// given key, or when the unpadded bytes are not valid UTF-8. Both cases
/// mean the same thing to callers: wrong key or corrupt record.
pub fn decrypt(key: &DerivedKey, record: &EncryptedRecord) -> Result<Zeroizing<String>, CryptoError> {
    let padded = Aes256CbcDec::new(key.expose().into(), (&record.iv).into())
        .decrypt_padded_vec_mut::<Pkcs7>(&record.ciphertext)
        .map_err(|_| CryptoError::Decryption)?;

    match String::from_utf8(padded) {
        Ok(plaintext) => Ok(Zeroizing::new(plaintext)),
        Err(e) => {
            let mut garbage = e.into_bytes();
            garbage.zeroize();
            Err(CryptoError::Decryption)
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
