//! `cadenas-crypto-core` — Pure cryptographic primitives for CADENAS.
//!
//! This crate is the audit target: zero storage, zero async dependencies.
//! It owns the PIN-to-key derivation and the per-record cipher; everything
//! that touches persistence lives in `cadenas-vault`.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod cipher;
pub mod error;
pub mod kdf;

pub use cipher::{decrypt, encrypt, EncryptedRecord, IV_LEN};
pub use error::CryptoError;
pub use kdf::{
    derive, generate_salt, DerivedKey, Pbkdf2Params, DEFAULT_ITERATIONS, KEY_LEN, SALT_LEN,
};
