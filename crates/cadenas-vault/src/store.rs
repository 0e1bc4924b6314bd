//! Storage abstraction: the identity record, the per-PIN vault mapping, and
//! the [`VaultStore`] trait with its in-memory backend.
//!
//! The store is a plain key-value boundary. It never sees plaintext secrets
//! or key material — vault values are opaque [`EncryptedRecord`]s produced by
//! the cipher layer, and the only secret it holds is the registered PIN
//! itself (an accepted limitation of this design; see `DESIGN.md`).

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Mutex;

use cadenas_crypto_core::{EncryptedRecord, Pbkdf2Params, SALT_LEN};
use serde::{Deserialize, Serialize};

use crate::error::VaultError;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// The single registered identity: the accepted PIN, its registration salt,
/// and the KDF parameters stamped at registration time.
///
/// The salt is generated once from the CSPRNG when the identity is created
/// and persisted here — never the derived key. Parameters travel with the
/// identity so the iteration count can change for future registrations
/// without breaking existing vaults.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    /// The accepted credential.
    pub pin: String,
    /// Registration salt for key derivation.
    pub salt: [u8; SALT_LEN],
    /// KDF parameters in force for this identity.
    pub kdf: Pbkdf2Params,
}

impl fmt::Debug for IdentityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdentityRecord(***)")
    }
}

/// One PIN's vault: service name → encrypted record.
///
/// A `BTreeMap` keeps enumeration deterministic; insertion order carries no
/// meaning. Serializes transparently as a JSON object mapping each service
/// name to its `{iv, encrypted}` record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vault {
    records: BTreeMap<String, EncryptedRecord>,
}

impl Vault {
    /// Look up the record for a service.
    #[must_use]
    pub fn get(&self, service: &str) -> Option<&EncryptedRecord> {
        self.records.get(service)
    }

    /// Insert or overwrite the record for a service.
    pub fn upsert(&mut self, service: &str, record: EncryptedRecord) {
        self.records.insert(service.to_owned(), record);
    }

    /// Remove a service's record, returning it if present.
    pub fn remove(&mut self, service: &str) -> Option<EncryptedRecord> {
        self.records.remove(service)
    }

    /// Service names in this vault, in deterministic order.
    #[must_use]
    pub fn services(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Persistent key-value boundary for identity and vault state.
///
/// `put` is an atomic full replace of one PIN's vault: callers always
/// read-modify-write the whole mapping, never individual records. Each
/// service operation issues one `get` and at most one `put`.
pub trait VaultStore {
    /// Load the registered identity, if any.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] if the backend read fails.
    fn load_identity(&self) -> Result<Option<IdentityRecord>, VaultError>;

    /// Persist the registered identity.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] if the backend write fails.
    fn store_identity(&self, identity: &IdentityRecord) -> Result<(), VaultError>;

    /// Load the vault for a PIN. Unseen PINs yield an empty vault.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] if the backend read fails.
    fn get(&self, pin: &str) -> Result<Vault, VaultError>;

    /// Replace the vault for a PIN in one atomic write.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] if the backend write fails.
    fn put(&self, pin: &str, vault: &Vault) -> Result<(), VaultError>;
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// Non-durable [`VaultStore`] backend.
///
/// Mirrors the durable contract without touching disk — the backend for
/// tests and for hosts that manage persistence themselves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    identity: Option<IdentityRecord>,
    vaults: HashMap<String, Vault>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryInner>, VaultError> {
        self.inner
            .lock()
            .map_err(|_| VaultError::Storage("memory store lock poisoned".into()))
    }
}

impl VaultStore for MemoryStore {
    fn load_identity(&self) -> Result<Option<IdentityRecord>, VaultError> {
        Ok(self.lock()?.identity.clone())
    }

    fn store_identity(&self, identity: &IdentityRecord) -> Result<(), VaultError> {
        self.lock()?.identity = Some(identity.clone());
        Ok(())
    }

    fn get(&self, pin: &str) -> Result<Vault, VaultError> {
        Ok(self.lock()?.vaults.get(pin).cloned().unwrap_or_default())
    }

    fn put(&self, pin: &str, vault: &Vault) -> Result<(), VaultError> {
        self.lock()?.vaults.insert(pin.to_owned(), vault.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
