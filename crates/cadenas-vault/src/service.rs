//! Vault service façade — register, authenticate, save, list, reveal, delete.
//!
//! Composes key derivation, the record cipher, and a [`VaultStore`] backend.
//! The service holds no secret state of its own: every operation takes the
//! PIN as an explicit parameter, nothing is cached between calls, and
//! [`reveal_password`](VaultService::reveal_password) re-authenticates on
//! every invocation. Each operation issues one store read and at most one
//! store write.

use cadenas_crypto_core::{cipher, kdf, Pbkdf2Params};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::error::VaultError;
use crate::store::{IdentityRecord, VaultStore};

/// The vault façade over a storage backend.
pub struct VaultService<S: VaultStore> {
    store: S,
}

impl<S: VaultStore> VaultService<S> {
    /// Wrap a storage backend.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    ///
    /// Primarily for tests and host-side maintenance.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Register `pin` as the accepted identity.
    ///
    /// Generates a fresh registration salt and stamps the current KDF
    /// parameters. Exactly one identity exists at a time; the PIN is
    /// immutable once registered (this design has no PIN-change operation).
    ///
    /// # Errors
    ///
    /// - [`VaultError::AlreadyRegistered`] if an identity already exists.
    /// - [`VaultError::Crypto`] if the CSPRNG is unavailable.
    /// - [`VaultError::Storage`] if the backend fails.
    pub fn register(&self, pin: &str) -> Result<(), VaultError> {
        if self.store.load_identity()?.is_some() {
            return Err(VaultError::AlreadyRegistered);
        }

        let identity = IdentityRecord {
            pin: pin.to_owned(),
            salt: kdf::generate_salt()?,
            kdf: Pbkdf2Params::default(),
        };
        self.store.store_identity(&identity)?;

        info!("identity registered");
        Ok(())
    }

    /// True iff an identity has been registered.
    ///
    /// Hosts use this to decide between the registration and login flows.
    /// No authentication is performed.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] if the backend fails.
    pub fn is_registered(&self) -> Result<bool, VaultError> {
        Ok(self.store.load_identity()?.is_some())
    }

    /// True iff `candidate` matches the registered PIN.
    ///
    /// The comparison is constant-time in the PIN value. Returns `false`
    /// (not an error) when nothing is registered.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] if the backend fails.
    pub fn authenticate(&self, candidate: &str) -> Result<bool, VaultError> {
        let Some(identity) = self.store.load_identity()? else {
            return Ok(false);
        };
        Ok(constant_time_eq(
            identity.pin.as_bytes(),
            candidate.as_bytes(),
        ))
    }

    /// Encrypt `password` and store it under `service` in the vault keyed by
    /// `pin`, overwriting any existing record for that service.
    ///
    /// # Errors
    ///
    /// - [`VaultError::InvalidCredential`] if no identity is registered (the
    ///   registration salt parameterizes derivation).
    /// - [`VaultError::Crypto`] on derivation or encryption failure.
    /// - [`VaultError::Storage`] if the backend fails.
    pub fn save_password(
        &self,
        pin: &str,
        service: &str,
        password: &str,
    ) -> Result<(), VaultError> {
        let identity = self
            .store
            .load_identity()?
            .ok_or(VaultError::InvalidCredential)?;

        let key = kdf::derive(pin, &identity.salt, &identity.kdf)?;
        let record = cipher::encrypt(&key, password)?;

        let mut vault = self.store.get(pin)?;
        vault.upsert(service, record);
        self.store.put(pin, &vault)?;

        debug!("saved record for service ({} in namespace)", vault.len());
        Ok(())
    }

    /// Service names present in the vault keyed by `pin`.
    ///
    /// A pure store read: no decryption, no key derivation. Unseen PINs
    /// yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] if the backend fails.
    pub fn list_services(&self, pin: &str) -> Result<Vec<String>, VaultError> {
        Ok(self.store.get(pin)?.services())
    }

    /// Decrypt and return the password stored under `service`.
    ///
    /// The caller must re-collect the PIN from the user immediately before
    /// this call: `reentered_pin` has to match both the owning `pin` and the
    /// registered identity. The returned plaintext is wrapped in
    /// [`Zeroizing`] and wiped when dropped.
    ///
    /// # Errors
    ///
    /// - [`VaultError::InvalidCredential`] if no identity is registered or
    ///   the re-entered PIN does not match.
    /// - [`VaultError::NotFound`] if `service` has no record.
    /// - [`VaultError::Crypto`] (`Decryption`) if the record does not open
    ///   under the derived key — treated as "wrong PIN" by callers.
    /// - [`VaultError::Storage`] if the backend fails.
    pub fn reveal_password(
        &self,
        pin: &str,
        reentered_pin: &str,
        service: &str,
    ) -> Result<Zeroizing<String>, VaultError> {
        let identity = self
            .store
            .load_identity()?
            .ok_or(VaultError::InvalidCredential)?;

        // Both comparisons always run: a short-circuit would leak which
        // check failed through timing.
        let matches_owner = constant_time_eq(reentered_pin.as_bytes(), pin.as_bytes());
        let matches_identity =
            constant_time_eq(reentered_pin.as_bytes(), identity.pin.as_bytes());
        if !(matches_owner && matches_identity) {
            return Err(VaultError::InvalidCredential);
        }

        let vault = self.store.get(pin)?;
        let record = vault
            .get(service)
            .ok_or_else(|| VaultError::NotFound(service.to_owned()))?;

        let key = kdf::derive(reentered_pin, &identity.salt, &identity.kdf)?;
        Ok(cipher::decrypt(&key, record)?)
    }

    /// Remove the record for `service` from the vault keyed by `pin`.
    ///
    /// A no-op (not an error, and no write) if the service is absent.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] if the backend fails.
    pub fn delete_password(&self, pin: &str, service: &str) -> Result<(), VaultError> {
        let mut vault = self.store.get(pin)?;
        if vault.remove(service).is_none() {
            debug!("delete ignored: service absent");
            return Ok(());
        }
        self.store.put(pin, &vault)?;

        debug!("deleted record for service ({} in namespace)", vault.len());
        Ok(())
    }
}

/// Constant-time byte comparison for PIN material.
///
/// Uses bitwise OR accumulation to avoid short-circuit timing leaks. The
/// early return on length mismatch is acceptable because PIN length is not
/// treated as secret — the constant-time property protects the *value*.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
