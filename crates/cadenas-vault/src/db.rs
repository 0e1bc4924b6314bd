//! `SQLite`-backed durable store and migration runner.
//!
//! The durable layout matches the conceptual key-value scheme: one `identity`
//! row (the registered PIN, its salt, its KDF params) and one `vaults` row
//! per PIN holding the whole service→record mapping as JSON text. A `put` is
//! a single-row replace, which gives the atomic whole-vault write the store
//! contract requires.

use std::fmt;
use std::path::Path;

use cadenas_crypto_core::{Pbkdf2Params, SALT_LEN};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::VaultError;
use crate::store::{IdentityRecord, Vault, VaultStore};

// ---------------------------------------------------------------------------
// Embedded migrations
// ---------------------------------------------------------------------------

/// Forward-only SQL migrations, embedded at compile time.
/// Index 0 → version 1, index 1 → version 2, etc.
const MIGRATIONS: &[&str] = &[include_str!("../migrations/001_initial_schema.sql")];

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

/// Handle to an open, migrated vault database.
pub struct SqliteStore {
    conn: Connection,
}

impl fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SqliteStore(***)")
    }
}

impl SqliteStore {
    /// Open (or create) the vault database at `path`.
    ///
    /// Enables WAL journal mode and runs any pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] if the file cannot be opened or a
    /// migration fails.
    pub fn open(path: &Path) -> Result<Self, VaultError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;

        let mut store = Self { conn };
        store.run_migrations()?;
        Ok(store)
    }

    /// Returns the current schema version (`PRAGMA user_version`).
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] if the pragma query fails.
    pub fn schema_version(&self) -> Result<i32, VaultError> {
        let v: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;
        Ok(v)
    }

    /// Apply all pending migrations sequentially.
    ///
    /// Each migration runs in a transaction; `user_version` is bumped
    /// atomically on commit.
    fn run_migrations(&mut self) -> Result<(), VaultError> {
        let current = self.schema_version()?;

        for (idx, sql) in MIGRATIONS.iter().enumerate() {
            // Migration versions are 1-indexed: index 0 → version 1.
            let version = idx
                .checked_add(1)
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| VaultError::Storage("migration index overflow".into()))?;

            if version <= current {
                continue; // already applied
            }

            let tx = self.conn.transaction()?;
            tx.execute_batch(sql)
                .map_err(|e| VaultError::Storage(format!("migration {version} failed: {e}")))?;
            tx.pragma_update(None, "user_version", version)?;
            tx.commit()?;
        }

        Ok(())
    }
}

impl VaultStore for SqliteStore {
    fn load_identity(&self) -> Result<Option<IdentityRecord>, VaultError> {
        let row = self
            .conn
            .query_row("SELECT pin, salt, kdf FROM identity WHERE id = 1", [], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Vec<u8>>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .optional()?;

        let Some((pin, salt_bytes, kdf_json)) = row else {
            return Ok(None);
        };

        let salt: [u8; SALT_LEN] = salt_bytes
            .try_into()
            .map_err(|_| VaultError::Storage("identity salt has unexpected length".into()))?;
        let kdf: Pbkdf2Params = serde_json::from_str(&kdf_json)?;

        Ok(Some(IdentityRecord { pin, salt, kdf }))
    }

    fn store_identity(&self, identity: &IdentityRecord) -> Result<(), VaultError> {
        let kdf_json = serde_json::to_string(&identity.kdf)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO identity (id, pin, salt, kdf) VALUES (1, ?1, ?2, ?3)",
            params![identity.pin, &identity.salt[..], kdf_json],
        )?;
        Ok(())
    }

    fn get(&self, pin: &str) -> Result<Vault, VaultError> {
        let json: Option<String> = self
            .conn
            .query_row("SELECT records FROM vaults WHERE pin = ?1", [pin], |row| {
                row.get(0)
            })
            .optional()?;

        match json {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vault::default()),
        }
    }

    fn put(&self, pin: &str, vault: &Vault) -> Result<(), VaultError> {
        let json = serde_json::to_string(vault)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO vaults (pin, records) VALUES (?1, ?2)",
            params![pin, json],
        )?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
