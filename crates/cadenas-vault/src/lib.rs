//! `cadenas-vault` — Vault business logic for CADENAS.
//!
//! PIN identity registration, per-PIN encrypted record storage, and the
//! save / list / reveal / delete operation set. Cryptographic primitives
//! live in `cadenas-crypto-core`; this crate owns everything that touches
//! persistence.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod db;
pub mod error;
pub mod service;
pub mod store;

pub use db::SqliteStore;
pub use error::VaultError;
pub use service::VaultService;
pub use store::{IdentityRecord, MemoryStore, Vault, VaultStore};
