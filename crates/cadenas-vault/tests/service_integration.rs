#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Integration tests for `VaultService` — the full register / authenticate /
//! save / list / reveal / delete operation set over the in-memory backend.

use cadenas_crypto_core::CryptoError;
use cadenas_vault::{MemoryStore, VaultError, VaultService};

fn fresh_service() -> VaultService<MemoryStore> {
    VaultService::new(MemoryStore::new())
}

// -------------------------------------------------------------------------
// Registration and authentication
// -------------------------------------------------------------------------

#[test]
fn is_registered_flips_after_register() {
    let service = fresh_service();
    assert!(!service.is_registered().expect("is_registered"));
    service.register("1234").expect("register");
    assert!(service.is_registered().expect("is_registered"));
}

#[test]
fn authenticate_accepts_registered_pin_only() {
    let service = fresh_service();
    service.register("1234").expect("register");
    assert!(service.authenticate("1234").expect("authenticate"));
    assert!(!service.authenticate("0000").expect("authenticate"));
    assert!(!service.authenticate("12345").expect("authenticate"));
}

#[test]
fn authenticate_without_identity_is_false_not_an_error() {
    let service = fresh_service();
    assert!(!service.authenticate("1234").expect("authenticate"));
}

#[test]
fn second_register_fails_and_first_pin_stays_authoritative() {
    let service = fresh_service();
    service.register("1234").expect("first register");

    let err = service
        .register("5678")
        .expect_err("second register must fail");
    assert!(matches!(err, VaultError::AlreadyRegistered));

    assert!(service.authenticate("1234").expect("authenticate"));
    assert!(!service.authenticate("5678").expect("authenticate"));
}

#[test]
fn registrations_of_the_same_pin_get_distinct_salts() {
    let a = fresh_service();
    let b = fresh_service();
    a.register("1234").expect("register");
    b.register("1234").expect("register");

    use cadenas_vault::VaultStore;
    let salt_a = a.store().load_identity().expect("load").expect("some").salt;
    let salt_b = b.store().load_identity().expect("load").expect("some").salt;
    assert_ne!(salt_a, salt_b, "registration salts must be random");
}

// -------------------------------------------------------------------------
// Save / list / reveal — the core scenario
// -------------------------------------------------------------------------

#[test]
fn register_save_list_reveal_scenario() {
    let service = fresh_service();
    service.register("1234").expect("register");
    service
        .save_password("1234", "github.com", "s3cr3t")
        .expect("save");

    assert_eq!(
        service.list_services("1234").expect("list"),
        vec!["github.com"]
    );

    let revealed = service
        .reveal_password("1234", "1234", "github.com")
        .expect("reveal with correct PIN");
    assert_eq!(&*revealed, "s3cr3t");

    let err = service
        .reveal_password("1234", "0000", "github.com")
        .expect_err("reveal with wrong PIN must fail");
    assert!(matches!(err, VaultError::InvalidCredential));
}

#[test]
fn save_overwrites_existing_record_for_service() {
    let service = fresh_service();
    service.register("1234").expect("register");
    service
        .save_password("1234", "mail.example", "old-password")
        .expect("save");
    service
        .save_password("1234", "mail.example", "new-password")
        .expect("save");

    assert_eq!(service.list_services("1234").expect("list").len(), 1);
    let revealed = service
        .reveal_password("1234", "1234", "mail.example")
        .expect("reveal");
    assert_eq!(&*revealed, "new-password");
}

#[test]
fn identical_saves_are_idempotent_in_the_listing() {
    let service = fresh_service();
    service.register("1234").expect("register");
    service
        .save_password("1234", "github.com", "s3cr3t")
        .expect("save");
    service
        .save_password("1234", "github.com", "s3cr3t")
        .expect("save");

    assert_eq!(
        service.list_services("1234").expect("list"),
        vec!["github.com"]
    );
    let revealed = service
        .reveal_password("1234", "1234", "github.com")
        .expect("reveal");
    assert_eq!(&*revealed, "s3cr3t");
}

#[test]
fn list_is_sorted_and_complete() {
    let service = fresh_service();
    service.register("1234").expect("register");
    for (name, password) in [("zzz.example", "a"), ("aaa.example", "b"), ("mmm.example", "c")] {
        service.save_password("1234", name, password).expect("save");
    }
    assert_eq!(
        service.list_services("1234").expect("list"),
        vec!["aaa.example", "mmm.example", "zzz.example"]
    );
}

#[test]
fn list_for_unseen_pin_is_empty() {
    let service = fresh_service();
    service.register("1234").expect("register");
    assert!(service.list_services("0000").expect("list").is_empty());
}

#[test]
fn unicode_passwords_roundtrip() {
    let service = fresh_service();
    service.register("1234").expect("register");
    service
        .save_password("1234", "banque.fr", "mot de passe: été🔐")
        .expect("save");
    let revealed = service
        .reveal_password("1234", "1234", "banque.fr")
        .expect("reveal");
    assert_eq!(&*revealed, "mot de passe: été🔐");
}

// -------------------------------------------------------------------------
// Reveal failure modes
// -------------------------------------------------------------------------

#[test]
fn reveal_missing_service_is_not_found() {
    let service = fresh_service();
    service.register("1234").expect("register");
    let err = service
        .reveal_password("1234", "1234", "absent.example")
        .expect_err("must fail");
    assert!(matches!(err, VaultError::NotFound(ref name) if name == "absent.example"));
}

#[test]
fn reveal_without_identity_is_invalid_credential() {
    let service = fresh_service();
    let err = service
        .reveal_password("1234", "1234", "github.com")
        .expect_err("must fail");
    assert!(matches!(err, VaultError::InvalidCredential));
}

#[test]
fn reveal_mismatch_is_checked_before_lookup() {
    let service = fresh_service();
    service.register("1234").expect("register");
    // Wrong re-entered PIN fails with InvalidCredential even when the
    // service does not exist — the credential check comes first.
    let err = service
        .reveal_password("1234", "0000", "absent.example")
        .expect_err("must fail");
    assert!(matches!(err, VaultError::InvalidCredential));
}

#[test]
fn corrupted_stored_record_never_reveals_the_original() {
    use cadenas_vault::VaultStore;

    let service = fresh_service();
    service.register("1234").expect("register");
    service
        .save_password("1234", "github.com", "s3cr3t")
        .expect("save");

    // Flip one ciphertext byte behind the service's back.
    let mut vault = service.store().get("1234").expect("get");
    let mut record = vault.get("github.com").expect("record").clone();
    if let Some(byte) = record.ciphertext.last_mut() {
        *byte ^= 0xFF;
    }
    vault.upsert("github.com", record);
    service.store().put("1234", &vault).expect("put");

    // CBC has no authentication tag: corruption usually trips the padding
    // check, occasionally unpads to garbage. The original must never come back.
    match service.reveal_password("1234", "1234", "github.com") {
        Err(VaultError::Crypto(CryptoError::Decryption)) => {}
        Err(other) => panic!("unexpected error: {other}"),
        Ok(garbage) => assert_ne!(&*garbage, "s3cr3t"),
    }
}

// -------------------------------------------------------------------------
// Delete
// -------------------------------------------------------------------------

#[test]
fn delete_removes_the_record() {
    let service = fresh_service();
    service.register("1234").expect("register");
    service
        .save_password("1234", "github.com", "s3cr3t")
        .expect("save");
    service
        .delete_password("1234", "github.com")
        .expect("delete");

    assert!(service.list_services("1234").expect("list").is_empty());
    let err = service
        .reveal_password("1234", "1234", "github.com")
        .expect_err("revealing a deleted service must fail");
    assert!(matches!(err, VaultError::NotFound(_)));
}

#[test]
fn delete_absent_service_is_a_noop() {
    let service = fresh_service();
    service.register("1234").expect("register");
    service
        .save_password("1234", "github.com", "s3cr3t")
        .expect("save");

    service
        .delete_password("1234", "never-saved.example")
        .expect("delete of absent service must succeed");

    assert_eq!(
        service.list_services("1234").expect("list"),
        vec!["github.com"],
        "vault contents must be unchanged"
    );
}

#[test]
fn delete_only_touches_the_named_service() {
    let service = fresh_service();
    service.register("1234").expect("register");
    service.save_password("1234", "a.example", "pw-a").expect("save");
    service.save_password("1234", "b.example", "pw-b").expect("save");

    service.delete_password("1234", "a.example").expect("delete");

    assert_eq!(service.list_services("1234").expect("list"), vec!["b.example"]);
    let revealed = service
        .reveal_password("1234", "1234", "b.example")
        .expect("reveal survivor");
    assert_eq!(&*revealed, "pw-b");
}

// -------------------------------------------------------------------------
// Save failure modes
// -------------------------------------------------------------------------

#[test]
fn save_without_identity_is_invalid_credential() {
    let service = fresh_service();
    let err = service
        .save_password("1234", "github.com", "s3cr3t")
        .expect_err("must fail");
    assert!(matches!(err, VaultError::InvalidCredential));
}
