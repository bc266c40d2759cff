//! Integration Tests: End-to-End Directory Flows
//!
//! Full add/search/update/delete sessions against every shipped backend,
//! including reopen-from-disk round trips.

use rolodex_core::config::{Backend, PersistenceConfig};
use rolodex_core::persistence::{ContactStore, JsonFileStore, MemoryStore, SqliteStore};
use rolodex_core::{Contact, ContactId, ContactPatch, Directory, NewContact, RolodexError};

fn ada() -> NewContact {
    NewContact::new("Ada", "Lovelace", "ada@x.com")
}

// ---------------------------------------------------------------------------
// Walkthrough: the canonical add → duplicate → search → delete session
// ---------------------------------------------------------------------------

#[test]
fn lovelace_turing_walkthrough() {
    let mut dir = Directory::open(MemoryStore::new());
    assert!(dir.is_empty());

    let first = dir.add(ada()).expect("first add");
    assert_eq!(dir.len(), 1);

    let err = dir
        .add(NewContact::new("Al", "Turing", "ADA@X.COM"))
        .expect_err("duplicate email");
    assert!(matches!(err, RolodexError::DuplicateEmail { .. }));
    assert_eq!(dir.len(), 1);

    assert!(dir.search("turing").is_empty());
    assert_eq!(dir.filtered_len(), 0);

    assert_eq!(dir.search("ada"), vec![first.clone()]);

    assert!(dir.delete(&first.id).expect("delete"));
    assert_eq!(dir.len(), 0);
    assert_eq!(dir.filtered_len(), 0);
}

// ---------------------------------------------------------------------------
// Persistence round trips through a fresh Directory
// ---------------------------------------------------------------------------

fn session_survives_reopen(config: &PersistenceConfig) {
    let (alan, grace) = {
        let mut dir = Directory::from_config(config).expect("open");
        dir.add(ada()).expect("add ada");
        let alan = dir
            .add(NewContact::new("Alan", "Turing", "alan@x.com").with_phone("+44 1908 640404"))
            .expect("add alan");
        let grace = dir
            .add(NewContact::new("Grace", "Hopper", "grace@x.com"))
            .expect("add grace");
        let ada_id = dir.find_by_email("ADA@x.com").map(|c| c.id.clone()).expect("ada");
        assert!(dir.delete(&ada_id).expect("delete"));
        let alan = dir
            .update(
                &alan.id,
                ContactPatch {
                    address: Some(Some("Bletchley Park".to_string())),
                    ..ContactPatch::default()
                },
            )
            .expect("update");
        (alan, grace)
    };

    let reopened = Directory::from_config(config).expect("reopen");
    assert_eq!(reopened.all_contacts(), vec![alan.clone(), grace]);
    let restored = reopened.find_by_id(&alan.id).expect("alan restored");
    assert_eq!(restored.created_at, alan.created_at);
    assert_eq!(restored.updated_at, alan.updated_at);
    assert_eq!(restored.address.as_deref(), Some("Bletchley Park"));
}

#[test]
fn sqlite_session_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    session_survives_reopen(&PersistenceConfig {
        backend: Backend::Sqlite,
        path: dir.path().join("rolodex.db"),
        ..PersistenceConfig::default()
    });
}

#[test]
fn json_session_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    session_survives_reopen(&PersistenceConfig {
        backend: Backend::Json,
        path: dir.path().join("rolodex.json"),
        ..PersistenceConfig::default()
    });
}

#[test]
fn clear_all_is_durable() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("rolodex.db");
    let config = PersistenceConfig::default();

    {
        let mut dir = Directory::open(SqliteStore::open(&path, &config).expect("open"));
        dir.add(ada()).expect("add");
        dir.clear_all();
    }

    let dir = Directory::open(SqliteStore::open(&path, &config).expect("reopen"));
    assert!(dir.is_empty());
}

// ---------------------------------------------------------------------------
// Stored data written by another producer
// ---------------------------------------------------------------------------

#[test]
fn foreign_ids_and_timestamps_are_preserved() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("contacts.json");
    std::fs::write(
        &path,
        r#"[
          {"id":"m1abc","firstName":"Ada","lastName":"Lovelace","email":"ada@x.com",
           "phone":"555-0100","createdAt":"2023-12-10T08:00:00.000Z",
           "updatedAt":"2024-01-05T17:30:12.345Z"},
          {"id":"m2def","firstName":"Alan","lastName":"Turing","email":"alan@x.com",
           "createdAt":"2023-12-11T08:00:00Z","updatedAt":"2023-12-11T08:00:00Z"}
        ]"#,
    )
    .expect("write");

    let mut dir = Directory::open(JsonFileStore::new(&path));
    assert_eq!(dir.len(), 2);
    let ada = dir.find_by_id(&ContactId::from("m1abc")).expect("ada").clone();
    assert_eq!(ada.updated_at.timestamp_millis(), 1_704_475_812_345);

    let err = dir
        .add(NewContact::new("Someone", "Else", "Alan@X.com"))
        .expect_err("loaded emails count for uniqueness");
    assert!(matches!(err, RolodexError::DuplicateEmail { .. }));

    let updated = dir
        .update(&ada.id, ContactPatch::email("countess@x.com"))
        .expect("update");
    assert_eq!(updated.created_at, ada.created_at);
    assert!(updated.updated_at > ada.updated_at);
}

#[test]
fn one_malformed_entry_discards_the_whole_store() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("contacts.json");
    std::fs::write(
        &path,
        r#"[
          {"id":"ok","firstName":"Ada","lastName":"Lovelace","email":"ada@x.com",
           "createdAt":"2023-12-10T08:00:00Z","updatedAt":"2023-12-10T08:00:00Z"},
          {"id":"bad","firstName":"Alan","email":"alan@x.com","createdAt":"yesterday"}
        ]"#,
    )
    .expect("write");

    let dir = Directory::open(JsonFileStore::new(&path));
    assert!(dir.is_empty());
}

// ---------------------------------------------------------------------------
// Write failures leave memory matching the store
// ---------------------------------------------------------------------------

#[test]
fn memory_never_runs_ahead_of_the_store() {
    let store = MemoryStore::new();
    let mut dir = Directory::open(store.clone());
    let first = dir.add(ada()).expect("add");
    dir.search("a");

    store.fail_saves(true);
    assert!(dir.add(NewContact::new("Alan", "Turing", "alan@x.com")).is_err());
    assert!(dir.update(&first.id, ContactPatch::email("new@x.com")).is_err());
    assert!(dir.delete(&first.id).is_err());

    assert_eq!(dir.all_contacts(), store.load());
    assert_eq!(dir.filtered_contacts(), vec![first]);

    store.fail_saves(false);
    dir.add(NewContact::new("Alan", "Turing", "alan@x.com")).expect("retry works");
    assert_eq!(dir.all_contacts(), store.load());

    let counters = dir.counters();
    assert_eq!(counters.save_failures, 3);
    assert_eq!(counters.contacts_added, 2);
}

#[test]
fn boxed_store_can_be_swapped_in() {
    let boxed: Box<dyn ContactStore> = Box::new(MemoryStore::new());
    let mut dir = Directory::open_boxed(boxed);
    let c: Contact = dir.add(ada()).expect("add");
    assert_eq!(dir.find_by_email("ada@x.com"), Some(&c));
}
