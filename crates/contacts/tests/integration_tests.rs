//! Integration tests for the contacts crate
//!
//! These tests run the store over on-disk backends and exercise the flows
//! the admin tool relies on: submit, review, export, gate.

use chrono::{Duration, TimeZone, Utc};
use contacts::export::BOM;
use contacts::store::{BACKUP_KEY, PRIMARY_KEY};
use contacts::{
    AdminCredentials, ContactId, ContactInput, ContactMirror, ContactStatus, ContactStore,
    ExportFormat, FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, ManualClock,
    SessionGate, SessionState, SqliteContactArchive,
};
use std::sync::Arc;
use tempfile::TempDir;

/// Helper to build a store over a temp directory
fn file_store(dir: &TempDir, clock: Arc<ManualClock>) -> (Arc<FileKeyValueStore>, ContactStore) {
    let local = Arc::new(FileKeyValueStore::new(dir.path().join("local")).unwrap());
    let session = Arc::new(InMemoryKeyValueStore::new());
    let store = ContactStore::new(local.clone(), session).with_clock(clock);
    (local, store)
}

fn start_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 11, 5, 9, 0, 0).unwrap(),
    ))
}

fn input(name: &str, subject: &str) -> ContactInput {
    ContactInput::new(
        name,
        format!("{}@example.com", name.to_lowercase()),
        subject,
        "Message body",
    )
}

#[test]
fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let clock = start_clock();

    let created = {
        let (_, store) = file_store(&dir, clock.clone());
        store.create(input("Ada", "Hello")).unwrap()
    };

    let (_, reopened) = file_store(&dir, clock);
    let listed = reopened.list();
    assert_eq!(listed, vec![created]);
}

#[test]
fn test_admin_review_flow() {
    let dir = TempDir::new().unwrap();
    let clock = start_clock();
    let (_, store) = file_store(&dir, clock.clone());

    let mut ids = Vec::new();
    for (name, subject) in [("Ada", "A"), ("Bob", "B"), ("Cy", "C")] {
        ids.push(store.create(input(name, subject)).unwrap().id);
        clock.advance(Duration::minutes(5));
    }

    // Newest first
    let subjects: Vec<String> = store.list().into_iter().map(|r| r.subject).collect();
    assert_eq!(subjects, vec!["C", "B", "A"]);

    // Reply to the oldest, delete the middle one
    assert!(store.update_status(&ids[0], ContactStatus::Replied));
    assert!(store.delete(&ids[1]));
    assert!(!store.update_status(&ids[1], ContactStatus::Replied));

    let listed = store.list();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|r| r.id != ids[1]));

    let stats = store.statistics();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.replied, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.last_24h, 2);
}

#[test]
fn test_backup_slot_recovers_corrupt_primary() {
    let dir = TempDir::new().unwrap();
    let (local, store) = file_store(&dir, start_clock());
    store.create(input("Ada", "Hello")).unwrap();

    local.set(PRIMARY_KEY, "\u{0}\u{0}truncated").unwrap();
    assert_eq!(store.list().len(), 1);

    // The next write repairs the primary from the recovered list
    store.create(input("Bob", "Again")).unwrap();
    assert_eq!(local.get(PRIMARY_KEY).unwrap(), local.get(BACKUP_KEY).unwrap());
    assert_eq!(store.list().len(), 2);
}

#[test]
fn test_clear_all_deletes_files() {
    let dir = TempDir::new().unwrap();
    let (_, store) = file_store(&dir, start_clock());
    store.create(input("Ada", "Hello")).unwrap();

    assert!(store.clear_all());
    assert!(store.list().is_empty());
    assert!(!dir.path().join("local").join("portfolioContacts.json").exists());
    assert!(!dir.path().join("local").join("portfolioContactsBackup.json").exists());
}

#[test]
fn test_export_to_directory() {
    let dir = TempDir::new().unwrap();
    let (_, store) = file_store(&dir, start_clock());
    for i in 0..4 {
        store
            .create(input("Ada", &format!("Subject, part {}", i)))
            .unwrap();
    }

    let out = dir.path().join("out");
    std::fs::create_dir_all(&out).unwrap();

    assert!(store.export_to(ExportFormat::Csv, &out));
    let csv = std::fs::read_to_string(out.join("portfolio-contacts-2024-11-05.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 5);
    for line in &lines {
        for field in line.split("\",\"") {
            assert!(!field.is_empty());
        }
        assert!(line.starts_with('"') && line.ends_with('"'));
    }

    assert!(store.export_to(ExportFormat::Excel, &out));
    let excel =
        std::fs::read_to_string(out.join("portfolio-contacts-2024-11-05.xlsx.csv")).unwrap();
    assert!(excel.starts_with(BOM));
    assert_eq!(excel.lines().count(), 5);
    assert!(excel.contains(",\"Subject, part 0\","));
    assert!(excel.contains(",2024-11-05,09:00:00,pending,"));
}

#[test]
fn test_export_to_fails_without_records() {
    let dir = TempDir::new().unwrap();
    let (_, store) = file_store(&dir, start_clock());
    assert!(!store.export_to(ExportFormat::Csv, dir.path()));
}

#[test]
fn test_archive_mirror_receives_new_records() {
    let dir = TempDir::new().unwrap();
    let archive = Arc::new(SqliteContactArchive::open(dir.path().join("contacts.db")).unwrap());
    let local = Arc::new(InMemoryKeyValueStore::new());
    let session = Arc::new(InMemoryKeyValueStore::new());
    let store = ContactStore::new(local, session)
        .with_mirrors(vec![archive.clone() as Arc<dyn ContactMirror>]);

    let a = store.create(input("Ada", "One")).unwrap();
    let b = store.create(input("Ada", "Two")).unwrap();
    store.flush_mirrors();

    let archived = archive.find_by_email("ada@example.com").unwrap();
    assert_eq!(archived.len(), 2);
    assert!(archived.iter().any(|r| r.id == a.id));
    assert!(archived.iter().any(|r| r.id == b.id));

    // Deleting locally does not touch the archive
    assert!(store.delete(&a.id));
    assert_eq!(archive.count().unwrap(), 2);
}

#[test]
fn test_failing_mirror_does_not_affect_create() {
    struct Broken;
    impl ContactMirror for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn mirror(&self, _record: &contacts::ContactRecord) -> contacts::error::Result<()> {
            Err(contacts::StoreError::HttpStatus(502))
        }
    }

    let store = ContactStore::new(
        Arc::new(InMemoryKeyValueStore::new()),
        Arc::new(InMemoryKeyValueStore::new()),
    )
    .with_mirrors(vec![Arc::new(Broken) as Arc<dyn ContactMirror>]);

    let created = store.create(input("Ada", "Still saved"));
    store.flush_mirrors();
    assert!(created.is_some());
    assert_eq!(store.list().len(), 1);
}

#[test]
fn test_session_gate_expiry_scenario() {
    let dir = TempDir::new().unwrap();
    let clock = start_clock();
    let session = Arc::new(FileKeyValueStore::new(dir.path().join("session")).unwrap());
    let gate = SessionGate::new(session, clock.clone(), AdminCredentials::new("admin", "pw"));

    assert_eq!(gate.login("admin", "pw"), SessionState::Authenticated);
    clock.advance(Duration::hours(2) + Duration::minutes(1));
    assert_eq!(gate.check(), SessionState::Anonymous);
}

#[test]
fn test_unknown_id_update_leaves_store_unchanged() {
    let dir = TempDir::new().unwrap();
    let (_, store) = file_store(&dir, start_clock());
    store.create(input("Ada", "Hello")).unwrap();
    let before = store.list();

    assert!(!store.update_status(&ContactId::new("not-there"), ContactStatus::Replied));
    assert_eq!(store.list(), before);
}
