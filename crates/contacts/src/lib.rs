//! Contacts crate - storage and admin logic for portfolio contact messages
//!
//! This crate provides:
//! - Domain models (ContactRecord, ContactStatus, ContactStatistics)
//! - Slot storage abstractions with in-memory and file backends
//! - The contact store: create, list, search, update, delete, clear, export
//! - Best-effort mirrors (SQLite archive, Firestore, spreadsheet webhook)
//! - A session gate for the admin view
//!
//! Backends and the clock are injected, so everything runs against test
//! doubles as easily as against the filesystem.

pub mod clock;
pub mod error;
pub mod export;
pub mod mirror;
pub mod models;
pub mod notify;
pub mod query;
pub mod session;
pub mod settings;
pub mod storage;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::StoreError;
pub use export::{ExportFile, ExportFormat};
pub use mirror::{ContactMirror, FirestoreMirror, MirrorDispatcher, WebhookMirror, build_mirrors};
pub use models::{
    CONTACT_SOURCE, ContactId, ContactInput, ContactRecord, ContactStatistics, ContactStatus,
};
pub use query::ContactFilter;
pub use session::{SessionGate, SessionState};
pub use settings::{AdminCredentials, FirestoreSettings, MirrorSettings};
pub use storage::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, SqliteContactArchive};
pub use store::ContactStore;
