//! Storage traits and implementations
//!
//! Contact lists live in string-keyed slots behind the [`KeyValueStore`]
//! trait, so the store can run over in-memory maps (session scope, tests) or
//! files on disk (local scope). The SQLite archive is the structured copy
//! that mirrors receive.

mod file;
mod memory;
mod sqlite;
mod traits;

pub use file::FileKeyValueStore;
pub use memory::InMemoryKeyValueStore;
pub use sqlite::SqliteContactArchive;
pub use traits::KeyValueStore;
