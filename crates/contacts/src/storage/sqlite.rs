//! SQLite archive of contact records
//!
//! The structured local copy: one row per record keyed by id, indexed on
//! creation time and email. It is fed by the mirror dispatcher and never
//! read back into the primary list.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row, params};
use rusqlite_migration::{M, Migrations};

use crate::error::{Result, StoreError};
use crate::mirror::ContactMirror;
use crate::models::{ContactId, ContactRecord};

/// Database migrations
///
/// Each migration is applied in order. The user_version pragma tracks which
/// migrations have been applied.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        // Migration 1: Initial schema
        M::up(
            r#"
            CREATE TABLE contacts (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                subject TEXT NOT NULL,
                message TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                status TEXT NOT NULL,
                updated_at TEXT,
                source TEXT NOT NULL
            );

            CREATE INDEX idx_contacts_timestamp ON contacts(timestamp DESC);
            CREATE INDEX idx_contacts_email ON contacts(email);
            "#,
        ),
    ])
}

const SELECT_COLUMNS: &str =
    "id, name, email, subject, message, timestamp, status, updated_at, source";

/// SQLite-based contact archive
pub struct SqliteContactArchive {
    conn: Mutex<Connection>,
}

impl SqliteContactArchive {
    /// Open (creating if needed) the archive at `db_path`
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref())?;
        Self::with_connection(conn)
    }

    /// Open a throwaway archive held in memory
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(mut conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            "#,
        )?;

        migrations().to_latest(&mut conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("archive connection lock poisoned".to_string()))
    }

    /// Insert a record; an existing row with the same id is kept as is
    ///
    /// Returns whether a new row was written.
    pub fn insert(&self, record: &ContactRecord) -> Result<bool> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO contacts
             (id, name, email, subject, message, timestamp, status, updated_at, source)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id.as_str(),
                record.name,
                record.email,
                record.subject,
                record.message,
                format_time(&record.timestamp),
                record.status.as_str(),
                record.updated_at.as_ref().map(format_time),
                record.source,
            ],
        )?;
        Ok(inserted > 0)
    }

    /// All archived records, newest first
    pub fn list(&self) -> Result<Vec<ContactRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM contacts ORDER BY timestamp DESC",
            SELECT_COLUMNS
        ))?;
        let records = stmt
            .query_map([], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Archived records sent from `email`, newest first
    pub fn find_by_email(&self, email: &str) -> Result<Vec<ContactRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM contacts WHERE email = ?1 ORDER BY timestamp DESC",
            SELECT_COLUMNS
        ))?;
        let records = stmt
            .query_map([email], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl ContactMirror for SqliteContactArchive {
    fn name(&self) -> &str {
        "archive"
    }

    fn mirror(&self, record: &ContactRecord) -> Result<()> {
        self.insert(record).map(|_| ())
    }
}

/// Fixed-width UTC timestamps so text order matches time order
fn format_time(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_time(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<ContactRecord> {
    let timestamp: String = row.get(5)?;
    let status: String = row.get(6)?;
    let updated_at: Option<String> = row.get(7)?;

    Ok(ContactRecord {
        id: ContactId::new(row.get::<_, String>(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        subject: row.get(3)?,
        message: row.get(4)?,
        timestamp: parse_time(5, &timestamp)?,
        status: status.parse().map_err(|e| conversion_error(6, e))?,
        updated_at: updated_at.map(|s| parse_time(7, &s)).transpose()?,
        source: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactInput, ContactStatus};
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn record(email: &str, subject: &str, at: DateTime<Utc>) -> ContactRecord {
        ContactRecord::from_input(ContactInput::new("Test", email, subject, "body"), at)
    }

    #[test]
    fn test_insert_and_list_newest_first() {
        let archive = SqliteContactArchive::in_memory().unwrap();
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();

        archive.insert(&record("a@example.com", "old", base)).unwrap();
        archive
            .insert(&record("b@example.com", "new", base + Duration::hours(1)))
            .unwrap();

        let listed = archive.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].subject, "new");
        assert_eq!(listed[1].subject, "old");
        assert_eq!(listed[1].timestamp, base);
    }

    #[test]
    fn test_duplicate_id_keeps_first_copy() {
        let archive = SqliteContactArchive::in_memory().unwrap();
        let at = Utc::now();
        let original = record("a@example.com", "first", at);
        let mut changed = original.clone();
        changed.subject = "second".to_string();

        assert!(archive.insert(&original).unwrap());
        assert!(!archive.insert(&changed).unwrap());

        let listed = archive.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].subject, "first");
    }

    #[test]
    fn test_find_by_email() {
        let archive = SqliteContactArchive::in_memory().unwrap();
        let at = Utc::now();
        archive.insert(&record("a@example.com", "one", at)).unwrap();
        archive.insert(&record("b@example.com", "two", at)).unwrap();
        archive
            .insert(&record("a@example.com", "three", at + Duration::seconds(1)))
            .unwrap();

        let found = archive.find_by_email("a@example.com").unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].subject, "three");
        assert_eq!(archive.count().unwrap(), 3);
    }

    #[test]
    fn test_status_and_updated_at_roundtrip() {
        let archive = SqliteContactArchive::in_memory().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mut replied = record("a@example.com", "s", at);
        replied.set_status(ContactStatus::Replied, at + Duration::minutes(3));
        archive.insert(&replied).unwrap();

        let listed = archive.list().unwrap();
        assert_eq!(listed[0], replied);
    }

    #[test]
    fn test_persists_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("contacts.db");
        {
            let archive = SqliteContactArchive::open(&path).unwrap();
            archive.mirror(&record("a@example.com", "kept", Utc::now())).unwrap();
        }
        let reopened = SqliteContactArchive::open(&path).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
    }
}
