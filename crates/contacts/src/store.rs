//! Contact record store
//!
//! The full record list lives in one JSON slot of the local store and is
//! rewritten on every change, together with a backup slot. Reads fall back
//! to the backup when the primary slot cannot be read or parsed.
//!
//! Every public operation catches its own failures: they are logged and
//! surface as `None`, `false` or an empty list. Nothing is retried.
//!
//! The two slots are written one after the other without atomicity, so an
//! interrupted write can leave the backup one change behind.

use log::{debug, error, info, warn};
use std::path::Path;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, StoreError};
use crate::export::{self, ExportFile, ExportFormat};
use crate::mirror::{ContactMirror, MirrorDispatcher};
use crate::models::{ContactId, ContactInput, ContactRecord, ContactStatistics, ContactStatus};
use crate::query::{ContactFilter, sort_newest_first};
use crate::storage::KeyValueStore;

/// Local slot holding the canonical record list
pub const PRIMARY_KEY: &str = "portfolioContacts";

/// Local slot shadowing the primary list
pub const BACKUP_KEY: &str = "portfolioContactsBackup";

/// Session slot holding the most recent submission
pub const LAST_CONTACT_KEY: &str = "lastContact";

/// Store of submitted contact messages
pub struct ContactStore {
    local: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    mirrors: MirrorDispatcher,
}

impl ContactStore {
    /// Create a store over the given local and session storage
    ///
    /// Uses the system clock and no mirrors.
    pub fn new(local: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        Self {
            local,
            session,
            clock: Arc::new(SystemClock),
            mirrors: MirrorDispatcher::new(Vec::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_mirrors(mut self, mirrors: Vec<Arc<dyn ContactMirror>>) -> Self {
        self.mirrors = MirrorDispatcher::new(mirrors);
        self
    }

    /// Record a new submission
    ///
    /// The record is persisted locally before this returns. Mirrors are
    /// started in the background and not waited on. Returns `None` if the
    /// primary slot could not be written.
    pub fn create(&self, input: ContactInput) -> Option<ContactRecord> {
        let record = ContactRecord::from_input(input, self.clock.now());

        let mut records = self.list();
        records.push(record.clone());

        if let Err(e) = self.write_slots(&records) {
            error!("Error saving contact: {}", e);
            return None;
        }

        if let Err(e) = self.remember_last(&record) {
            warn!("Could not record last submitted contact: {}", e);
        }

        if !self.mirrors.is_empty() {
            debug!(
                "Dispatching contact {} to {} mirror(s)",
                record.id,
                self.mirrors.len()
            );
            self.mirrors.dispatch(&record);
        }

        info!("Saved contact {} from {}", record.id, record.email);
        Some(record)
    }

    /// All records, newest first
    ///
    /// Falls back to the backup slot if the primary cannot be read, and to an
    /// empty list if neither can.
    pub fn list(&self) -> Vec<ContactRecord> {
        let mut records = match self.load_slot(PRIMARY_KEY) {
            Ok(records) => records,
            Err(e) => {
                error!("Error loading contacts: {}", e);
                match self.load_slot(BACKUP_KEY) {
                    Ok(records) => {
                        warn!("Recovered {} contact(s) from backup", records.len());
                        records
                    }
                    Err(e) => {
                        error!("Backup also failed: {}", e);
                        return Vec::new();
                    }
                }
            }
        };

        sort_newest_first(&mut records);
        records
    }

    /// Records matching a search query, newest first
    pub fn search(&self, query: &str) -> Vec<ContactRecord> {
        ContactFilter::new(query).apply(self.list())
    }

    /// Records matching an arbitrary filter, newest first
    pub fn filter(&self, filter: &ContactFilter) -> Vec<ContactRecord> {
        filter.apply(self.list())
    }

    pub fn get(&self, id: &ContactId) -> Option<ContactRecord> {
        self.list().into_iter().find(|r| &r.id == id)
    }

    /// Remove a record
    ///
    /// Deleting an id that is not present still succeeds.
    pub fn delete(&self, id: &ContactId) -> bool {
        let records: Vec<ContactRecord> =
            self.list().into_iter().filter(|r| &r.id != id).collect();

        match self.write_slots(&records) {
            Ok(()) => {
                info!("Deleted contact {}", id);
                true
            }
            Err(e) => {
                error!("Error deleting contact: {}", e);
                false
            }
        }
    }

    /// Change a record's status
    ///
    /// Returns `false` if no record has this id; the store is then left
    /// untouched.
    pub fn update_status(&self, id: &ContactId, status: ContactStatus) -> bool {
        let mut records = self.list();
        let Some(record) = records.iter_mut().find(|r| &r.id == id) else {
            debug!("Status update for unknown contact {}", id);
            return false;
        };

        record.set_status(status, self.clock.now());

        match self.write_slots(&records) {
            Ok(()) => {
                info!("Marked contact {} as {}", id, status);
                true
            }
            Err(e) => {
                error!("Error updating contact status: {}", e);
                false
            }
        }
    }

    /// Remove every record, the backup and the last-submitted slot
    pub fn clear_all(&self) -> bool {
        let result = self
            .local
            .remove(PRIMARY_KEY)
            .and_then(|()| self.local.remove(BACKUP_KEY))
            .and_then(|()| self.session.remove(LAST_CONTACT_KEY));

        match result {
            Ok(()) => {
                info!("Cleared all contacts");
                true
            }
            Err(e) => {
                error!("Error clearing contacts: {}", e);
                false
            }
        }
    }

    /// The most recent submission made in this session, if any
    pub fn last_submitted(&self) -> Option<ContactRecord> {
        let raw = match self.session.get(LAST_CONTACT_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Could not read last submitted contact: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Last submitted contact is unreadable: {}", e);
                None
            }
        }
    }

    pub fn statistics(&self) -> ContactStatistics {
        ContactStatistics::compute(&self.list(), self.clock.now())
    }

    /// Render every record for download
    ///
    /// Returns `None` when there is nothing to export.
    pub fn export(&self, format: ExportFormat) -> Option<ExportFile> {
        let records = self.list();
        if records.is_empty() {
            info!("No contacts to export");
            return None;
        }
        Some(export::export_file(
            &records,
            format,
            self.clock.now().date_naive(),
        ))
    }

    /// Export into `dir` under the dated file name
    pub fn export_to(&self, format: ExportFormat, dir: &Path) -> bool {
        let Some(file) = self.export(format) else {
            return false;
        };

        let path = dir.join(&file.file_name);
        match std::fs::write(&path, file.bytes()) {
            Ok(()) => {
                info!("Exported contacts to {}", path.display());
                true
            }
            Err(source) => {
                let e = StoreError::Export { path, source };
                error!("Error exporting contacts: {}", e);
                false
            }
        }
    }

    /// Wait for mirror attempts started so far
    ///
    /// Only needed before shutdown or in tests; no operation depends on it.
    pub fn flush_mirrors(&self) {
        self.mirrors.flush();
    }

    fn load_slot(&self, key: &str) -> Result<Vec<ContactRecord>> {
        match self.local.get(key)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
        }
    }

    /// Write the full list to the primary slot, then the backup
    ///
    /// Only a primary failure is an error; the backup is best-effort.
    fn write_slots(&self, records: &[ContactRecord]) -> Result<()> {
        let json = serde_json::to_string(records).map_err(StoreError::Serialize)?;

        self.local.set(PRIMARY_KEY, &json)?;

        if let Err(e) = self.local.set(BACKUP_KEY, &json) {
            warn!("Backup write failed: {}", e);
        }
        Ok(())
    }

    fn remember_last(&self, record: &ContactRecord) -> Result<()> {
        let json = serde_json::to_string(record).map_err(StoreError::Serialize)?;
        self.session.set(LAST_CONTACT_KEY, &json)
    }
}
