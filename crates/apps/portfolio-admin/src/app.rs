//! Admin application state and command handlers

use anyhow::{Context, Result, bail};
use log::warn;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use contacts::notify;
use contacts::{
    AdminCredentials, ContactFilter, ContactId, ContactInput, ContactRecord, ContactStatus,
    ContactStore, ExportFormat, FileKeyValueStore, MirrorSettings, SessionGate, SystemClock,
    build_mirrors,
};

/// Subdirectory of the data dir holding the record slots
const LOCAL_DIR: &str = "local";
/// Subdirectory of the data dir holding admin session state
const SESSION_DIR: &str = "session";
/// SQLite archive file inside the data dir
const ARCHIVE_FILE: &str = "contacts.db";

const SUBJECT_WIDTH: usize = 40;

pub struct AdminApp {
    store: ContactStore,
    gate: SessionGate,
}

impl AdminApp {
    /// Open the store and gate over `data_dir` (or the platform data dir)
    pub fn open(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => config::ensure_data_dir()?,
        };

        let local = FileKeyValueStore::new(data_dir.join(LOCAL_DIR))
            .context("Failed to open contact storage")?;
        let session = Arc::new(
            FileKeyValueStore::new(data_dir.join(SESSION_DIR))
                .context("Failed to open session storage")?,
        );

        let settings = MirrorSettings::load().unwrap_or_else(|e| {
            warn!("Ignoring unreadable mirror settings: {:#}", e);
            MirrorSettings::default()
        });
        let archive_path = data_dir.join(ARCHIVE_FILE);
        let mirrors = build_mirrors(&settings, Some(&archive_path));

        let credentials = AdminCredentials::load().context("Failed to load admin credentials")?;

        let store = ContactStore::new(Arc::new(local), session.clone()).with_mirrors(mirrors);
        let gate = SessionGate::new(session, Arc::new(SystemClock), credentials);

        Ok(Self { store, gate })
    }

    fn require_admin(&self) -> Result<()> {
        if !self.gate.check().is_authenticated() {
            bail!("Admin session required: run `portfolio-admin login` first");
        }
        Ok(())
    }

    fn find(&self, id: &str) -> Result<ContactRecord> {
        self.store
            .get(&ContactId::new(id))
            .with_context(|| format!("No contact with id {}", id))
    }

    pub fn submit(
        &self,
        name: String,
        email: String,
        subject: String,
        message: String,
        notify_to: Option<&str>,
    ) -> Result<()> {
        let record = self
            .store
            .create(ContactInput {
                name,
                email,
                subject,
                message,
            })
            .context("Failed to save contact")?;

        println!("Saved contact {}", record.id);

        if let Some(recipient) = notify_to {
            notify::open_mailto(&record, recipient);
        }

        // The process is about to exit; give mirrors their chance to finish
        self.store.flush_mirrors();
        Ok(())
    }

    pub fn login(&self, username: &str, password: &str) -> Result<()> {
        if !self.gate.login(username, password).is_authenticated() {
            bail!("Invalid username or password");
        }
        println!("Logged in. Session is valid for 2 hours.");
        Ok(())
    }

    pub fn logout(&self) {
        self.gate.logout();
        println!("Logged out.");
    }

    pub fn status(&self) {
        if self.gate.check().is_authenticated() {
            println!("Authenticated");
        } else {
            println!("Anonymous");
        }
    }

    pub fn list(
        &self,
        search: Option<&str>,
        status: Option<ContactStatus>,
        json: bool,
    ) -> Result<()> {
        self.require_admin()?;

        let mut filter = ContactFilter::new(search.unwrap_or_default());
        if let Some(status) = status {
            filter = filter.with_status(status);
        }
        let records = self.store.filter(&filter);

        if json {
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(());
        }

        if records.is_empty() {
            println!("No messages found.");
            return Ok(());
        }

        println!(
            "{:<20} {:<20} {:<28} {:<width$} {:<8} ID",
            "DATE",
            "NAME",
            "EMAIL",
            "SUBJECT",
            "STATUS",
            width = SUBJECT_WIDTH
        );
        for record in &records {
            println!(
                "{:<20} {:<20} {:<28} {:<width$} {:<8} {}",
                record.timestamp.format("%Y-%m-%d %H:%M"),
                truncate(&record.name, 20),
                truncate(&record.email, 28),
                truncate(&record.subject, SUBJECT_WIDTH),
                record.status,
                record.id,
                width = SUBJECT_WIDTH
            );
        }
        Ok(())
    }

    pub fn show(&self, id: &str) -> Result<()> {
        self.require_admin()?;
        let record = self.find(id)?;

        println!("ID:      {}", record.id);
        println!("Name:    {}", record.name);
        println!("Email:   {}", record.email);
        println!("Subject: {}", record.subject);
        println!("Date:    {}", record.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
        println!("Status:  {}", record.status);
        if let Some(updated_at) = record.updated_at {
            println!("Updated: {}", updated_at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        println!("Source:  {}", record.source);
        println!();
        println!("{}", record.message);
        Ok(())
    }

    pub fn reply(&self, id: &str) -> Result<()> {
        self.require_admin()?;
        if !self
            .store
            .update_status(&ContactId::new(id), ContactStatus::Replied)
        {
            bail!("Could not mark {} as replied", id);
        }
        println!("Marked {} as replied.", id);
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.require_admin()?;
        if !self.store.delete(&ContactId::new(id)) {
            bail!("Could not delete {}", id);
        }
        println!("Deleted {}.", id);
        Ok(())
    }

    pub fn clear(&self, confirmed: bool) -> Result<()> {
        self.require_admin()?;
        if !confirmed {
            bail!("Refusing to delete every message without --yes");
        }
        if !self.store.clear_all() {
            bail!("Could not clear messages");
        }
        println!("All messages deleted.");
        Ok(())
    }

    pub fn export(&self, format: ExportFormat, out: &Path) -> Result<()> {
        self.require_admin()?;
        std::fs::create_dir_all(out)
            .with_context(|| format!("Failed to create {}", out.display()))?;
        if !self.store.export_to(format, out) {
            bail!("Nothing exported");
        }
        println!("Export written to {}", out.display());
        Ok(())
    }

    pub fn stats(&self) -> Result<()> {
        self.require_admin()?;
        let stats = self.store.statistics();
        println!("Total:         {}", stats.total);
        println!("Pending:       {}", stats.pending);
        println!("Replied:       {}", stats.replied);
        println!("Last 24 hours: {}", stats.last_24h);
        println!("Last 7 days:   {}", stats.last_week);
        Ok(())
    }

    pub fn notify(&self, id: &str, recipient: &str) -> Result<()> {
        self.require_admin()?;
        let record = self.find(id)?;
        if !notify::open_mailto(&record, recipient) {
            bail!("Could not open a mail client");
        }
        Ok(())
    }
}

/// Shorten to `width` characters, marking the cut with an ellipsis
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
    short.push('…');
    short
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("this is too long", 8), "this is…");
        assert_eq!(truncate("héllo wörld", 5), "héll…");
    }
}
