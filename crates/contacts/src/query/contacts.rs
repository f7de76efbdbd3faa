//! Sorting and search over contact records

use crate::models::{ContactRecord, ContactStatus};

/// Sort by creation time, newest first
///
/// The sort is stable, so records sharing a timestamp keep their stored order.
pub fn sort_newest_first(records: &mut [ContactRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Search filter used by the admin table
///
/// The text query matches case-insensitively against name, email or subject.
/// An empty query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFilter {
    needle: String,
    status: Option<ContactStatus>,
}

impl ContactFilter {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.trim().to_lowercase(),
            status: None,
        }
    }

    /// Only keep records with the given status
    pub fn with_status(mut self, status: ContactStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, record: &ContactRecord) -> bool {
        if let Some(status) = self.status
            && record.status != status
        {
            return false;
        }

        self.needle.is_empty()
            || [&record.name, &record.email, &record.subject]
                .iter()
                .any(|field| field.to_lowercase().contains(&self.needle))
    }

    /// Keep the matching records, preserving order
    pub fn apply(&self, records: Vec<ContactRecord>) -> Vec<ContactRecord> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
