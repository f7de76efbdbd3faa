//! Aggregate counts over the stored contact records

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::{ContactRecord, ContactStatus};

/// Derived counts shown on the admin dashboard. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContactStatistics {
    pub total: usize,
    pub pending: usize,
    pub replied: usize,
    /// Created strictly within the last 24 hours
    pub last_24h: usize,
    /// Created strictly within the last 7 days
    pub last_week: usize,
}

impl ContactStatistics {
    /// Compute counts for `records` as seen at `now`
    pub fn compute(records: &[ContactRecord], now: DateTime<Utc>) -> Self {
        let day_ago = now - Duration::hours(24);
        let week_ago = now - Duration::days(7);

        records.iter().fold(Self::default(), |mut stats, record| {
            stats.total += 1;
            match record.status {
                ContactStatus::Pending => stats.pending += 1,
                ContactStatus::Replied => stats.replied += 1,
            }
            if record.timestamp > day_ago {
                stats.last_24h += 1;
            }
            if record.timestamp > week_ago {
                stats.last_week += 1;
            }
            stats
        })
    }
}
