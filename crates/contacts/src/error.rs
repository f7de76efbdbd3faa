//! Error types for contact storage and mirroring

use thiserror::Error;

/// Result alias used across the contacts crate
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures raised by storage backends, mirrors and exporters.
///
/// None of these escape the public [`ContactStore`](crate::ContactStore)
/// operations; they are logged and turned into `None` / `false` there.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a slot failed at the I/O layer
    #[error("storage I/O failed for {key}: {source}")]
    Storage {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A slot holds a payload that does not parse
    #[error("slot {key} holds unreadable data: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Writing a value would exceed the backend's capacity
    #[error("quota exceeded writing {key}: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },

    /// Key cannot be mapped onto the backend
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Backend cannot be used (poisoned lock, missing directory, ...)
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("failed to serialize contacts: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("database migration failed: {0}")]
    Migration(#[from] rusqlite_migration::Error),

    #[error("invalid mirror url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Transport-level HTTP failure (DNS, TLS, timeout, ...)
    #[error("http request failed: {0}")]
    Http(#[source] ureq::Error),

    /// Remote answered outside the 2xx range
    #[error("http status {0}")]
    HttpStatus(u16),

    /// Writing an export file failed
    #[error("export to {} failed: {source}", path.display())]
    Export {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ureq::Error> for StoreError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => StoreError::HttpStatus(code),
            other => StoreError::Http(other),
        }
    }
}
