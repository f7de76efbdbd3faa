//! Best-effort copies of new records to secondary sinks
//!
//! A mirror receives each record once, right after it is written locally.
//! Mirrors run on background threads; their results never reach the caller
//! of [`ContactStore::create`](crate::ContactStore::create).

mod dispatch;
mod firestore;
mod webhook;

pub use dispatch::MirrorDispatcher;
pub use firestore::FirestoreMirror;
pub use webhook::{WebhookMirror, WebhookPayload};

use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::models::ContactRecord;
use crate::settings::MirrorSettings;
use crate::storage::SqliteContactArchive;

/// A secondary sink for new contact records
pub trait ContactMirror: Send + Sync {
    /// Short name used in logs and thread names
    fn name(&self) -> &str;

    /// Copy one record to the sink
    fn mirror(&self, record: &ContactRecord) -> Result<()>;
}

/// Build an HTTP agent with a global request timeout
pub fn http_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}

/// Build every mirror the settings enable
///
/// `archive_path` enables the local SQLite archive. A mirror that fails to
/// initialize is logged and left out; it never blocks the others.
pub fn build_mirrors(
    settings: &MirrorSettings,
    archive_path: Option<&Path>,
) -> Vec<Arc<dyn ContactMirror>> {
    let mut mirrors: Vec<Arc<dyn ContactMirror>> = Vec::new();

    if let Some(path) = archive_path {
        match SqliteContactArchive::open(path) {
            Ok(archive) => mirrors.push(Arc::new(archive)),
            Err(e) => warn!("Contact archive unavailable at {}: {}", path.display(), e),
        }
    }

    let agent = http_agent(settings.http_timeout());

    if let Some(firestore) = &settings.firestore {
        match FirestoreMirror::new(firestore, agent.clone()) {
            Ok(mirror) => mirrors.push(Arc::new(mirror)),
            Err(e) => warn!("Firestore mirror not configured: {}", e),
        }
    }

    if let Some(url) = &settings.webhook_url {
        match WebhookMirror::new(url, agent) {
            Ok(mirror) => mirrors.push(Arc::new(mirror)),
            Err(e) => warn!("Webhook mirror not configured: {}", e),
        }
    }

    info!(
        "Contact mirrors enabled: [{}]",
        mirrors
            .iter()
            .map(|m| m.name().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    mirrors
}
