//! Cloud document mirror (Firestore REST API)
//!
//! Creates one document per record in the configured collection. Every
//! record field is sent as a string value; `createdAt` carries the creation
//! time as a native timestamp so the console can sort on it.

use chrono::SecondsFormat;
use serde_json::{Value, json};
use url::Url;

use super::ContactMirror;
use crate::error::{Result, StoreError};
use crate::models::ContactRecord;
use crate::settings::FirestoreSettings;

/// Mirror that adds a document per record to a Firestore collection
pub struct FirestoreMirror {
    endpoint: Url,
    agent: ureq::Agent,
}

impl FirestoreMirror {
    /// Firestore REST base URL
    const BASE_URL: &'static str = "https://firestore.googleapis.com/v1";

    pub fn new(settings: &FirestoreSettings, agent: ureq::Agent) -> Result<Self> {
        Self::with_base_url(Self::BASE_URL, settings, agent)
    }

    /// Point the mirror at a different API root (emulator, tests)
    pub fn with_base_url(
        base_url: &str,
        settings: &FirestoreSettings,
        agent: ureq::Agent,
    ) -> Result<Self> {
        let mut endpoint = Url::parse(&format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            base_url.trim_end_matches('/'),
            settings.project_id,
            settings.collection
        ))?;

        if let Some(key) = &settings.api_key {
            endpoint.query_pairs_mut().append_pair("key", key);
        }

        Ok(Self { endpoint, agent })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Encode a record as a Firestore document body
    pub fn document(record: &ContactRecord) -> Value {
        let timestamp = record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
        json!({
            "fields": {
                "id": { "stringValue": record.id.as_str() },
                "name": { "stringValue": record.name },
                "email": { "stringValue": record.email },
                "subject": { "stringValue": record.subject },
                "message": { "stringValue": record.message },
                "timestamp": { "stringValue": timestamp },
                "status": { "stringValue": record.status.as_str() },
                "source": { "stringValue": record.source },
                "createdAt": { "timestampValue": timestamp },
            }
        })
    }
}

impl ContactMirror for FirestoreMirror {
    fn name(&self) -> &str {
        "firestore"
    }

    fn mirror(&self, record: &ContactRecord) -> Result<()> {
        let response = self
            .agent
            .post(self.endpoint.as_str())
            .send_json(Self::document(record))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::HttpStatus(status.as_u16()));
        }
        Ok(())
    }
}
