//! Spreadsheet webhook mirror
//!
//! POSTs each record as a flat JSON object. Uses synchronous HTTP (ureq);
//! the dispatcher already runs it off the caller's thread.

use serde::Serialize;
use url::Url;

use super::ContactMirror;
use crate::error::{Result, StoreError};
use crate::models::ContactRecord;

/// JSON body sent to the webhook
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub subject: &'a str,
    pub message: &'a str,
    pub timestamp: String,
    pub status: &'a str,
    pub source: &'a str,
}

impl<'a> From<&'a ContactRecord> for WebhookPayload<'a> {
    fn from(record: &'a ContactRecord) -> Self {
        Self {
            id: record.id.as_str(),
            name: &record.name,
            email: &record.email,
            subject: &record.subject,
            message: &record.message,
            timestamp: record
                .timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            status: record.status.as_str(),
            source: &record.source,
        }
    }
}

/// Mirror that POSTs records to a configured URL
pub struct WebhookMirror {
    url: Url,
    agent: ureq::Agent,
}

impl WebhookMirror {
    pub fn new(url: &str, agent: ureq::Agent) -> Result<Self> {
        Ok(Self {
            url: Url::parse(url)?,
            agent,
        })
    }
}

impl ContactMirror for WebhookMirror {
    fn name(&self) -> &str {
        "webhook"
    }

    fn mirror(&self, record: &ContactRecord) -> Result<()> {
        let response = self
            .agent
            .post(self.url.as_str())
            .send_json(WebhookPayload::from(record))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::HttpStatus(status.as_u16()));
        }
        Ok(())
    }
}
