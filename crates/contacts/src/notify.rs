//! Email notification for new submissions
//!
//! Builds a `mailto:` link summarizing a record and hands it to the
//! platform's mail client.

use log::{error, info};

use crate::models::ContactRecord;

/// Build a `mailto:` link announcing `record` to `recipient`
pub fn compose_mailto(record: &ContactRecord, recipient: &str) -> String {
    let subject = format!("New Portfolio Contact: {}", record.subject);
    let body = format!(
        "New contact form submission:\n\
         \n\
         Name: {}\n\
         Email: {}\n\
         Subject: {}\n\
         Date: {}\n\
         \n\
         Message:\n\
         {}\n\
         \n\
         ---\n\
         Contact ID: {}\n\
         Source: {}\n",
        record.name,
        record.email,
        record.subject,
        record.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        record.message,
        record.id,
        record.source,
    );

    format!(
        "mailto:{}?subject={}&body={}",
        recipient,
        urlencoding::encode(&subject),
        urlencoding::encode(&body)
    )
}

/// Open the notification in the default mail client
///
/// Returns whether the client could be launched.
pub fn open_mailto(record: &ContactRecord, recipient: &str) -> bool {
    let link = compose_mailto(record, recipient);
    match open::that(&link) {
        Ok(()) => {
            info!("Opened notification for contact {}", record.id);
            true
        }
        Err(e) => {
            error!("Could not open mail client for contact {}: {}", record.id, e);
            false
        }
    }
}
