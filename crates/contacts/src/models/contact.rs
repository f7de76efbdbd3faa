//! Contact record model: one submitted message plus its metadata

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source tag stamped on every record created by the contact form
pub const CONTACT_SOURCE: &str = "Portfolio Contact Form";

/// Identifier of a contact record
///
/// Generated from a time-ordered UUID (v7), so ids created later sort later.
/// Uniqueness is probabilistic, not enforced.
///
/// Snapshots written by the earlier site stored numeric ids; those are read
/// back as their decimal string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ContactId(pub String);

impl ContactId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ContactId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = ContactId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or numeric contact id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ContactId, E> {
                Ok(ContactId::new(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<ContactId, E> {
                Ok(ContactId(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ContactId, E> {
                Ok(ContactId(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ContactId, E> {
                Ok(ContactId(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<ContactId, E> {
                if !v.is_finite() {
                    return Err(E::custom("contact id is not a finite number"));
                }
                Ok(ContactId(v.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ContactId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContactId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Reply status of a contact record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    Pending,
    Replied,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::Pending => "pending",
            ContactStatus::Replied => "replied",
        }
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when parsing an unknown status string
#[derive(Debug, thiserror::Error)]
#[error("unknown contact status: {0:?}")]
pub struct UnknownStatusError(pub String);

impl FromStr for ContactStatus {
    type Err = UnknownStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ContactStatus::Pending),
            "replied" => Ok(ContactStatus::Replied),
            other => Err(UnknownStatusError(other.to_string())),
        }
    }
}

/// Fields submitted through the contact form
///
/// Nothing is validated here; the form is responsible for that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInput {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactInput {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            subject: subject.into(),
            message: message.into(),
        }
    }
}

/// A stored contact message
///
/// Serialized with the same field names the site's local storage uses, so
/// existing snapshots stay readable. Ids are always written back as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    /// When the record was created
    pub timestamp: DateTime<Utc>,
    pub status: ContactStatus,
    /// Set whenever the status changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_source() -> String {
    CONTACT_SOURCE.to_string()
}

impl ContactRecord {
    /// Stamp a submitted input as a new pending record
    pub fn from_input(input: ContactInput, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ContactId::generate(),
            name: input.name,
            email: input.email,
            subject: input.subject,
            message: input.message,
            timestamp: created_at,
            status: ContactStatus::Pending,
            updated_at: None,
            source: default_source(),
        }
    }

    /// Move to a new status, recording when it happened
    pub fn set_status(&mut self, status: ContactStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = Some(at);
    }
}
