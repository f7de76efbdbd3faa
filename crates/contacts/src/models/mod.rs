//! Domain models for contact records

mod contact;
mod statistics;

pub use contact::{
    CONTACT_SOURCE, ContactId, ContactInput, ContactRecord, ContactStatus, UnknownStatusError,
};
pub use statistics::ContactStatistics;
