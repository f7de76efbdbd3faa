//! Query helpers for admin views
//!
//! Sorting and filtering over already-loaded record lists.

mod contacts;

pub use contacts::{ContactFilter, sort_newest_first};
