//! Storage trait definitions

use crate::error::Result;

/// String-keyed slot storage, modelled on browser local/session storage
///
/// Values are opaque strings (JSON in practice). Reading an absent key is
/// not an error.
pub trait KeyValueStore: Send + Sync {
    /// Read a slot
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace a slot's contents
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a slot entirely; removing an absent key succeeds
    fn remove(&self, key: &str) -> Result<()>;

    /// Check whether a slot exists
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}
