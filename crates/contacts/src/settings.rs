//! Configuration for mirrors and the admin gate
//!
//! Mirror settings are loaded from (in order of priority):
//! 1. JSON file in the portfolio config directory (`mirrors.json`)
//! 2. Runtime environment variables
//!
//! Admin credentials are loaded from (in order of priority):
//! 1. Runtime environment variables
//! 2. JSON file (`admin.json`)
//! 3. The built-in default pair
//!
//! The admin pair is compared in plain text. It keeps casual visitors out
//! of the admin view and nothing more.

use anyhow::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Mirror settings filename in the config directory
pub const MIRRORS_FILE: &str = "mirrors.json";

/// Admin credentials filename in the config directory
pub const ADMIN_FILE: &str = "admin.json";

/// Collection used when none is configured
pub const DEFAULT_FIRESTORE_COLLECTION: &str = "portfolioContacts";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

const DEFAULT_ADMIN_USERNAME: &str = "portfolio_admin";
const DEFAULT_ADMIN_PASSWORD: &str = "change-me";

/// Cloud document collection target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirestoreSettings {
    pub project_id: String,
    /// Web API key; omitted when security rules allow unauthenticated writes
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_collection() -> String {
    DEFAULT_FIRESTORE_COLLECTION.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

/// Which optional remote mirrors are enabled, and how to reach them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorSettings {
    #[serde(default)]
    pub firestore: Option<FirestoreSettings>,
    /// Spreadsheet webhook accepting one JSON POST per record
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            firestore: None,
            webhook_url: None,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl MirrorSettings {
    /// Load settings from the config file, falling back to the environment
    pub fn load() -> Result<Self> {
        if config::config_exists(MIRRORS_FILE) {
            debug!("Loading mirror settings from {}", MIRRORS_FILE);
            return config::load_json(MIRRORS_FILE);
        }
        Ok(Self::from_env())
    }

    /// Read settings from environment variables
    ///
    /// `FIREBASE_PROJECT_ID` enables the document mirror (with optional
    /// `FIREBASE_API_KEY` and `FIREBASE_COLLECTION`); `SHEETS_WEBHOOK_URL`
    /// enables the webhook.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let firestore = get("FIREBASE_PROJECT_ID").map(|project_id| FirestoreSettings {
            project_id,
            api_key: get("FIREBASE_API_KEY"),
            collection: get("FIREBASE_COLLECTION").unwrap_or_else(default_collection),
        });

        let http_timeout_secs = get("MIRROR_HTTP_TIMEOUT_SECS")
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        Self {
            firestore,
            webhook_url: get("SHEETS_WEBHOOK_URL"),
            http_timeout_secs,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Whether any remote mirror is configured
    pub fn has_remote(&self) -> bool {
        self.firestore.is_some() || self.webhook_url.is_some()
    }
}

/// Username/password pair accepted by the session gate
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD)
    }
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Load credentials: environment, then `admin.json`, then the default pair
    pub fn load() -> Result<Self> {
        if let Some(creds) = Self::from_env() {
            return Ok(creds);
        }

        if config::config_exists(ADMIN_FILE) {
            return config::load_json(ADMIN_FILE);
        }

        warn!("No admin credentials configured, using the built-in default pair");
        Ok(Self::default())
    }

    /// Read `PORTFOLIO_ADMIN_USERNAME` and `PORTFOLIO_ADMIN_PASSWORD`
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Both variables must be present and non-empty
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = lookup("PORTFOLIO_ADMIN_USERNAME").filter(|v| !v.is_empty())?;
        let password = lookup("PORTFOLIO_ADMIN_PASSWORD").filter(|v| !v.is_empty())?;
        Some(Self { username, password })
    }

    /// Exact match on both fields
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_no_env_disables_mirrors() {
        let settings = MirrorSettings::from_lookup(lookup_from(&[]));
        assert_eq!(settings, MirrorSettings::default());
        assert!(!settings.has_remote());
    }

    #[test]
    fn test_env_enables_firestore_and_webhook() {
        let settings = MirrorSettings::from_lookup(lookup_from(&[
            ("FIREBASE_PROJECT_ID", "my-portfolio"),
            ("FIREBASE_API_KEY", "key-123"),
            ("SHEETS_WEBHOOK_URL", "https://script.example.com/exec"),
            ("MIRROR_HTTP_TIMEOUT_SECS", "3"),
        ]));

        let firestore = settings.firestore.as_ref().unwrap();
        assert_eq!(firestore.project_id, "my-portfolio");
        assert_eq!(firestore.api_key.as_deref(), Some("key-123"));
        assert_eq!(firestore.collection, DEFAULT_FIRESTORE_COLLECTION);
        assert_eq!(
            settings.webhook_url.as_deref(),
            Some("https://script.example.com/exec")
        );
        assert_eq!(settings.http_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let settings = MirrorSettings::from_lookup(lookup_from(&[
            ("FIREBASE_PROJECT_ID", "  "),
            ("SHEETS_WEBHOOK_URL", ""),
        ]));
        assert!(!settings.has_remote());
    }

    #[test]
    fn test_parse_settings_json() {
        let json = r#"{
            "firestore": { "project_id": "p" },
            "webhook_url": "https://hooks.example.com/x"
        }"#;
        let settings: MirrorSettings = serde_json::from_str(json).unwrap();
        let firestore = settings.firestore.unwrap();
        assert_eq!(firestore.collection, DEFAULT_FIRESTORE_COLLECTION);
        assert!(firestore.api_key.is_none());
        assert_eq!(settings.http_timeout_secs, DEFAULT_HTTP_TIMEOUT_SECS);
    }

    #[test]
    fn test_credentials_from_lookup() {
        let creds = AdminCredentials::from_lookup(lookup_from(&[
            ("PORTFOLIO_ADMIN_USERNAME", "me"),
            ("PORTFOLIO_ADMIN_PASSWORD", "secret"),
        ]))
        .unwrap();
        assert!(creds.matches("me", "secret"));
        assert!(!creds.matches("me", "Secret"));
        assert!(!creds.matches("you", "secret"));

        let partial = AdminCredentials::from_lookup(lookup_from(&[(
            "PORTFOLIO_ADMIN_USERNAME",
            "me",
        )]));
        assert!(partial.is_none());
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = AdminCredentials::new("me", "hunter2");
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("me"));
        assert!(!rendered.contains("hunter2"));
    }
}
