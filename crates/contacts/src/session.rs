//! Session gate for the admin view
//!
//! A login that matches the configured pair stores a flag and a login time
//! in session-scoped storage. The session lasts two hours from login; logout
//! or an expired check clears both entries.

use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use std::sync::Arc;

use crate::clock::Clock;
use crate::error::Result;
use crate::settings::AdminCredentials;
use crate::storage::KeyValueStore;

/// Session key holding `"true"` while logged in
pub const LOGGED_IN_KEY: &str = "adminLoggedIn";

/// Session key holding the login time in Unix milliseconds
pub const LOGIN_TIME_KEY: &str = "adminLoginTime";

/// How long a login stays valid
pub const SESSION_TTL_SECS: i64 = 2 * 60 * 60;

/// Admin access state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated)
    }
}

/// Check whether a login at `logged_in_at` has expired by `now`
///
/// A session is still valid at exactly two hours; it expires once more than
/// two hours have passed.
pub fn session_expired(logged_in_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now < logged_in_at || now - logged_in_at > Duration::seconds(SESSION_TTL_SECS)
}

/// Credential check plus session bookkeeping
pub struct SessionGate {
    session: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    credentials: AdminCredentials,
}

impl SessionGate {
    pub fn new(
        session: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        credentials: AdminCredentials,
    ) -> Self {
        Self {
            session,
            clock,
            credentials,
        }
    }

    /// Attempt a login
    ///
    /// Wrong credentials leave any existing session untouched. If the session
    /// cannot be recorded the gate stays anonymous.
    pub fn login(&self, username: &str, password: &str) -> SessionState {
        if !self.credentials.matches(username, password) {
            warn!("Rejected admin login for {:?}", username);
            return SessionState::Anonymous;
        }

        let now = self.clock.now();
        match self.store_session(now) {
            Ok(()) => {
                info!("Admin logged in");
                SessionState::Authenticated
            }
            Err(e) => {
                warn!("Could not record admin session: {}", e);
                SessionState::Anonymous
            }
        }
    }

    /// Current state; an expired or malformed session is cleared
    pub fn check(&self) -> SessionState {
        match self.logged_in_at() {
            Ok(Some(at)) if !session_expired(at, self.clock.now()) => SessionState::Authenticated,
            Ok(Some(_)) => {
                info!("Admin session expired");
                self.clear();
                SessionState::Anonymous
            }
            Ok(None) => {
                self.clear();
                SessionState::Anonymous
            }
            Err(e) => {
                warn!("Could not read admin session: {}", e);
                SessionState::Anonymous
            }
        }
    }

    pub fn logout(&self) {
        self.clear();
        info!("Admin logged out");
    }

    /// Login time of a well-formed session, if any
    fn logged_in_at(&self) -> Result<Option<DateTime<Utc>>> {
        let flag = self.session.get(LOGGED_IN_KEY)?;
        if flag.as_deref() != Some("true") {
            return Ok(None);
        }

        let at = self
            .session
            .get(LOGIN_TIME_KEY)?
            .and_then(|millis| millis.trim().parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis);
        Ok(at)
    }

    fn store_session(&self, now: DateTime<Utc>) -> Result<()> {
        self.session.set(LOGGED_IN_KEY, "true")?;
        self.session
            .set(LOGIN_TIME_KEY, &now.timestamp_millis().to_string())?;
        Ok(())
    }

    fn clear(&self) {
        for key in [LOGGED_IN_KEY, LOGIN_TIME_KEY] {
            if let Err(e) = self.session.remove(key) {
                warn!("Could not clear session key {}: {}", key, e);
            }
        }
    }
}
