//! # Session and profile models
//!
//! Defines the two data structures the store crate persists:
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`Session`] | The token pair issued at login plus an optional cached profile. At most one session exists per store; every mutation replaces it wholesale. |
//! | [`UserProfile`] | The snapshot of the account as last returned by the accounts API. Server-owned — the client overwrites this cache on every profile fetch or update and never merges fields. |
//!
//! Both types are `Serialize + Deserialize` so they can be written to the
//! session file by [`crate::FileStore`] and carried across the API boundary.

use serde::{Deserialize, Serialize};

/// The client-side session: access token, refresh token, cached profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Short-lived credential attached to every authenticated request.
    pub access_token: String,
    /// Longer-lived credential exchanged for a new access token on 401.
    pub refresh_token: String,
    /// Profile as of the last login or profile fetch, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

impl Session {
    /// Create a session from a freshly issued token pair.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            user: None,
        }
    }

    /// Attach a cached profile.
    pub fn with_user(mut self, user: UserProfile) -> Self {
        self.user = Some(user);
        self
    }

    /// Whether an access token is present. Says nothing about validity —
    /// that is only discovered when the server rejects a request.
    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Whether a refresh token is present.
    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

/// Account snapshot as returned by the accounts API.
///
/// Dates travel as strings in the server's own format; the client never
/// parses or validates them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl UserProfile {
    /// Display name: full name when present, otherwise the username.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}
