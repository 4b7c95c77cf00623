//! # API crate — shared client SDK for the Visa Gateway platform
//!
//! Every surface of the platform (the public site, the user portal, the
//! staff admin panel) talks to the same remote REST backend. This crate is
//! the one shared client: it owns the authenticated-request/token-refresh
//! protocol and exposes typed operations for each route group, so no surface
//! re-derives the retry logic.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | registration, login, logout, OTP verification, profile read/update |
//! | [`catalog`] | public directory data — countries, visa types, site settings, consultation booking |
//! | [`applications`] | the authenticated user's visa applications, including document upload |
//! | [`admin`] | [`AdminClient`] — the staff surface with its own login, refresh route and storage namespace |
//! | [`config`] | base URL and route-group helpers |
//! | [`events`] | [`AuthEvents`] — broadcast of session changes to independent observers |
//! | [`error`] | [`ApiError`] |
//!
//! ## The session
//!
//! Tokens and the cached profile live in a [`SessionStore`] (re-exported
//! from the `store` crate). The store is the single source of truth: the
//! request wrapper reads the access token from it on every call, the refresh
//! protocol writes the replacement token back into it, and observers
//! notified through [`AuthEvents`] re-read it rather than receiving payloads.
//!
//! ```no_run
//! use api::{Client, MemoryStore};
//!
//! # async fn run() -> Result<(), api::ApiError> {
//! let client = Client::new(MemoryStore::new());
//! client.login("amira@example.com", "hunter2!").await?;
//! let countries = client.list_countries().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::broadcast;

pub mod admin;
pub mod applications;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
mod http;

pub use admin::AdminClient;
pub use config::ApiConfig;
pub use error::ApiError;
pub use events::{AuthEvent, AuthEvents};
#[cfg(not(target_arch = "wasm32"))]
pub use store::{session_dir, FileStore};
pub use store::{MemoryStore, Session, SessionStore, UserProfile};

/// Client for the user-facing surfaces (public site and user portal).
///
/// Cheap to clone; clones share the underlying HTTP engine, session store
/// and event hub.
#[derive(Clone)]
pub struct Client<S: SessionStore> {
    http: Arc<http::AuthHttp<S>>,
    config: ApiConfig,
}

impl<S: SessionStore> Client<S> {
    /// Client against the configured deployment (`VISA_API_BASE_URL` or the
    /// production default).
    pub fn new(store: S) -> Self {
        Self::with_config(ApiConfig::from_env(), store)
    }

    /// Client against an explicit deployment. Used by tests and local runs.
    pub fn with_config(config: ApiConfig, store: S) -> Self {
        let refresh_url = config.accounts("login/refresh/");
        Self {
            http: Arc::new(http::AuthHttp::new(store, refresh_url)),
            config,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Register an observer for session changes.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.http.events().subscribe()
    }

    /// Current session, if one is stored.
    pub async fn session(&self) -> Option<Session> {
        self.http.store().load().await
    }

    /// Cached profile from the last login or profile fetch.
    pub async fn current_user(&self) -> Option<UserProfile> {
        self.session().await.and_then(|s| s.user)
    }

    /// Whether an access token is stored. Validity is only discovered when
    /// the server rejects it.
    pub async fn is_authenticated(&self) -> bool {
        self.session().await.is_some_and(|s| s.has_access_token())
    }

    pub(crate) fn http(&self) -> &http::AuthHttp<S> {
        &self.http
    }
}
