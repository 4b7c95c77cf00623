//! # Authenticated request wrapper and refresh protocol
//!
//! [`AuthHttp`] is the one piece of logic every surface shares. It wraps an
//! outbound HTTP call, attaches the stored access token, and transparently
//! handles access-token expiry:
//!
//! 1. Read the access token from the store. Absent → the request goes out
//!    anonymously, and a 401 on it is returned to the caller untouched.
//! 2. Apply a default `Content-Type: application/json`; caller-supplied
//!    headers win (multipart bodies keep reqwest's boundary header).
//! 3. Issue the request.
//! 4. On 401 with a token attached, exchange the refresh token for a new
//!    access token and re-issue the original request exactly once. A second
//!    401 is the caller's to inspect. A failed refresh tears the session
//!    down, broadcasts [`AuthEvent::LoggedOut`], and surfaces
//!    [`ApiError::SessionExpired`].
//!
//! No other status triggers a retry, and network failures propagate as
//! [`ApiError::Transport`] without recovery.
//!
//! Concurrent flows that hit 401 at the same time are de-duplicated: the
//! refresh runs behind a [`tokio::sync::Mutex`], and a flow that acquires
//! the lock after another flow already refreshed re-uses the new token
//! instead of issuing its own refresh call.

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use store::SessionStore;
use tokio::sync::Mutex;

use crate::error::ApiError;
use crate::events::{AuthEvent, AuthEvents};

/// Wire shape of the refresh endpoint response. `refresh` is present only
/// when the server rotates refresh tokens.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// A request body that can be replayed for the single post-refresh retry.
#[derive(Clone, Debug, Default)]
pub(crate) enum Payload {
    #[default]
    Empty,
    Json(serde_json::Value),
    Form(Vec<FormPart>),
}

/// One field of a multipart body, kept rebuildable so the request can be
/// re-issued after a refresh.
#[derive(Clone, Debug)]
pub(crate) enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

fn build_form(parts: &[FormPart]) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
            FormPart::File {
                name,
                file_name,
                mime,
                bytes,
            } => {
                let file = reqwest::multipart::Part::bytes(bytes.clone()).file_name(file_name.clone());
                let file = match file.mime_str(mime) {
                    Ok(with_mime) => with_mime,
                    Err(_) => {
                        reqwest::multipart::Part::bytes(bytes.clone()).file_name(file_name.clone())
                    }
                };
                form.part(name.clone(), file)
            }
        };
    }
    form
}

/// Shared HTTP engine for one surface: a reqwest client, the session store,
/// the event hub, and that surface's refresh route.
pub(crate) struct AuthHttp<S> {
    http: reqwest::Client,
    store: S,
    events: AuthEvents,
    refresh_url: String,
    refresh_lock: Mutex<()>,
}

impl<S: SessionStore> AuthHttp<S> {
    pub(crate) fn new(store: S, refresh_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            store,
            events: AuthEvents::new(),
            refresh_url,
            refresh_lock: Mutex::new(()),
        }
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn events(&self) -> &AuthEvents {
        &self.events
    }

    /// Issue an authenticated request per the contract above.
    pub(crate) async fn request(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: &Payload,
    ) -> Result<Response, ApiError> {
        let token = self.access_token().await;
        let response = self
            .issue(method.clone(), url, &headers, body, token.as_deref())
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        let Some(stale) = token else {
            // Anonymous request: the 401 goes back to the caller untouched.
            return Ok(response);
        };

        if !self.refresh(&stale).await {
            self.force_logout().await;
            return Err(ApiError::SessionExpired);
        }

        let fresh = self.access_token().await;
        // Exactly one retry; a second 401 is returned as-is.
        self.issue(method, url, &headers, body, fresh.as_deref())
            .await
    }

    /// One-shot request that never attaches a token and never refreshes.
    /// Used for login, registration, OTP and the refresh call itself.
    pub(crate) async fn post_json_public<T: DeserializeOwned>(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<T, ApiError> {
        let response = self
            .issue(Method::POST, url, &HeaderMap::new(), &Payload::Json(body), None)
            .await?;
        Self::decode(response).await
    }

    async fn access_token(&self) -> Option<String> {
        self.store
            .load()
            .await
            .filter(|s| s.has_access_token())
            .map(|s| s.access_token)
    }

    async fn issue(
        &self,
        method: Method,
        url: &str,
        headers: &HeaderMap,
        body: &Payload,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let mut builder = self.http.request(method, url);
        builder = match body {
            Payload::Empty => builder,
            Payload::Json(value) => builder.json(value),
            Payload::Form(parts) => builder.multipart(build_form(parts)),
        };
        // Default content type for body-less requests; `.json()` sets it for
        // JSON bodies and multipart keeps reqwest's boundary header.
        if matches!(body, Payload::Empty) && !headers.contains_key(CONTENT_TYPE) {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        builder = builder.headers(headers.clone());
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder.send().await?)
    }

    /// Exchange the stored refresh token for a new access token. Returns
    /// whether the store now holds a usable token. The store is not cleared
    /// here on failure; the caller owns the teardown.
    async fn refresh(&self, stale_access: &str) -> bool {
        let _guard = self.refresh_lock.lock().await;

        let Some(session) = self.store.load().await else {
            return false;
        };
        if session.access_token != stale_access {
            // Another flow refreshed while we waited on the lock.
            return true;
        }
        if !session.has_refresh_token() {
            return false;
        }

        tracing::debug!("access token rejected, refreshing");
        let result = self
            .http
            .post(&self.refresh_url)
            .json(&serde_json::json!({ "refresh": session.refresh_token }))
            .send()
            .await;
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("token refresh failed: {e}");
                return false;
            }
        };
        if !response.status().is_success() {
            tracing::error!(status = response.status().as_u16(), "token refresh rejected");
            return false;
        }
        let tokens: RefreshResponse = match response.json().await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::error!("token refresh returned an unreadable body: {e}");
                return false;
            }
        };

        let mut updated = session;
        updated.access_token = tokens.access;
        if let Some(rotated) = tokens.refresh {
            updated.refresh_token = rotated;
        }
        self.store.save(&updated).await;
        self.events.notify(AuthEvent::TokenRefreshed);
        true
    }

    /// Tear the session down after an irrecoverable refresh failure.
    pub(crate) async fn force_logout(&self) {
        if self.store.load().await.is_none() {
            return;
        }
        self.store.clear().await;
        self.events.notify(AuthEvent::LoggedOut);
        tracing::debug!("session cleared after refresh failure");
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self
            .request(Method::GET, url, HeaderMap::new(), &Payload::Empty)
            .await?;
        Self::decode(response).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<T, ApiError> {
        let response = self
            .request(Method::POST, url, HeaderMap::new(), &Payload::Json(body))
            .await?;
        Self::decode(response).await
    }

    pub(crate) async fn put_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<T, ApiError> {
        let response = self
            .request(Method::PUT, url, HeaderMap::new(), &Payload::Json(body))
            .await?;
        Self::decode(response).await
    }

    pub(crate) async fn patch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<T, ApiError> {
        let response = self
            .request(Method::PATCH, url, HeaderMap::new(), &Payload::Json(body))
            .await?;
        Self::decode(response).await
    }

    pub(crate) async fn post_form<T: DeserializeOwned>(
        &self,
        url: &str,
        parts: Vec<FormPart>,
    ) -> Result<T, ApiError> {
        let response = self
            .request(Method::POST, url, HeaderMap::new(), &Payload::Form(parts))
            .await?;
        Self::decode(response).await
    }

    pub(crate) async fn put_form<T: DeserializeOwned>(
        &self,
        url: &str,
        parts: Vec<FormPart>,
    ) -> Result<T, ApiError> {
        let response = self
            .request(Method::PUT, url, HeaderMap::new(), &Payload::Form(parts))
            .await?;
        Self::decode(response).await
    }

    /// DELETE, expecting an empty success body.
    pub(crate) async fn delete(&self, url: &str) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, url, HeaderMap::new(), &Payload::Empty)
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}
