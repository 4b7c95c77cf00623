//! # Account operations
//!
//! Registration, login, logout, OTP verification and profile management
//! against the `/api/accounts/` route group.
//!
//! Login and registration populate the session store with the issued token
//! pair and the returned profile, then broadcast
//! [`AuthEvent::LoggedIn`](crate::AuthEvent::LoggedIn). Logout is
//! best-effort towards the server (it blacklists the refresh token) but
//! always tears the local session down. Profile reads and updates overwrite
//! the cached snapshot wholesale — no field-level merging.
//!
//! Credential endpoints are called anonymously and outside the refresh
//! path: a 401 from `login/` means bad credentials, not an expired token,
//! and is surfaced as [`ApiError::Status`] for the caller to inspect.

use serde::{Deserialize, Serialize};
use serde_json::json;
use store::{Session, SessionStore, UserProfile};

use crate::error::ApiError;
use crate::events::AuthEvent;
use crate::http::FormPart;
use crate::Client;

/// Registration payload. `password2` must repeat `password`; the server
/// validates the pair.
#[derive(Clone, Debug, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub password2: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Partial profile update. `None` fields are left untouched server-side;
/// the response still replaces the whole cached snapshot.
#[derive(Clone, Debug, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub profile_picture: Option<FileUpload>,
}

/// An in-memory file destined for a multipart field.
#[derive(Clone, Debug)]
pub struct FileUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct TokenPair {
    access: String,
    refresh: String,
}

/// Login and registration both answer `{message, tokens, user}`.
#[derive(Debug, Deserialize)]
struct AuthResponse {
    tokens: TokenPair,
    user: UserProfile,
}

impl<S: SessionStore> Client<S> {
    /// Create an account. On success the returned tokens and profile are
    /// stored and `LoggedIn` is broadcast.
    pub async fn register(&self, request: &RegisterRequest) -> Result<UserProfile, ApiError> {
        let url = self.config().accounts("register/");
        let body = serde_json::to_value(request).map_err(|e| ApiError::Decode(e.to_string()))?;
        let auth: AuthResponse = self.http().post_json_public(&url, body).await?;
        self.store_login(auth).await
    }

    /// Exchange credentials for a token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ApiError> {
        let url = self.config().accounts("login/");
        let auth: AuthResponse = self
            .http()
            .post_json_public(&url, json!({ "email": email, "password": password }))
            .await?;
        self.store_login(auth).await
    }

    async fn store_login(&self, auth: AuthResponse) -> Result<UserProfile, ApiError> {
        let session =
            Session::new(auth.tokens.access, auth.tokens.refresh).with_user(auth.user.clone());
        self.http().store().save(&session).await;
        self.http().events().notify(AuthEvent::LoggedIn);
        Ok(auth.user)
    }

    /// Log out. Asks the server to blacklist the refresh token, then clears
    /// the local session regardless of whether that call succeeded.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let refresh_token = self
            .session()
            .await
            .filter(Session::has_refresh_token)
            .map(|s| s.refresh_token);

        if let Some(token) = refresh_token {
            let url = self.config().accounts("logout/");
            match self
                .http()
                .post_json::<serde_json::Value>(&url, json!({ "refresh_token": token }))
                .await
            {
                // The refresh path already tore the session down.
                Err(ApiError::SessionExpired) => return Ok(()),
                Err(e) => tracing::debug!("server-side logout failed: {e}"),
                Ok(_) => {}
            }
        }

        self.http().store().clear().await;
        self.http().events().notify(AuthEvent::LoggedOut);
        Ok(())
    }

    /// Fetch the profile and overwrite the cached snapshot.
    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        let url = self.config().accounts("profile/");
        let user: UserProfile = self.http().get_json(&url).await?;
        self.cache_profile(&user).await;
        Ok(user)
    }

    /// Update the profile. The server takes multipart form data so the
    /// profile picture can ride along with the text fields, and answers
    /// with the updated profile snapshot.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        let url = self.config().accounts("profile/");

        let mut parts = Vec::new();
        let text = |name: &str, value: &Option<String>| {
            value.as_ref().map(|value| FormPart::Text {
                name: name.to_string(),
                value: value.clone(),
            })
        };
        parts.extend(text("first_name", &update.first_name));
        parts.extend(text("last_name", &update.last_name));
        parts.extend(text("phone_number", &update.phone_number));
        parts.extend(text("date_of_birth", &update.date_of_birth));
        parts.extend(text("address", &update.address));
        if let Some(picture) = &update.profile_picture {
            parts.push(FormPart::File {
                name: "profile_picture".to_string(),
                file_name: picture.file_name.clone(),
                mime: picture.mime.clone(),
                bytes: picture.bytes.clone(),
            });
        }

        match self.http().put_form::<UserProfile>(&url, parts).await {
            Ok(user) => {
                self.cache_profile(&user).await;
                Ok(user)
            }
            // A deployment that answers with a plain message instead of the
            // profile still gets a correct cache via a follow-up fetch.
            Err(ApiError::Decode(_)) => self.profile().await,
            Err(e) => Err(e),
        }
    }

    async fn cache_profile(&self, user: &UserProfile) {
        if let Some(mut session) = self.http().store().load().await {
            session.user = Some(user.clone());
            self.http().store().save(&session).await;
            self.http().events().notify(AuthEvent::ProfileUpdated);
        }
    }

    /// Request a one-time code for the given address.
    pub async fn send_otp(&self, email: &str) -> Result<(), ApiError> {
        let url = self.config().accounts("otp/send/");
        let _: serde_json::Value = self
            .http()
            .post_json_public(&url, json!({ "email": email }))
            .await?;
        Ok(())
    }

    /// Submit a one-time code for verification.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<(), ApiError> {
        let url = self.config().accounts("otp/verify/");
        let _: serde_json::Value = self
            .http()
            .post_json_public(&url, json!({ "email": email, "otp": otp }))
            .await?;
        Ok(())
    }

    /// Re-send the one-time code.
    pub async fn resend_otp(&self, email: &str) -> Result<(), ApiError> {
        let url = self.config().accounts("otp/resend/");
        let _: serde_json::Value = self
            .http()
            .post_json_public(&url, json!({ "email": email }))
            .await?;
        Ok(())
    }
}
