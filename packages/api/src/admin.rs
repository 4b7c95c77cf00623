//! # Admin panel client
//!
//! The staff surface under `/api/admin/`. It shares the authenticated
//! request wrapper with [`Client`](crate::Client) but is a separate
//! deployment surface: its own login route, its own refresh route
//! (`token/refresh/`), and — when persisted with
//! [`store::FileStore::scoped`] — its own storage namespace, so a staff
//! login never leaks into the user portal and vice versa.
//!
//! Only superusers can log in here; the server enforces that, the client
//! just carries the resulting token pair.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use store::{Session, SessionStore, UserProfile};
use tokio::sync::broadcast;

use crate::applications::VisaApplication;
use crate::catalog::{Country, VisaType};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::events::AuthEvent;
use crate::http::AuthHttp;

/// Admin login answers a flat token pair plus a few identity fields.
#[derive(Debug, Deserialize)]
struct AdminLoginResponse {
    access: String,
    refresh: String,
    email: String,
    username: String,
    #[serde(default)]
    is_superuser: bool,
}

/// Payload for creating or updating a country.
#[derive(Clone, Debug, Serialize)]
pub struct CountryUpsert {
    pub name: String,
    pub description: String,
    pub code: String,
}

/// Payload for creating or updating a visa type.
#[derive(Clone, Debug, Serialize)]
pub struct VisaTypeUpsert {
    pub name: String,
    pub headings: String,
    pub description: String,
}

/// A consultation request awaiting staff follow-up.
#[derive(Clone, Debug, Deserialize)]
pub struct Consultation {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Client for the staff admin panel.
#[derive(Clone)]
pub struct AdminClient<S: SessionStore> {
    http: Arc<AuthHttp<S>>,
    config: ApiConfig,
}

impl<S: SessionStore> AdminClient<S> {
    /// Admin client against the configured deployment.
    pub fn new(store: S) -> Self {
        Self::with_config(ApiConfig::from_env(), store)
    }

    /// Admin client against an explicit deployment.
    pub fn with_config(config: ApiConfig, store: S) -> Self {
        let refresh_url = config.admin("token/refresh/");
        Self {
            http: Arc::new(AuthHttp::new(store, refresh_url)),
            config,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Register an observer for session changes on this surface.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.http.events().subscribe()
    }

    pub async fn session(&self) -> Option<Session> {
        self.http.store().load().await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session().await.is_some_and(|s| s.has_access_token())
    }

    /// Staff login. The server only admits superusers.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ApiError> {
        let url = self.config.admin("login/");
        let response: AdminLoginResponse = self
            .http
            .post_json_public(&url, json!({ "email": email, "password": password }))
            .await?;
        if !response.is_superuser {
            tracing::debug!("admin login succeeded for a non-superuser account");
        }
        let user = UserProfile {
            username: response.username,
            email: response.email,
            ..Default::default()
        };
        let session = Session::new(response.access, response.refresh).with_user(user.clone());
        self.http.store().save(&session).await;
        self.http.events().notify(AuthEvent::LoggedIn);
        Ok(user)
    }

    /// Log out, blacklisting the refresh token server-side when possible.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let refresh_token = self
            .session()
            .await
            .filter(Session::has_refresh_token)
            .map(|s| s.refresh_token);

        if let Some(token) = refresh_token {
            let url = self.config.admin("logout/");
            match self
                .http
                .post_json::<serde_json::Value>(&url, json!({ "refresh": token }))
                .await
            {
                Err(ApiError::SessionExpired) => return Ok(()),
                Err(e) => tracing::debug!("server-side admin logout failed: {e}"),
                Ok(_) => {}
            }
        }

        self.http.store().clear().await;
        self.http.events().notify(AuthEvent::LoggedOut);
        Ok(())
    }

    // Countries

    pub async fn list_countries(&self) -> Result<Vec<Country>, ApiError> {
        self.http.get_json(&self.config.admin("countries/")).await
    }

    pub async fn create_country(&self, country: &CountryUpsert) -> Result<Country, ApiError> {
        let body = serde_json::to_value(country).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.http.post_json(&self.config.admin("countries/"), body).await
    }

    pub async fn update_country(&self, id: i64, country: &CountryUpsert) -> Result<Country, ApiError> {
        let body = serde_json::to_value(country).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.http
            .put_json(&self.config.admin(&format!("countries/{id}/")), body)
            .await
    }

    pub async fn delete_country(&self, id: i64) -> Result<(), ApiError> {
        self.http.delete(&self.config.admin(&format!("countries/{id}/"))).await
    }

    // Visa types

    pub async fn list_visa_types(&self) -> Result<Vec<VisaType>, ApiError> {
        self.http.get_json(&self.config.admin("visa-types/")).await
    }

    pub async fn create_visa_type(&self, visa_type: &VisaTypeUpsert) -> Result<VisaType, ApiError> {
        let body = serde_json::to_value(visa_type).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.http.post_json(&self.config.admin("visa-types/"), body).await
    }

    pub async fn update_visa_type(
        &self,
        id: i64,
        visa_type: &VisaTypeUpsert,
    ) -> Result<VisaType, ApiError> {
        let body = serde_json::to_value(visa_type).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.http
            .put_json(&self.config.admin(&format!("visa-types/{id}/")), body)
            .await
    }

    pub async fn delete_visa_type(&self, id: i64) -> Result<(), ApiError> {
        self.http.delete(&self.config.admin(&format!("visa-types/{id}/"))).await
    }

    /// Assign one visa type to a country.
    pub async fn assign_visa_type(&self, country_id: i64, visa_type_id: i64) -> Result<(), ApiError> {
        let url = self.config.admin(&format!("countries/{country_id}/visa-types/"));
        let _: serde_json::Value = self
            .http
            .post_json(&url, json!({ "visa_type_id": visa_type_id }))
            .await?;
        Ok(())
    }

    /// Replace a country's visa type assignments in one call.
    pub async fn bulk_assign_visa_types(
        &self,
        country_id: i64,
        visa_type_ids: &[i64],
    ) -> Result<(), ApiError> {
        let url = self
            .config
            .admin(&format!("countries/{country_id}/bulk-assign-visa-types/"));
        let _: serde_json::Value = self
            .http
            .post_json(&url, json!({ "visa_type_ids": visa_type_ids }))
            .await?;
        Ok(())
    }

    /// Remove one visa type from a country.
    pub async fn remove_visa_type(&self, country_id: i64, visa_type_id: i64) -> Result<(), ApiError> {
        let url = self
            .config
            .admin(&format!("countries/{country_id}/visa-types/{visa_type_id}/"));
        self.http.delete(&url).await
    }

    // Application review

    /// All submitted applications, across users.
    pub async fn list_applications(&self) -> Result<Vec<VisaApplication>, ApiError> {
        self.http.get_json(&self.config.admin("visa-applications/")).await
    }

    /// Move an application through review. `rejection_reason` accompanies a
    /// `rejected` status so the applicant knows what to fix.
    pub async fn review_application(
        &self,
        application_id: i64,
        status: &str,
        rejection_reason: Option<&str>,
    ) -> Result<VisaApplication, ApiError> {
        let url = self
            .config
            .admin(&format!("visa-applications/{application_id}/"));
        let mut body = json!({ "status": status });
        if let Some(reason) = rejection_reason {
            body["rejection_reason"] = json!(reason);
        }
        self.http.patch_json(&url, body).await
    }

    // Consultations

    pub async fn list_consultations(&self) -> Result<Vec<Consultation>, ApiError> {
        self.http.get_json(&self.config.admin("consultations/")).await
    }

    /// One consultation request by id.
    pub async fn consultation(&self, id: i64) -> Result<Consultation, ApiError> {
        self.http
            .get_json(&self.config.admin(&format!("consultations/{id}/")))
            .await
    }
}
