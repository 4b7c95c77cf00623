//! # Visa applications — the authenticated user's dashboard data
//!
//! Lives under `/api/v2/visa-applications/`. Every call here requires a
//! session; an expired access token is refreshed transparently by the
//! request wrapper, and a dead refresh token surfaces as
//! [`ApiError::SessionExpired`] after the session has been torn down.
//!
//! Application status (`draft`, `submitted`, `processing`, `approved`,
//! `rejected`) is owned by the server and review staff; the client carries
//! it as an opaque string.

use serde::{Deserialize, Serialize};
use store::SessionStore;

use crate::auth::FileUpload;
use crate::catalog::VisaTypeSummary;
use crate::error::ApiError;
use crate::http::FormPart;
use crate::Client;

/// A submitted document as the server reports it.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ApplicationDocument {
    pub id: i64,
    #[serde(default)]
    pub document_name: Option<String>,
    /// Server-relative file path; resolve with [`crate::ApiConfig::media`].
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// One visa application belonging to the current user.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VisaApplication {
    pub id: i64,
    pub status: String,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub visa_type: Option<VisaTypeSummary>,
    #[serde(default)]
    pub country: Option<ApplicationCountry>,
    #[serde(default)]
    pub documents: Vec<ApplicationDocument>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// The country an application targets, as embedded in application payloads.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ApplicationCountry {
    pub id: i64,
    pub name: String,
}

/// A new application: the visa type applied for plus the initial documents,
/// each named after the required document it satisfies.
#[derive(Clone, Debug)]
pub struct NewApplication {
    pub visa_type_id: i64,
    pub documents: Vec<(String, FileUpload)>,
}

fn document_parts(documents: &[(String, FileUpload)]) -> impl Iterator<Item = FormPart> + '_ {
    documents.iter().map(|(name, file)| FormPart::File {
        name: name.clone(),
        file_name: file.file_name.clone(),
        mime: file.mime.clone(),
        bytes: file.bytes.clone(),
    })
}

impl<S: SessionStore> Client<S> {
    /// All applications of the current user.
    pub async fn list_applications(&self) -> Result<Vec<VisaApplication>, ApiError> {
        self.http().get_json(&self.config().v2("visa-applications/")).await
    }

    /// One application by id.
    pub async fn application(&self, id: i64) -> Result<VisaApplication, ApiError> {
        self.http()
            .get_json(&self.config().v2(&format!("visa-applications/{id}/")))
            .await
    }

    /// Submit a new application with its documents as one multipart request.
    pub async fn submit_application(
        &self,
        application: &NewApplication,
    ) -> Result<VisaApplication, ApiError> {
        let url = self.config().v2("visa-applications/");
        let mut parts = vec![FormPart::Text {
            name: "visa_type".to_string(),
            value: application.visa_type_id.to_string(),
        }];
        parts.extend(document_parts(&application.documents));
        self.http().post_form(&url, parts).await
    }

    /// Upload further documents to an existing application, e.g. after a
    /// rejection asked for replacements. Moves a `draft` to `submitted`
    /// server-side.
    pub async fn upload_documents(
        &self,
        application_id: i64,
        documents: &[(String, FileUpload)],
    ) -> Result<VisaApplication, ApiError> {
        let url = self
            .config()
            .v2(&format!("visa-applications/{application_id}/"));
        let parts = document_parts(documents).collect();
        self.http().put_form(&url, parts).await
    }
}
