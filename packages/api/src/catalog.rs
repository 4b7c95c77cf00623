//! # Public directory data
//!
//! Countries, visa types, site settings and consultation booking under the
//! `/api/` route group. These endpoints serve the marketing site and are
//! anonymous-capable: with no stored token the requests simply go out
//! without an `Authorization` header.
//!
//! ## Types
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`Country`] | A destination with its assigned visa types (summaries). |
//! | [`VisaTypeSummary`] | `{id, name}` as embedded in country listings. |
//! | [`VisaType`] | The detailed visa type: headings, description, process steps, overviews, notes, required documents. |
//! | [`SiteSettings`] | Contact details rendered in the site footer. |
//! | [`ConsultationRequest`] | Payload for the consultation booking form. |

use serde::{Deserialize, Serialize};
use store::SessionStore;

use crate::error::ApiError;
use crate::Client;

/// A destination country in the directory.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Country {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub code: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub types: Vec<VisaTypeSummary>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// The short form of a visa type, as embedded in country listings.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct VisaTypeSummary {
    pub id: i64,
    pub name: String,
}

/// One step of a visa process.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VisaProcess {
    pub id: i64,
    pub points: String,
}

/// An overview block shown on a visa type's detail page.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VisaOverview {
    pub id: i64,
    pub points: String,
    #[serde(default)]
    pub overview: String,
}

/// A free-form note attached to a visa type.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VisaNote {
    pub id: i64,
    pub notes: String,
}

/// A document the applicant must provide.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RequiredDocument {
    pub id: i64,
    pub document_name: String,
}

/// Detailed visa type, as returned by the detail and per-country endpoints.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VisaType {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub headings: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub processes: Vec<VisaProcess>,
    #[serde(default)]
    pub overviews: Vec<VisaOverview>,
    #[serde(default)]
    pub notes: Vec<VisaNote>,
    #[serde(default)]
    pub required_documents: Vec<RequiredDocument>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Contact details shown across the site.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SiteSettings {
    pub id: i64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email2: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub phone_number2: String,
}

/// Consultation booking form payload.
#[derive(Clone, Debug, Serialize)]
pub struct ConsultationRequest {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visa_type: Option<i64>,
}

impl<S: SessionStore> Client<S> {
    /// All destination countries with their visa type summaries.
    pub async fn list_countries(&self) -> Result<Vec<Country>, ApiError> {
        self.http().get_json(&self.config().catalog("countries/")).await
    }

    /// One country by id.
    pub async fn country(&self, id: i64) -> Result<Country, ApiError> {
        self.http()
            .get_json(&self.config().catalog(&format!("countries/{id}/")))
            .await
    }

    /// All visa types, short form.
    pub async fn list_visa_types(&self) -> Result<Vec<VisaTypeSummary>, ApiError> {
        self.http().get_json(&self.config().catalog("visa-types/")).await
    }

    /// One visa type in full detail.
    pub async fn visa_type(&self, id: i64) -> Result<VisaType, ApiError> {
        self.http()
            .get_json(&self.config().catalog(&format!("visa-types/{id}/")))
            .await
    }

    /// Detailed visa types assigned to a country.
    pub async fn country_visa_types(&self, country_id: i64) -> Result<Vec<VisaType>, ApiError> {
        self.http()
            .get_json(&self.config().catalog(&format!("country-visa-types/{country_id}/")))
            .await
    }

    /// Site-wide contact settings.
    pub async fn site_settings(&self) -> Result<SiteSettings, ApiError> {
        self.http().get_json(&self.config().catalog("settings/")).await
    }

    /// Book a consultation.
    pub async fn book_consultation(&self, request: &ConsultationRequest) -> Result<(), ApiError> {
        let url = self.config().catalog("book-consultation/");
        let body = serde_json::to_value(request).map_err(|e| ApiError::Decode(e.to_string()))?;
        let _: serde_json::Value = self.http().post_json(&url, body).await?;
        Ok(())
    }
}
