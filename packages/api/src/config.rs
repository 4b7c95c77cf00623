//! # API endpoint configuration
//!
//! One [`ApiConfig`] per backend deployment. The backend mounts four route
//! groups under a single base URL:
//!
//! | Helper | Prefix | Serves |
//! |--------|--------|--------|
//! | [`ApiConfig::accounts`] | `/api/accounts/` | registration, login, token refresh, logout, profile, OTP |
//! | [`ApiConfig::catalog`] | `/api/` | countries, visa types, site settings, consultation booking |
//! | [`ApiConfig::v2`] | `/api/v2/` | the authenticated user's visa applications |
//! | [`ApiConfig::admin`] | `/api/admin/` | the staff panel (own login and refresh routes, CRUD, review) |
//!
//! The base URL comes from `VISA_API_BASE_URL` (loaded through `dotenvy`,
//! falling back to the production deployment), or from
//! [`ApiConfig::new`] for tests against a local mock.

const DEFAULT_BASE_URL: &str = "https://visa-gateway-api-v1.vercel.app";

/// Environment variable overriding the default base URL.
pub const BASE_URL_ENV: &str = "VISA_API_BASE_URL";

/// Base URL and route-group helpers for one backend deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ApiConfig {
    /// Config for an explicit base URL. A trailing slash is tolerated.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Read the base URL from the environment (`.env` files included),
    /// falling back to the production deployment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.is_empty() => Self::new(url),
            _ => Self::default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Account route: `{base}/api/accounts/{path}`.
    pub fn accounts(&self, path: &str) -> String {
        format!("{}/api/accounts/{}", self.base_url, path)
    }

    /// Public catalog route: `{base}/api/{path}`.
    pub fn catalog(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// User application route: `{base}/api/v2/{path}`.
    pub fn v2(&self, path: &str) -> String {
        format!("{}/api/v2/{}", self.base_url, path)
    }

    /// Admin panel route: `{base}/api/admin/{path}`.
    pub fn admin(&self, path: &str) -> String {
        format!("{}/api/admin/{}", self.base_url, path)
    }

    /// Absolute URL for a media path. Server responses carry image and
    /// document paths relative to the deployment root.
    pub fn media(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}
