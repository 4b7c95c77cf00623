//! Error type for every client operation.

use thiserror::Error;

/// What went wrong with an API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport could not complete the call (DNS, connectivity, the
    /// transport's own timeout). Never retried.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status the client does not
    /// handle itself. Includes a 401 on a retried request and a 401 on an
    /// anonymous request — both go back to the caller as-is.
    #[error("server returned {status}: {body}")]
    Status {
        status: u16,
        /// Raw response body, usually a JSON error document.
        body: String,
    },

    /// The refresh token was rejected or absent. The session has already
    /// been cleared and a logout broadcast; callers should return the user
    /// to an unauthenticated view.
    #[error("session expired, log in again")]
    SessionExpired,

    /// The response body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status of the response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the caller should treat this as "not authenticated".
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::SessionExpired) || self.status() == Some(401)
    }
}
