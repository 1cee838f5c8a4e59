//! Typed API failures the screens react to

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("not authenticated or session expired")]
    Unauthenticated,

    #[error("access denied")]
    Forbidden,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("HTTP {status} for {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse response from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to update stored session")]
    Session(#[source] anyhow::Error),
}

impl ApiError {
    /// Classify a non-success response status.
    pub fn from_status(status: StatusCode, url: &str, body: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => ApiError::InvalidData(body),
            StatusCode::UNAUTHORIZED => ApiError::Unauthenticated,
            StatusCode::FORBIDDEN => ApiError::Forbidden,
            StatusCode::NOT_FOUND => ApiError::NotFound(url.to_string()),
            StatusCode::CONFLICT => ApiError::Conflict(body),
            other => ApiError::Status {
                status: other.as_u16(),
                url: url.to_string(),
                body,
            },
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthenticated | ApiError::Forbidden)
    }
}
