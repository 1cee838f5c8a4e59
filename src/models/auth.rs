//! Authentication payloads

use serde::{Deserialize, Serialize};

/// Tokens returned by a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Login request body
#[derive(Debug, Clone, Serialize)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Account creation request body
#[derive(Debug, Clone, Serialize)]
pub struct Registration<'a> {
    pub username: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    /// Only sent on the self-service endpoint, which always asks for USER
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'a str>,
}
