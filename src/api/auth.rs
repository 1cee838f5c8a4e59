//! Authentication endpoints: login and account creation

use serde_json::Value;

use super::{ApiClient, ApiError};
use crate::auth::Storage;
use crate::models::{AuthResponse, Credentials, Registration};

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";
const REGISTER_ADMIN_PATH: &str = "/auth/register-admin";

/// Exchange credentials for tokens and persist them.
pub async fn login<S: Storage>(
    client: &mut ApiClient<S>,
    username: &str,
    password: &str,
) -> Result<AuthResponse, ApiError> {
    tracing::debug!("Logging in as {}", username);
    let tokens: AuthResponse = client
        .post(LOGIN_PATH, &Credentials { username, password })
        .await?;
    client
        .store_mut()
        .store(&tokens)
        .map_err(ApiError::Session)?;
    Ok(tokens)
}

/// Self-service account creation, always as USER. The backend answers text.
pub async fn register<S: Storage>(
    client: &mut ApiClient<S>,
    username: &str,
    password: &str,
    email: Option<&str>,
) -> Result<String, ApiError> {
    let body = Registration {
        username,
        password,
        email,
        role: Some("USER"),
    };
    client.post_text(REGISTER_PATH, &body).await
}

/// Create an administrator; needs an ADMIN session.
pub async fn register_admin<S: Storage>(
    client: &mut ApiClient<S>,
    username: &str,
    password: &str,
    email: Option<&str>,
) -> Result<Value, ApiError> {
    let body = Registration {
        username,
        password,
        email,
        role: None,
    };
    let text = client.post_text(REGISTER_ADMIN_PATH, &body).await?;
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}
