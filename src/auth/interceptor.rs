//! Bearer token injection for outgoing API requests

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Request;

use super::storage::Storage;
use super::tokens::TokenStore;

/// Endpoints used to obtain a token in the first place.
///
/// `/auth/register-admin` is not one of them: only an admin may call it.
pub const BOOTSTRAP_ENDPOINTS: &[&str] = &["/auth/login", "/auth/register"];

fn is_bootstrap(request: &Request) -> bool {
    let path = request.url().path().trim_end_matches('/');
    BOOTSTRAP_ENDPOINTS.iter().any(|ep| path.ends_with(ep))
}

/// Attach `Authorization: Bearer <token>` when a token is stored.
///
/// Expiry is not checked here; the server decides and the caller handles
/// the 401.
pub fn augment<S: Storage>(store: &TokenStore<S>, mut request: Request) -> Request {
    if !store.is_attached() || is_bootstrap(&request) {
        return request;
    }

    let Some(token) = store.access_token() else {
        return request;
    };

    match HeaderValue::from_str(&format!("Bearer {}", token)) {
        Ok(mut value) => {
            value.set_sensitive(true);
            request.headers_mut().insert(AUTHORIZATION, value);
            tracing::debug!("Attached bearer token to {} {}", request.method(), request.url());
        }
        Err(_) => {
            tracing::warn!("Stored access token is not a valid header value, sending without it");
        }
    }

    request
}
