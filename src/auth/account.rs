//! Login, logout, registration and status screens

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};

use super::jwt::decode_claims;
use super::session::Session;
use super::Storage;
use crate::api::{self, ApiClient, ApiError};
use crate::config::Config;

/// Both password entries must match before anything is sent.
pub fn check_confirmation(password: &str, confirm: &str) -> Result<()> {
    if password.is_empty() {
        bail!("Password cannot be empty.");
    }
    if password != confirm {
        bail!("Passwords do not match.");
    }
    Ok(())
}

/// Log in and persist the returned tokens.
pub async fn login<S: Storage>(api: &mut ApiClient<S>, username: &str, password: &str) -> Result<()> {
    match api::auth::login(api, username, password).await {
        Ok(_) => {
            let role = Session::new(api.store()).role();
            match role {
                Some(role) => println!("Login successful ({}).", role),
                None => println!("Login successful."),
            }
            Ok(())
        }
        Err(ApiError::Unauthenticated | ApiError::Forbidden) => {
            bail!("Wrong username or password.")
        }
        Err(e) => Err(anyhow::Error::new(e).context("Server error. Try again later.")),
    }
}

/// Clear stored credentials
pub fn logout<S: Storage>(api: &mut ApiClient<S>) -> Result<()> {
    api.store_mut().clear()?;
    println!("Logged out.");
    Ok(())
}

/// Create a USER account.
pub async fn register<S: Storage>(
    api: &mut ApiClient<S>,
    username: &str,
    password: &str,
    confirm: &str,
    email: Option<&str>,
) -> Result<()> {
    check_confirmation(password, confirm)?;

    match api::auth::register(api, username, password, email).await {
        Ok(_) => {
            println!("Account created. You can now log in.");
            Ok(())
        }
        Err(ApiError::Conflict(_)) => bail!("Username already taken."),
        Err(ApiError::InvalidData(_)) => bail!("Invalid data."),
        Err(e) => Err(anyhow::Error::new(e).context("Server error. Try again later.")),
    }
}

/// Create an ADMIN account.
pub async fn create_admin<S: Storage>(
    api: &mut ApiClient<S>,
    username: &str,
    password: &str,
    confirm: &str,
    email: Option<&str>,
) -> Result<()> {
    check_confirmation(password, confirm)?;

    match api::auth::register_admin(api, username, password, email).await {
        Ok(_) => {
            println!("Admin '{}' created.", username);
            Ok(())
        }
        Err(ApiError::Conflict(_)) => bail!("Username already taken."),
        Err(e) if e.is_auth_failure() => bail!("Access denied. ADMIN required."),
        Err(ApiError::InvalidData(_)) => bail!("Invalid data."),
        Err(e) => Err(anyhow::Error::new(e).context("Server error. Try again later.")),
    }
}

fn format_timestamp(secs: f64) -> String {
    DateTime::<Utc>::from_timestamp(secs as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

/// Display current auth status
pub fn status<S: Storage>(api: &ApiClient<S>, config: &Config) -> Result<()> {
    let store = api.store();
    let session = Session::new(store);

    println!("API:         {}", config.api_url);

    match store.access_token() {
        Some(token) => {
            let expires_at = decode_claims(&token).and_then(|c| c.expires_at());
            if session.is_expired() {
                println!("Access tok:  expired");
            } else {
                println!("Access tok:  valid");
            }
            if let Some(exp) = expires_at {
                println!("  expires_at: {}", format_timestamp(exp));
            }
            match session.role() {
                Some(role) => println!("Role:        {}", role),
                None => println!("Role:        none"),
            }
        }
        None => println!("Access tok:  none"),
    }

    match store.refresh_token() {
        Some(_) => println!("Refresh tok: present"),
        None => println!("Refresh tok: none"),
    }

    if !session.has_token() {
        println!("\nRun 'commandes-cli login' to authenticate.");
    }

    Ok(())
}
