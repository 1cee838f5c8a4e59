//! Token storage and management

use anyhow::Result;

use super::storage::Storage;
use crate::models::AuthResponse;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Access/refresh token pair over an optional storage backend.
///
/// A detached store stands for an execution context without persistent
/// storage: reads see nothing and writes are dropped.
#[derive(Debug)]
pub struct TokenStore<S> {
    storage: Option<S>,
}

impl<S: Storage> TokenStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage: Some(storage),
        }
    }

    pub fn detached() -> Self {
        Self { storage: None }
    }

    pub fn is_attached(&self) -> bool {
        self.storage.is_some()
    }

    /// Stored access token; an empty string counts as no token.
    pub fn access_token(&self) -> Option<String> {
        self.storage
            .as_ref()
            .and_then(|s| s.get(ACCESS_TOKEN_KEY))
            .filter(|t| !t.is_empty())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.storage
            .as_ref()
            .and_then(|s| s.get(REFRESH_TOKEN_KEY))
            .filter(|t| !t.is_empty())
    }

    /// Persist the tokens from a successful login.
    pub fn store(&mut self, tokens: &AuthResponse) -> Result<()> {
        let Some(storage) = self.storage.as_mut() else {
            tracing::debug!("No persistent storage, login tokens not kept");
            return Ok(());
        };
        storage.set_all(&[
            (ACCESS_TOKEN_KEY, tokens.access_token.as_str()),
            (REFRESH_TOKEN_KEY, tokens.refresh_token.as_str()),
        ])
    }

    /// Forget both tokens (logout).
    pub fn clear(&mut self) -> Result<()> {
        if let Some(storage) = self.storage.as_mut() {
            storage.remove(ACCESS_TOKEN_KEY)?;
            storage.remove(REFRESH_TOKEN_KEY)?;
        }
        Ok(())
    }
}
