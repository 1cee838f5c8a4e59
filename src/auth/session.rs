//! Session queries derived from the stored access token
//!
//! Nothing here is cached: every call re-reads the store and re-decodes
//! the token, so a concurrent logout or login is always observed.

use std::time::{SystemTime, UNIX_EPOCH};

use super::jwt::decode_claims;
use super::role::{resolve_role, Role};
use super::storage::Storage;
use super::tokens::TokenStore;

/// Coarse session state a guard decides on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoToken,
    Expired,
    Valid(Option<Role>),
}

/// Current wall-clock time in Unix seconds.
pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Read-only view over a token store.
pub struct Session<'a, S> {
    store: &'a TokenStore<S>,
}

impl<'a, S: Storage> Session<'a, S> {
    pub fn new(store: &'a TokenStore<S>) -> Self {
        Self { store }
    }

    pub fn has_token(&self) -> bool {
        self.store.access_token().is_some()
    }

    /// Missing token, undecodable token or missing `exp` all count as expired.
    pub fn is_expired_at(&self, now: i64) -> bool {
        let Some(token) = self.store.access_token() else {
            return true;
        };
        match decode_claims(&token).and_then(|c| c.expires_at()) {
            Some(exp) => exp <= now as f64,
            None => true,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_secs())
    }

    pub fn role(&self) -> Option<Role> {
        let token = self.store.access_token()?;
        let claims = decode_claims(&token)?;
        resolve_role(&claims)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    pub fn state_at(&self, now: i64) -> SessionState {
        if !self.has_token() {
            SessionState::NoToken
        } else if self.is_expired_at(now) {
            SessionState::Expired
        } else {
            SessionState::Valid(self.role())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::test_tokens::{make_token, token_with_role};
    use crate::auth::storage::MemoryStorage;
    use crate::auth::tokens::ACCESS_TOKEN_KEY;
    use serde_json::json;

    fn store_with(token: &str) -> TokenStore<MemoryStorage> {
        let mut storage = MemoryStorage::new();
        storage.set(ACCESS_TOKEN_KEY, token).unwrap();
        TokenStore::new(storage)
    }

    #[test]
    fn test_no_token() {
        let store = TokenStore::new(MemoryStorage::new());
        let session = Session::new(&store);
        assert!(!session.has_token());
        assert!(session.is_expired());
        assert_eq!(session.role(), None);
        assert_eq!(session.state_at(now_secs()), SessionState::NoToken);
    }

    #[test]
    fn test_expiry_boundaries() {
        let now = 1_800_000_000;

        let past = store_with(&make_token(&json!({"exp": now - 1})));
        assert!(Session::new(&past).is_expired_at(now));

        let exact = store_with(&make_token(&json!({"exp": now})));
        assert!(Session::new(&exact).is_expired_at(now));

        let future = store_with(&make_token(&json!({"exp": now + 3600})));
        assert!(!Session::new(&future).is_expired_at(now));
    }

    #[test]
    fn test_expiry_against_wall_clock() {
        let expired = store_with(&token_with_role("ROLE_USER", -1));
        assert!(Session::new(&expired).is_expired());

        let valid = store_with(&token_with_role("ROLE_USER", 3600));
        assert!(!Session::new(&valid).is_expired());
    }

    #[test]
    fn test_missing_exp_fails_closed() {
        let store = store_with(&make_token(&json!({"role": "ROLE_ADMIN"})));
        let session = Session::new(&store);
        assert!(session.has_token());
        assert!(session.is_expired());
        assert_eq!(session.state_at(now_secs()), SessionState::Expired);
    }

    #[test]
    fn test_malformed_token() {
        let store = store_with("not-a-jwt");
        let session = Session::new(&store);
        assert!(session.has_token());
        assert!(session.is_expired());
        assert_eq!(session.role(), None);
        assert!(!session.is_admin());
    }

    #[test]
    fn test_valid_states() {
        let now = now_secs();
        let admin = store_with(&token_with_role("ROLE_ADMIN", 3600));
        assert!(Session::new(&admin).is_admin());
        assert_eq!(
            Session::new(&admin).state_at(now),
            SessionState::Valid(Some(Role::Admin))
        );

        let user = store_with(&token_with_role("ROLE_USER", 3600));
        assert!(!Session::new(&user).is_admin());
        assert_eq!(
            Session::new(&user).state_at(now),
            SessionState::Valid(Some(Role::User))
        );
    }

    #[test]
    fn test_detached_store_is_unauthenticated() {
        let store: TokenStore<MemoryStorage> = TokenStore::detached();
        assert_eq!(Session::new(&store).state_at(now_secs()), SessionState::NoToken);
    }
}
