//! Navigation guards
//!
//! Each guard looks at the session as it is right now and either lets the
//! navigation through or names a new target to navigate to instead.

use anyhow::Result;
use url::form_urlencoded;

use super::session::{Session, SessionState};
use super::storage::Storage;
use super::tokens::TokenStore;
use super::Role;

pub const LOGIN_PATH: &str = "/login";
pub const DEFAULT_LANDING: &str = "/clients";
pub const RETURN_URL_PARAM: &str = "returnUrl";

/// A navigation target split into path and decoded query pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Navigation {
    pub fn parse(target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };

        let query = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        Self {
            path: path.to_string(),
            query,
        }
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Reassemble as `path?query`.
    pub fn url(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }
}

/// `/login?returnUrl=<attempted url>`
pub fn login_redirect(attempted: &Navigation) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair(RETURN_URL_PARAM, &attempted.url())
        .finish();
    format!("{}?{}", LOGIN_PATH, query)
}

/// Result of evaluating a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Proceed,
    Redirect(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Only reachable while logged out (login, registration).
    Guest,
    /// Any valid session.
    Authenticated,
    /// Valid session carrying the ADMIN role.
    Admin,
}

impl Guard {
    pub fn check<S: Storage>(
        &self,
        store: &mut TokenStore<S>,
        nav: &Navigation,
        now: i64,
    ) -> Result<Outcome> {
        let state = Session::new(store).state_at(now);
        tracing::debug!("{:?} guard on {} with session {:?}", self, nav.path, state);

        let outcome = match (self, state) {
            (Guard::Guest, SessionState::Valid(_)) => Outcome::Redirect(return_target(nav)),
            (Guard::Guest, _) => Outcome::Proceed,

            (Guard::Authenticated, SessionState::Valid(_)) => Outcome::Proceed,
            (Guard::Admin, SessionState::Valid(Some(Role::Admin))) => Outcome::Proceed,
            (Guard::Admin, SessionState::Valid(_)) => {
                Outcome::Redirect(DEFAULT_LANDING.to_string())
            }

            (Guard::Authenticated | Guard::Admin, SessionState::NoToken) => {
                store.clear()?;
                Outcome::Redirect(login_redirect(nav))
            }
            (Guard::Authenticated | Guard::Admin, SessionState::Expired) => {
                tracing::info!("Session expired, clearing stored tokens");
                store.clear()?;
                Outcome::Redirect(login_redirect(nav))
            }
        };

        Ok(outcome)
    }
}

/// Where a logged-in user leaving the login screen should land.
///
/// Only same-application paths are honoured.
fn return_target(nav: &Navigation) -> String {
    match nav.query_param(RETURN_URL_PARAM) {
        Some(url) if url.starts_with('/') && !url.starts_with("//") => url.to_string(),
        _ => DEFAULT_LANDING.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::test_tokens::token_with_role;
    use crate::auth::session::now_secs;
    use crate::auth::storage::MemoryStorage;
    use crate::auth::tokens::REFRESH_TOKEN_KEY;
    use crate::models::AuthResponse;

    fn store_with(access: Option<String>) -> TokenStore<MemoryStorage> {
        let mut store = TokenStore::new(MemoryStorage::new());
        if let Some(access) = access {
            store
                .store(&AuthResponse {
                    access_token: access,
                    refresh_token: "refresh".to_string(),
                })
                .unwrap();
        }
        store
    }

    #[test]
    fn test_navigation_parse_and_url() {
        let nav = Navigation::parse("/commandes?clientId=7");
        assert_eq!(nav.path, "/commandes");
        assert_eq!(nav.query_param("clientId"), Some("7"));
        assert_eq!(nav.url(), "/commandes?clientId=7");

        let bare = Navigation::parse("/clients");
        assert!(bare.query.is_empty());
        assert_eq!(bare.url(), "/clients");
    }

    #[test]
    fn test_login_redirect_encodes_return_url() {
        let nav = Navigation::parse("/commandes?clientId=7");
        let target = login_redirect(&nav);
        assert_eq!(target, "/login?returnUrl=%2Fcommandes%3FclientId%3D7");

        let back = Navigation::parse(&target);
        assert_eq!(back.query_param(RETURN_URL_PARAM), Some("/commandes?clientId=7"));
    }

    #[test]
    fn test_authenticated_without_token_redirects_to_login() {
        let mut store = store_with(None);
        let nav = Navigation::parse("/clients");
        let outcome = Guard::Authenticated
            .check(&mut store, &nav, now_secs())
            .unwrap();
        assert_eq!(outcome, Outcome::Redirect("/login?returnUrl=%2Fclients".into()));
    }

    #[test]
    fn test_authenticated_without_token_drops_stale_refresh() {
        let mut storage = MemoryStorage::new();
        storage.set(REFRESH_TOKEN_KEY, "stale-refresh").unwrap();
        let mut store = TokenStore::new(storage);

        let nav = Navigation::parse("/clients");
        let outcome = Guard::Authenticated.check(&mut store, &nav, 0).unwrap();
        assert_eq!(outcome, Outcome::Redirect("/login?returnUrl=%2Fclients".into()));
        assert!(store.refresh_token().is_none());
    }

    #[test]
    fn test_authenticated_expired_clears_tokens() {
        let mut store = store_with(Some(token_with_role("ROLE_USER", -1)));
        let nav = Navigation::parse("/commandes");
        let outcome = Guard::Authenticated
            .check(&mut store, &nav, now_secs())
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Redirect("/login?returnUrl=%2Fcommandes".into())
        );
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
    }

    #[test]
    fn test_authenticated_valid_proceeds() {
        let mut store = store_with(Some(token_with_role("ROLE_USER", 3600)));
        let nav = Navigation::parse("/clients");
        let outcome = Guard::Authenticated
            .check(&mut store, &nav, now_secs())
            .unwrap();
        assert_eq!(outcome, Outcome::Proceed);
    }

    #[test]
    fn test_guest_with_valid_token_goes_to_return_url() {
        let mut store = store_with(Some(token_with_role("ROLE_ADMIN", 3600)));

        let with_return = Navigation::parse("/login?returnUrl=%2Fcommandes%2Fadd");
        assert_eq!(
            Guard::Guest.check(&mut store, &with_return, now_secs()).unwrap(),
            Outcome::Redirect("/commandes/add".into())
        );

        let plain = Navigation::parse("/login");
        assert_eq!(
            Guard::Guest.check(&mut store, &plain, now_secs()).unwrap(),
            Outcome::Redirect(DEFAULT_LANDING.into())
        );
    }

    #[test]
    fn test_guest_ignores_foreign_return_url() {
        let mut store = store_with(Some(token_with_role("ROLE_USER", 3600)));
        let nav = Navigation::parse("/login?returnUrl=https%3A%2F%2Fevil.example");
        assert_eq!(
            Guard::Guest.check(&mut store, &nav, now_secs()).unwrap(),
            Outcome::Redirect(DEFAULT_LANDING.into())
        );
    }

    #[test]
    fn test_guest_allowed_without_valid_session() {
        let mut empty = store_with(None);
        let nav = Navigation::parse("/login");
        assert_eq!(
            Guard::Guest.check(&mut empty, &nav, now_secs()).unwrap(),
            Outcome::Proceed
        );

        let mut expired = store_with(Some(token_with_role("ROLE_ADMIN", -10)));
        assert_eq!(
            Guard::Guest.check(&mut expired, &nav, now_secs()).unwrap(),
            Outcome::Proceed
        );
    }

    #[test]
    fn test_admin_guard() {
        let nav = Navigation::parse("/clients/add");

        let mut admin = store_with(Some(token_with_role("ROLE_ADMIN", 3600)));
        assert_eq!(
            Guard::Admin.check(&mut admin, &nav, now_secs()).unwrap(),
            Outcome::Proceed
        );

        let mut user = store_with(Some(token_with_role("ROLE_USER", 3600)));
        assert_eq!(
            Guard::Admin.check(&mut user, &nav, now_secs()).unwrap(),
            Outcome::Redirect(DEFAULT_LANDING.into())
        );
        assert!(user.access_token().is_some());

        let mut nobody = store_with(None);
        assert_eq!(
            Guard::Admin.check(&mut nobody, &nav, now_secs()).unwrap(),
            Outcome::Redirect("/login?returnUrl=%2Fclients%2Fadd".into())
        );
    }

    #[test]
    fn test_admin_guard_expired_admin_goes_to_login() {
        let mut store = store_with(Some(token_with_role("ROLE_ADMIN", -1)));
        let nav = Navigation::parse("/admin/create");
        assert_eq!(
            Guard::Admin.check(&mut store, &nav, now_secs()).unwrap(),
            Outcome::Redirect("/login?returnUrl=%2Fadmin%2Fcreate".into())
        );
        assert!(store.access_token().is_none());
    }
}
