//! Route table and guarded navigation
//!
//! Every subcommand corresponds to one of these routes. Navigating runs the
//! route's guard; a redirect starts a fresh navigation to the new target.

use anyhow::{bail, Result};
use std::fmt;

use crate::auth::guards::{Guard, Navigation, Outcome, DEFAULT_LANDING};
use crate::auth::{Storage, TokenStore};

const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Clients,
    ClientAdd,
    ClientEdit(i64),
    Commandes,
    CommandeAdd,
    CommandeEdit(i64),
    AdminCreate,
}

impl Route {
    /// Match a path against the table. `None` means unknown.
    pub fn resolve(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let route = match segments.as_slice() {
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["clients"] => Route::Clients,
            ["clients", "add"] => Route::ClientAdd,
            ["clients", id, "edit"] => Route::ClientEdit(id.parse().ok()?),
            ["commandes"] => Route::Commandes,
            ["commandes", "add"] => Route::CommandeAdd,
            ["commandes", id, "edit"] => Route::CommandeEdit(id.parse().ok()?),
            ["admin", "create"] => Route::AdminCreate,
            _ => return None,
        };
        Some(route)
    }

    pub fn guard(&self) -> Guard {
        match self {
            Route::Login | Route::Register => Guard::Guest,
            Route::Clients | Route::Commandes => Guard::Authenticated,
            Route::ClientAdd
            | Route::ClientEdit(_)
            | Route::CommandeAdd
            | Route::CommandeEdit(_)
            | Route::AdminCreate => Guard::Admin,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Clients => "/clients".to_string(),
            Route::ClientAdd => "/clients/add".to_string(),
            Route::ClientEdit(id) => format!("/clients/{}/edit", id),
            Route::Commandes => "/commandes".to_string(),
            Route::CommandeAdd => "/commandes/add".to_string(),
            Route::CommandeEdit(id) => format!("/commandes/{}/edit", id),
            Route::AdminCreate => "/admin/create".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Where a navigation ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrival {
    pub route: Route,
    pub nav: Navigation,
    /// Targets visited before the final one, in order.
    pub redirects: Vec<String>,
}

impl Arrival {
    pub fn redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

/// Navigate to `target`, following guard redirects.
pub fn navigate<S: Storage>(store: &mut TokenStore<S>, target: &str, now: i64) -> Result<Arrival> {
    let mut current = target.to_string();
    let mut redirects = Vec::new();

    for _ in 0..=MAX_REDIRECTS {
        let nav = Navigation::parse(&current);

        let Some(route) = Route::resolve(&nav.path) else {
            tracing::debug!("No route for '{}', falling back to {}", nav.path, DEFAULT_LANDING);
            redirects.push(std::mem::replace(&mut current, DEFAULT_LANDING.to_string()));
            continue;
        };

        match route.guard().check(store, &nav, now)? {
            Outcome::Proceed => {
                return Ok(Arrival {
                    route,
                    nav,
                    redirects,
                })
            }
            Outcome::Redirect(next) => {
                tracing::debug!("{} redirected to {}", current, next);
                redirects.push(std::mem::replace(&mut current, next));
            }
        }
    }

    bail!(
        "Navigation to {} did not settle after {} redirects",
        target,
        MAX_REDIRECTS
    )
}
