//! Role extraction from token claims

use serde_json::Value;
use std::fmt;

use super::jwt::Claims;

/// Claim names that may carry a role, highest priority first.
pub const ROLE_CLAIMS: &[&str] = &[
    "role",
    "roles",
    "authorities",
    "scope",
    "scopes",
    "permissions",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Substring test over a space-joined grant list. ADMIN wins over USER.
    fn from_grants(grants: &str) -> Option<Self> {
        if grants.contains("ADMIN") {
            Some(Role::Admin)
        } else if grants.contains("USER") {
            Some(Role::User)
        } else {
            None
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN"),
            Role::User => write!(f, "USER"),
        }
    }
}

/// Shapes a role-bearing claim is known to take.
#[derive(Debug, Clone, PartialEq)]
pub enum RoleClaim {
    /// `"ROLE_ADMIN"` or `"read ROLE_USER"`
    Text(String),
    /// `["ROLE_ADMIN", "ROLE_USER"]`
    Names(Vec<String>),
    /// Spring Security style `[{"authority": "ROLE_ADMIN"}]`
    Authorities(Vec<String>),
}

impl RoleClaim {
    pub fn parse(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(RoleClaim::Text(s.clone())),
            Value::Array(items) => {
                if items.iter().all(Value::is_string) {
                    let names = items
                        .iter()
                        .filter_map(|v| v.as_str().map(String::from))
                        .collect();
                    Some(RoleClaim::Names(names))
                } else {
                    let authorities = items
                        .iter()
                        .filter_map(|v| v.get("authority").and_then(Value::as_str))
                        .map(String::from)
                        .collect();
                    Some(RoleClaim::Authorities(authorities))
                }
            }
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            RoleClaim::Text(s) => Role::from_grants(s),
            RoleClaim::Names(names) | RoleClaim::Authorities(names) => {
                Role::from_grants(&names.join(" "))
            }
        }
    }
}

/// First claim in `ROLE_CLAIMS` order that yields a role.
pub fn resolve_role(claims: &Claims) -> Option<Role> {
    ROLE_CLAIMS.iter().find_map(|name| {
        let claim = RoleClaim::parse(claims.get(name)?)?;
        let role = claim.role();
        if role.is_some() {
            tracing::trace!("Role {:?} from claim '{}'", role, name);
        }
        role
    })
}
