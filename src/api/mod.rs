//! API client module for the clients/commandes backend

pub mod auth;
pub mod client;
pub mod clients;
pub mod commandes;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;

/// Turn an API failure into the message a screen shows for `action`.
///
/// The typed error stays in the chain for `--verbose` output.
pub fn screen_error(err: ApiError, action: &str) -> anyhow::Error {
    let message = match &err {
        ApiError::Unauthenticated => {
            "Session expired. Run 'commandes-cli login' to sign in again.".to_string()
        }
        ApiError::Forbidden => "Access denied (ADMIN required).".to_string(),
        ApiError::NotFound(_) => format!("Could not {}: not found.", action),
        ApiError::InvalidData(_) => format!("Could not {}: invalid data.", action),
        ApiError::Conflict(_) => format!("Could not {}: conflicts with existing data.", action),
        ApiError::Transport { .. } => {
            format!("Could not {}: server unreachable.", action)
        }
        _ => format!("Could not {}: server error, try again later.", action),
    };
    anyhow::Error::new(err).context(message)
}
