//! Data models for API entities

mod auth;
mod client;
mod commande;

pub use auth::*;
pub use client::*;
pub use commande::*;
