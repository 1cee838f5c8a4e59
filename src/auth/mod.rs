//! Authentication and session handling
//!
//! Tokens are issued by the API and kept in a key/value store. Everything
//! else (expiry, role, guard decisions) is derived from the stored access
//! token each time it is needed.

pub mod account;
pub mod guards;
pub mod interceptor;
pub mod jwt;
pub mod role;
pub mod session;
pub mod storage;
pub mod tokens;

pub use account::{create_admin, login, logout, register, status};
pub use interceptor::augment;
pub use role::Role;
pub use session::Session;
pub use storage::{FileStorage, Storage};
pub use tokens::TokenStore;
