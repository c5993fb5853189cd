pub mod auth;
pub mod owner;

pub use auth::{access_guard, AuthIdentity};
pub use owner::require_owner;
