//! Authentication endpoints: signup, login, token refresh, current user

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
