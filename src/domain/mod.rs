//! Domain layer - entities and persistence ports

pub mod user;

pub use user::{NewUser, User, UserId, UserIdentity, UserStore};

pub use crate::shared::errors::{DomainError, DomainResult};
