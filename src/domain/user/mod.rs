//! User aggregate
//!
//! Contains the User entity, the identity projection, and the store interface.

pub mod model;
pub mod repository;

pub use model::{NewUser, User, UserId, UserIdentity};
pub use repository::UserStore;
