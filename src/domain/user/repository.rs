use async_trait::async_trait;

use super::{NewUser, User, UserId};
use crate::shared::DomainResult;

/// Persistence port for users, keyed by unique id and unique email.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>>;

    /// Persist a new user. Fails with `DomainError::Conflict` when the email is taken.
    async fn insert(&self, user: NewUser) -> DomainResult<User>;

    /// Cheap liveness probe for health checks.
    async fn ping(&self) -> DomainResult<()> {
        Ok(())
    }
}
