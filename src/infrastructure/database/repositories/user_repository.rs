use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, QueryFilter,
    Set, SqlErr,
};

use crate::domain::{DomainError, DomainResult, NewUser, User, UserId, UserStore};
use crate::infrastructure::database::entities::user;

/// SeaORM-backed user store
pub struct SeaOrmUserStore {
    db: DatabaseConnection,
}

impl SeaOrmUserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        birth_date: model.birth_date,
        password_hash: model.password_hash,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn insert_err(e: DbErr) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            DomainError::Conflict("Email already registered.".to_string())
        }
        _ => e.into(),
    }
}

// ── Store implementation ────────────────────────────────────────

#[async_trait]
impl UserStore for SeaOrmUserStore {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(model.map(user_model_to_domain))
    }

    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id).one(&self.db).await?;

        Ok(model.map(user_model_to_domain))
    }

    async fn insert(&self, new_user: NewUser) -> DomainResult<User> {
        let now = Utc::now();

        let active = user::ActiveModel {
            id: NotSet,
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            birth_date: Set(new_user.birth_date),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active.insert(&self.db).await.map_err(insert_err)?;

        Ok(user_model_to_domain(model))
    }

    async fn ping(&self) -> DomainResult<()> {
        self.db.ping().await?;
        Ok(())
    }
}
