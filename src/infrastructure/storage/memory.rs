//! In-memory user store implementation

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{DomainError, DomainResult, NewUser, User, UserId, UserStore};

/// In-memory user store for development and testing
pub struct InMemoryUserStore {
    users: DashMap<UserId, User>,
    emails: DashMap<String, UserId>,
    id_counter: AtomicI32,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            emails: DashMap::new(),
            id_counter: AtomicI32::new(1),
        }
    }

    /// Remove a user, freeing its email for reuse.
    pub fn remove(&self, id: UserId) -> Option<User> {
        let (_, user) = self.users.remove(&id)?;
        self.emails.remove(&user.email);
        Some(user)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let Some(id) = self.emails.get(email).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, user: NewUser) -> DomainResult<User> {
        // The email slot stays locked until the user row is in place.
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(DomainError::Conflict("Email already registered.".into())),
            Entry::Vacant(slot) => {
                let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
                let now = Utc::now();
                let stored = User {
                    id,
                    first_name: user.first_name,
                    last_name: user.last_name,
                    email: user.email,
                    birth_date: user.birth_date,
                    password_hash: user.password_hash,
                    created_at: now,
                    updated_at: now,
                };
                self.users.insert(id, stored.clone());
                slot.insert(id);
                Ok(stored)
            }
        }
    }
}
