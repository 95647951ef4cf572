use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserStatus;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserDirectory;
use crate::user::errors::DirectoryError;

/// Process-local user directory.
///
/// Backs the service when no database is configured, and the test suites.
/// Uniqueness is checked and the insert performed under one write lock.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DirectoryError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, DirectoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.username == *username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email.as_str() == email)
            .cloned())
    }

    async fn create(&self, user: User) -> Result<UserId, DirectoryError> {
        let mut users = self.users.write().await;

        if users.values().any(|existing| existing.username == user.username) {
            return Err(DirectoryError::DuplicateUsername(user.username.to_string()));
        }
        if users.values().any(|existing| existing.email == user.email) {
            return Err(DirectoryError::DuplicateEmail(user.email.to_string()));
        }

        let id = user.id;
        users.insert(id, user);
        Ok(id)
    }

    async fn update(&self, user: User) -> Result<(), DirectoryError> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(DirectoryError::NotFound(user.id.to_string()));
        }
        if users
            .values()
            .any(|existing| existing.id != user.id && existing.email == user.email)
        {
            return Err(DirectoryError::DuplicateEmail(user.email.to_string()));
        }

        users.insert(user.id, user);
        Ok(())
    }

    async fn list_by_status(&self, status: UserStatus) -> Result<Vec<User>, DirectoryError> {
        let mut users: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|user| user.status == status)
            .cloned()
            .collect();
        users.sort_by_key(|user| user.created_at);
        Ok(users)
    }
}
