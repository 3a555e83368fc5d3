use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use super::model::{NewUser, User, UserUpdate};
use super::repo::UserStore;
use crate::error::StoreError;

/// [`UserStore`] over a map, enforcing the same uniqueness as the schema.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<BTreeMap<i64, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_unique(
    users: &BTreeMap<i64, User>,
    id: i64,
    username: &str,
    email: &str,
) -> Result<(), StoreError> {
    for other in users.values().filter(|u| u.id != id) {
        if other.username == username {
            return Err(StoreError::Conflict("users_username_key".into()));
        }
        if other.email == email {
            return Err(StoreError::Conflict("users_email_key".into()));
        }
    }
    Ok(())
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.lock().await;
        check_unique(&users, 0, &user.username, &user.email)?;

        let id = users.keys().next_back().copied().unwrap_or(0) + 1;
        let now = OffsetDateTime::now_utc();
        let created = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            bio: user.bio,
            created_at: now,
            updated_at: now,
        };
        users.insert(id, created.clone());
        Ok(created)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, StoreError> {
        let users = self.users.lock().await;
        users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_user(&self, user: &UserUpdate) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        if !users.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        check_unique(&users, user.id, &user.username, &user.email)?;

        let row = users.get_mut(&user.id).ok_or(StoreError::NotFound)?;
        row.username = user.username.clone();
        row.email = user.email.clone();
        row.bio = user.bio.clone();
        row.updated_at = OffsetDateTime::now_utc();
        Ok(())
    }
}
