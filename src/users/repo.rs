use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use super::model::{NewUser, User, UserUpdate};
use crate::error::StoreError;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn get_user_by_username(&self, username: &str) -> Result<User, StoreError>;
    async fn update_user(&self, user: &UserUpdate) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PostgresUserStore {
    db: PgPool,
}

impl PostgresUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, bio)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, bio, created_at, updated_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.bio)
        .fetch_one(&self.db)
        .await?;
        info!(user_id = created.id, username = %created.username, "user created");
        Ok(created)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, bio, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn update_user(&self, user: &UserUpdate) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
               SET username = $1, email = $2, bio = $3, updated_at = now()
             WHERE id = $4
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.bio)
        .bind(user.id)
        .execute(&self.db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        info!(user_id = user.id, "user updated");
        Ok(())
    }
}
