use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use super::password::{verify_password, HashedPassword};
use crate::error::StoreError;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: HashedPassword, // never exposed in JSON
    pub bio: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    pub fn password_matches(&self, plain: &str) -> Result<bool, StoreError> {
        verify_password(plain, &self.password_hash)
    }
}

/// Row to insert; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: HashedPassword,
    pub bio: Option<String>,
}

/// Whole-row profile update. The password is not part of it.
#[derive(Debug, Clone, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub bio: Option<String>,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_profile(username: &str, email: &str) -> Result<(), String> {
    if username.trim().is_empty() {
        return Err("username is required".into());
    }
    if email.trim().is_empty() {
        return Err("email is required".into());
    }
    if !is_valid_email(email) {
        return Err("invalid email".into());
    }
    Ok(())
}

impl RegisterUserRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_profile(&self.username, &self.email)?;
        if self.password.is_empty() {
            return Err("password is required".into());
        }
        Ok(())
    }
}

impl UserUpdate {
    pub fn validate(&self) -> Result<(), String> {
        validate_profile(&self.username, &self.email)
    }
}
