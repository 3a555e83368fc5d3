use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::error::StoreError;

/// Salted argon2 hash in PHC string form. The plaintext never lives here.
#[derive(Clone, PartialEq, Eq, sqlx::Type)]
#[sqlx(transparent)]
pub struct HashedPassword(String);

impl std::fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HashedPassword(..)")
    }
}

impl HashedPassword {
    pub fn from_phc(phc: String) -> Self {
        Self(phc)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn hash_password(plain: &str) -> Result<HashedPassword, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            StoreError::Password(e.to_string())
        })?
        .to_string();
    Ok(HashedPassword(hash))
}

/// Checks `plain` against the stored hash in constant time.
///
/// A wrong password is `Ok(false)`; only a hash that cannot be parsed or
/// evaluated is an error.
pub fn verify_password(plain: &str, hashed: &HashedPassword) -> Result<bool, StoreError> {
    let parsed = PasswordHash::new(hashed.as_str()).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        StoreError::Password(e.to_string())
    })?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => {
            error!(error = %e, "argon2 verify_password error");
            Err(StoreError::Password(e.to_string()))
        }
    }
}
