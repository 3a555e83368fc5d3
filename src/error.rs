//! Error type shared by the workout and user stores.

use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    /// An update targeted an entry id that does not belong to the workout.
    #[error("entry {entry_id} does not belong to workout {workout_id}")]
    InconsistentEntry { entry_id: i64, workout_id: i64 },

    #[error("entry {0} submitted more than once")]
    DuplicateEntry(i64),

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("password hashing failed: {0}")]
    Password(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let detail = db_err
                .constraint()
                .map(str::to_string)
                .unwrap_or_else(|| db_err.message().to_string());
            match db_err.kind() {
                ErrorKind::UniqueViolation => return StoreError::Conflict(detail),
                ErrorKind::CheckViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation => return StoreError::Constraint(detail),
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}
