//! JSON envelope returned by every handler: `{"data": ..}` or `{"error": ".."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::error::StoreError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Envelope<T> {
    Data(T),
    Error(String),
}

pub type ApiResult<T> = Result<(StatusCode, Json<Envelope<T>>), ApiError>;

pub fn data<T: Serialize>(status: StatusCode, payload: T) -> ApiResult<T> {
    Ok((status, Json(Envelope::Data(payload))))
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(&'static str),
    Conflict(String),
    Unprocessable(String),
    Internal,
}

impl ApiError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".into(),
            ),
        }
    }

    /// Maps a store failure onto the response taxonomy. `what` names the
    /// resource in not-found messages.
    pub fn from_store(what: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound(what),
            StoreError::Conflict(_) => ApiError::Conflict(format!("{what} already exists")),
            e @ (StoreError::InconsistentEntry { .. } | StoreError::DuplicateEntry(_)) => {
                ApiError::Unprocessable(e.to_string())
            }
            StoreError::Constraint(constraint) => {
                warn!(%constraint, resource = what, "constraint violated");
                ApiError::Unprocessable(format!("{what} violates a data constraint"))
            }
            e @ (StoreError::Password(_) | StoreError::Database(_)) => {
                error!(error = %e, resource = what, "store failure");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(Envelope::<()>::Error(message))).into_response()
    }
}

/// Parses a path segment as a numeric id.
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::BadRequest("id must be an integer".into()))
}
