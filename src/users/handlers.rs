use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use super::{
    model::{NewUser, RegisterUserRequest, User, UserUpdate},
    password::hash_password,
};
use crate::{
    response::{data, parse_id, ApiError, ApiResult},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        // GET looks up by username, PUT targets the numeric id.
        .route("/users/:key", get(get_user).put(update_user))
}

fn bad_body(e: JsonRejection) -> ApiError {
    warn!(error = %e, "invalid user body");
    ApiError::BadRequest("invalid request body".into())
}

#[instrument(skip(state, body))]
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(payload) = body.map_err(bad_body)?;
    payload.validate().map_err(|msg| {
        warn!(reason = %msg, "user validation failed");
        ApiError::BadRequest(msg)
    })?;

    let password_hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::Internal
    })?;

    let user = state
        .users
        .create_user(NewUser {
            username: payload.username,
            email: payload.email.trim().to_lowercase(),
            password_hash,
            bio: payload.bio,
        })
        .await
        .map_err(|e| ApiError::from_store("user", e))?;

    info!(user_id = user.id, username = %user.username, "user registered");
    data(StatusCode::CREATED, user)
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<User> {
    let user = state
        .users
        .get_user_by_username(&username)
        .await
        .map_err(|e| ApiError::from_store("user", e))?;
    data(StatusCode::OK, user)
}

#[instrument(skip(state, body))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UserUpdate>, JsonRejection>,
) -> ApiResult<&'static str> {
    let id = parse_id(&id)?;
    let Json(mut update) = body.map_err(bad_body)?;
    update.validate().map_err(ApiError::BadRequest)?;
    update.id = id;
    update.email = update.email.trim().to_lowercase();

    state
        .users
        .update_user(&update)
        .await
        .map_err(|e| ApiError::from_store("user", e))?;
    data(StatusCode::OK, "user updated")
}
