use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::model::Workout;
use crate::{
    response::{data, parse_id, ApiError, ApiResult},
    state::AppState,
};

pub fn workout_routes() -> Router<AppState> {
    Router::new()
        .route("/workouts", post(create_workout))
        .route(
            "/workouts/:id",
            get(get_workout).put(update_workout).delete(delete_workout),
        )
}

fn read_body(body: Result<Json<Workout>, JsonRejection>) -> Result<Workout, ApiError> {
    let Json(workout) = body.map_err(|e| {
        warn!(error = %e, "invalid workout body");
        ApiError::BadRequest("invalid request body".into())
    })?;
    workout.validate().map_err(|msg| {
        warn!(reason = %msg, "workout validation failed");
        ApiError::BadRequest(msg)
    })?;
    Ok(workout)
}

#[instrument(skip(state, body))]
pub async fn create_workout(
    State(state): State<AppState>,
    body: Result<Json<Workout>, JsonRejection>,
) -> ApiResult<Workout> {
    let workout = read_body(body)?;
    let created = state
        .workouts
        .create_workout(workout)
        .await
        .map_err(|e| ApiError::from_store("workout", e))?;
    info!(workout_id = created.id, "workout created");
    data(StatusCode::CREATED, created)
}

#[instrument(skip(state))]
pub async fn get_workout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Workout> {
    let id = parse_id(&id)?;
    let workout = state
        .workouts
        .get_workout_by_id(id)
        .await
        .map_err(|e| ApiError::from_store("workout", e))?;
    data(StatusCode::OK, workout)
}

#[instrument(skip(state, body))]
pub async fn update_workout(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Workout>, JsonRejection>,
) -> ApiResult<Workout> {
    let id = parse_id(&id)?;
    let mut workout = read_body(body)?;
    workout.id = id;

    state
        .workouts
        .update_workout(&workout)
        .await
        .map_err(|e| ApiError::from_store("workout", e))?;
    let updated = state
        .workouts
        .get_workout_by_id(id)
        .await
        .map_err(|e| ApiError::from_store("workout", e))?;
    data(StatusCode::OK, updated)
}

#[instrument(skip(state))]
pub async fn delete_workout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<&'static str> {
    let id = parse_id(&id)?;
    state
        .workouts
        .delete_workout(id)
        .await
        .map_err(|e| ApiError::from_store("workout", e))?;
    data(StatusCode::OK, "workout deleted")
}
