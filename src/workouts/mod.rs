pub mod handlers;
pub mod memory;
pub mod model;
pub mod reconcile;
pub mod repo;

use crate::state::AppState;
use axum::Router;

pub use memory::InMemoryWorkoutStore;
pub use model::{Workout, WorkoutEntry};
pub use repo::{PostgresWorkoutStore, WorkoutStore};

pub fn router() -> Router<AppState> {
    handlers::workout_routes()
}
