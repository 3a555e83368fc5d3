pub mod handlers;
pub mod memory;
pub mod model;
pub mod password;
pub mod repo;

use crate::state::AppState;
use axum::Router;

pub use memory::InMemoryUserStore;
pub use model::{NewUser, User, UserUpdate};
pub use repo::{PostgresUserStore, UserStore};

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
