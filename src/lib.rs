//! Workout and user CRUD service over PostgreSQL.
//!
//! The interesting part is [`workouts::reconcile`], which turns a submitted
//! workout into the insert/update/delete set for its entries.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod response;
pub mod state;
pub mod users;
pub mod workouts;
