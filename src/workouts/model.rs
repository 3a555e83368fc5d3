use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Workout header plus its entries, ordered by `order_index` when read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Workout {
    #[serde(default)]
    pub id: i64, // 0 until persisted
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration_minutes: i32,
    #[serde(default)]
    pub calories_burned: i32,
    #[sqlx(skip)]
    #[serde(default)]
    pub entries: Vec<WorkoutEntry>,
}

/// One exercise line of a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WorkoutEntry {
    #[serde(default)]
    pub id: Option<i64>, // absent or 0: not yet persisted
    #[serde(default)]
    pub workout_id: i64,
    pub exercise_name: String,
    pub sets: i32,
    #[serde(default)]
    pub reps: Option<i32>,
    #[serde(default)]
    pub duration_seconds: Option<i32>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub order_index: i32,
}

impl WorkoutEntry {
    /// Id of an already persisted entry; `None` for a new one.
    pub fn persisted_id(&self) -> Option<i64> {
        self.id.filter(|id| *id != 0)
    }
}

impl Workout {
    /// Caller-level checks run by the HTTP layer before touching a store.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is required".into());
        }
        if self.duration_minutes < 0 {
            return Err("duration_minutes must not be negative".into());
        }
        if self.calories_burned < 0 {
            return Err("calories_burned must not be negative".into());
        }
        for (i, entry) in self.entries.iter().enumerate() {
            entry.validate().map_err(|msg| format!("entries[{i}]: {msg}"))?;
        }
        Ok(())
    }
}

impl WorkoutEntry {
    pub fn validate(&self) -> Result<(), String> {
        if self.exercise_name.trim().is_empty() {
            return Err("exercise_name is required".into());
        }
        if self.sets <= 0 {
            return Err("sets must be positive".into());
        }
        if self.reps.is_some_and(|r| r < 0) {
            return Err("reps must not be negative".into());
        }
        if self.duration_seconds.is_some_and(|d| d < 0) {
            return Err("duration_seconds must not be negative".into());
        }
        match (self.reps, self.duration_seconds) {
            (Some(_), Some(_)) => Err("reps and duration_seconds are mutually exclusive".into()),
            (None, None) => Err("one of reps or duration_seconds is required".into()),
            _ => Ok(()),
        }
    }
}
