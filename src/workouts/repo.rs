use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};

use super::model::{Workout, WorkoutEntry};
use super::reconcile;
use crate::error::StoreError;

/// Persistence operations for workouts and their entries.
#[async_trait]
pub trait WorkoutStore: Send + Sync {
    /// Persists the header and every entry, returning the workout with all
    /// ids assigned.
    async fn create_workout(&self, workout: Workout) -> Result<Workout, StoreError>;
    async fn get_workout_by_id(&self, id: i64) -> Result<Workout, StoreError>;
    /// Replaces the header fields and reconciles the entry list.
    async fn update_workout(&self, workout: &Workout) -> Result<(), StoreError>;
    async fn delete_workout(&self, id: i64) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PostgresWorkoutStore {
    db: PgPool,
}

impl PostgresWorkoutStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const ENTRY_COLUMNS: &str = "id, workout_id, exercise_name, sets, reps, duration_seconds, \
                             weight, notes, order_index";

async fn insert_entry_tx(
    tx: &mut Transaction<'_, Postgres>,
    workout_id: i64,
    entry: &WorkoutEntry,
) -> Result<i64, StoreError> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO workout_entries
            (workout_id, exercise_name, sets, reps, duration_seconds, weight, notes, order_index)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(workout_id)
    .bind(&entry.exercise_name)
    .bind(entry.sets)
    .bind(entry.reps)
    .bind(entry.duration_seconds)
    .bind(entry.weight)
    .bind(&entry.notes)
    .bind(entry.order_index)
    .fetch_one(&mut **tx)
    .await?;
    Ok(id)
}

/// Applies the reconciliation plan for `workout_id` inside `tx`.
async fn reconcile_entries_tx(
    tx: &mut Transaction<'_, Postgres>,
    workout_id: i64,
    submitted: &[WorkoutEntry],
) -> Result<(), StoreError> {
    let current: BTreeSet<i64> =
        sqlx::query_scalar::<_, i64>("SELECT id FROM workout_entries WHERE workout_id = $1")
            .bind(workout_id)
            .fetch_all(&mut **tx)
            .await?
            .into_iter()
            .collect();

    let plan = reconcile::plan(workout_id, &current, submitted)?;
    if plan.is_noop() {
        debug!(workout_id, "no entry changes");
        return Ok(());
    }

    for entry_id in &plan.deletes {
        sqlx::query("DELETE FROM workout_entries WHERE id = $1 AND workout_id = $2")
            .bind(entry_id)
            .bind(workout_id)
            .execute(&mut **tx)
            .await?;
    }

    for (entry_id, entry) in &plan.updates {
        let result = sqlx::query(
            r#"
            UPDATE workout_entries
               SET exercise_name = $1, sets = $2, reps = $3, duration_seconds = $4,
                   weight = $5, notes = $6, order_index = $7
             WHERE id = $8 AND workout_id = $9
            "#,
        )
        .bind(&entry.exercise_name)
        .bind(entry.sets)
        .bind(entry.reps)
        .bind(entry.duration_seconds)
        .bind(entry.weight)
        .bind(&entry.notes)
        .bind(entry.order_index)
        .bind(entry_id)
        .bind(workout_id)
        .execute(&mut **tx)
        .await?;

        // The row vanished between the id read and this update.
        if result.rows_affected() == 0 {
            return Err(StoreError::InconsistentEntry {
                entry_id: *entry_id,
                workout_id,
            });
        }
    }

    for entry in &plan.inserts {
        insert_entry_tx(tx, workout_id, entry).await?;
    }

    debug!(
        workout_id,
        inserted = plan.inserts.len(),
        updated = plan.updates.len(),
        deleted = plan.deletes.len(),
        "entries reconciled"
    );
    Ok(())
}

#[async_trait]
impl WorkoutStore for PostgresWorkoutStore {
    async fn create_workout(&self, mut workout: Workout) -> Result<Workout, StoreError> {
        let mut tx = self.db.begin().await?;

        workout.id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO workouts (title, description, duration_minutes, calories_burned)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&workout.title)
        .bind(&workout.description)
        .bind(workout.duration_minutes)
        .bind(workout.calories_burned)
        .fetch_one(&mut *tx)
        .await?;

        for entry in workout.entries.iter_mut() {
            entry.id = Some(insert_entry_tx(&mut tx, workout.id, entry).await?);
            entry.workout_id = workout.id;
        }

        tx.commit().await?;
        info!(workout_id = workout.id, entries = workout.entries.len(), "workout created");
        Ok(workout)
    }

    async fn get_workout_by_id(&self, id: i64) -> Result<Workout, StoreError> {
        let mut workout = sqlx::query_as::<_, Workout>(
            r#"
            SELECT id, title, description, duration_minutes, calories_burned
            FROM workouts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)?;

        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM workout_entries WHERE workout_id = $1 \
             ORDER BY order_index ASC, id ASC"
        );
        workout.entries = sqlx::query_as::<_, WorkoutEntry>(&sql)
            .bind(id)
            .fetch_all(&self.db)
            .await?;

        Ok(workout)
    }

    async fn update_workout(&self, workout: &Workout) -> Result<(), StoreError> {
        let mut tx = self.db.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE workouts
               SET title = $1, description = $2, duration_minutes = $3,
                   calories_burned = $4, updated_at = now()
             WHERE id = $5
            "#,
        )
        .bind(&workout.title)
        .bind(&workout.description)
        .bind(workout.duration_minutes)
        .bind(workout.calories_burned)
        .bind(workout.id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        reconcile_entries_tx(&mut tx, workout.id, &workout.entries).await?;

        tx.commit().await?;
        info!(workout_id = workout.id, "workout updated");
        Ok(())
    }

    async fn delete_workout(&self, id: i64) -> Result<(), StoreError> {
        let mut tx = self.db.begin().await?;
        let result = sqlx::query("DELETE FROM workouts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        tx.commit().await?;
        info!(workout_id = id, "workout deleted");
        Ok(())
    }
}
