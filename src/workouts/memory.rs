//! In-process [`WorkoutStore`] used by handler tests and local runs without
//! PostgreSQL. Mirrors the schema's CHECK constraints and cascade delete.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::model::{Workout, WorkoutEntry};
use super::reconcile;
use super::repo::WorkoutStore;
use crate::error::StoreError;

#[derive(Debug, Default, Clone)]
struct Tables {
    next_workout_id: i64,
    next_entry_id: i64,
    workouts: BTreeMap<i64, Workout>, // header only, `entries` left empty
    entries: BTreeMap<i64, WorkoutEntry>,
}

impl Tables {
    fn insert_entry(&mut self, workout_id: i64, entry: &WorkoutEntry) -> Result<i64, StoreError> {
        check_entry(entry)?;
        self.next_entry_id += 1;
        let id = self.next_entry_id;
        self.entries.insert(
            id,
            WorkoutEntry {
                id: Some(id),
                workout_id,
                ..entry.clone()
            },
        );
        Ok(id)
    }

    fn entry_ids(&self, workout_id: i64) -> BTreeSet<i64> {
        self.entries
            .values()
            .filter(|e| e.workout_id == workout_id)
            .filter_map(|e| e.id)
            .collect()
    }
}

fn check_workout(workout: &Workout) -> Result<(), StoreError> {
    if workout.duration_minutes < 0 || workout.calories_burned < 0 {
        return Err(StoreError::Constraint("workouts_check".into()));
    }
    Ok(())
}

fn check_entry(entry: &WorkoutEntry) -> Result<(), StoreError> {
    if entry.exercise_name.is_empty() || entry.sets <= 0 {
        return Err(StoreError::Constraint("workout_entries_check".into()));
    }
    if entry.reps.is_some_and(|r| r < 0) || entry.duration_seconds.is_some_and(|d| d < 0) {
        return Err(StoreError::Constraint("workout_entries_check".into()));
    }
    if entry.reps.is_some() == entry.duration_seconds.is_some() {
        return Err(StoreError::Constraint("valid_workout_entry".into()));
    }
    Ok(())
}

#[derive(Default)]
pub struct InMemoryWorkoutStore {
    tables: Mutex<Tables>,
}

impl InMemoryWorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkoutStore for InMemoryWorkoutStore {
    async fn create_workout(&self, mut workout: Workout) -> Result<Workout, StoreError> {
        let mut guard = self.tables.lock().await;
        let mut scratch = guard.clone();

        check_workout(&workout)?;
        scratch.next_workout_id += 1;
        workout.id = scratch.next_workout_id;
        scratch.workouts.insert(
            workout.id,
            Workout {
                entries: Vec::new(),
                ..workout.clone()
            },
        );

        for entry in workout.entries.iter_mut() {
            entry.id = Some(scratch.insert_entry(workout.id, entry)?);
            entry.workout_id = workout.id;
        }

        *guard = scratch;
        Ok(workout)
    }

    async fn get_workout_by_id(&self, id: i64) -> Result<Workout, StoreError> {
        let tables = self.tables.lock().await;
        let mut workout = tables.workouts.get(&id).cloned().ok_or(StoreError::NotFound)?;
        workout.entries = tables
            .entries
            .values()
            .filter(|e| e.workout_id == id)
            .cloned()
            .collect();
        // BTreeMap iteration is by id, so ties keep insertion order.
        workout.entries.sort_by_key(|e| e.order_index);
        Ok(workout)
    }

    async fn update_workout(&self, workout: &Workout) -> Result<(), StoreError> {
        let mut guard = self.tables.lock().await;
        let mut scratch = guard.clone();

        let header = scratch
            .workouts
            .get_mut(&workout.id)
            .ok_or(StoreError::NotFound)?;
        check_workout(workout)?;
        header.title = workout.title.clone();
        header.description = workout.description.clone();
        header.duration_minutes = workout.duration_minutes;
        header.calories_burned = workout.calories_burned;

        let current = scratch.entry_ids(workout.id);
        let plan = reconcile::plan(workout.id, &current, &workout.entries)?;

        for entry_id in &plan.deletes {
            scratch.entries.remove(entry_id);
        }
        for (entry_id, entry) in &plan.updates {
            check_entry(entry)?;
            scratch.entries.insert(
                *entry_id,
                WorkoutEntry {
                    id: Some(*entry_id),
                    workout_id: workout.id,
                    ..(*entry).clone()
                },
            );
        }
        for entry in &plan.inserts {
            scratch.insert_entry(workout.id, entry)?;
        }

        *guard = scratch;
        Ok(())
    }

    async fn delete_workout(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.workouts.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }
        tables.entries.retain(|_, e| e.workout_id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workouts::model::fixtures::{push_day, reps_entry, timed_entry};

    #[tokio::test]
    async fn create_assigns_ids_in_submitted_order() {
        let store = InMemoryWorkoutStore::new();
        let created = store.create_workout(push_day()).await.unwrap();

        let fetched = store.get_workout_by_id(created.id).await.unwrap();
        assert_eq!(fetched.entries.len(), 3);
        for (got, want) in fetched.entries.iter().zip(&created.entries) {
            assert!(got.persisted_id().is_some());
            assert_eq!(got.id, want.id);
            assert_eq!(got.workout_id, created.id);
        }
        let names: Vec<&str> = fetched.entries.iter().map(|e| e.exercise_name.as_str()).collect();
        assert_eq!(names, ["Push up", "Pull up", "Treadmill run"]);
    }

    #[tokio::test]
    async fn fetch_sorts_by_order_index() {
        let store = InMemoryWorkoutStore::new();
        let mut workout = push_day();
        workout.entries[0].order_index = 9;
        let created = store.create_workout(workout).await.unwrap();

        let fetched = store.get_workout_by_id(created.id).await.unwrap();
        let order: Vec<i32> = fetched.entries.iter().map(|e| e.order_index).collect();
        assert_eq!(order, [2, 3, 9]);
    }

    #[tokio::test]
    async fn adding_new_entry_grows_count_by_one() {
        let store = InMemoryWorkoutStore::new();
        let created = store.create_workout(push_day()).await.unwrap();

        let mut next = created.clone();
        next.entries.push(reps_entry("Dip", 3, 12, 4));
        store.update_workout(&next).await.unwrap();

        let fetched = store.get_workout_by_id(created.id).await.unwrap();
        assert_eq!(fetched.entries.len(), created.entries.len() + 1);
    }

    #[tokio::test]
    async fn omitting_an_entry_removes_only_that_entry() {
        let store = InMemoryWorkoutStore::new();
        let created = store.create_workout(push_day()).await.unwrap();

        let mut next = created.clone();
        let removed = next.entries.remove(1);
        store.update_workout(&next).await.unwrap();

        let fetched = store.get_workout_by_id(created.id).await.unwrap();
        assert_eq!(fetched.entries.len(), 2);
        assert!(fetched.entries.iter().all(|e| e.id != removed.id));
        assert_eq!(fetched.entries, next.entries);
    }

    #[tokio::test]
    async fn existing_id_is_updated_in_place() {
        let store = InMemoryWorkoutStore::new();
        let created = store.create_workout(push_day()).await.unwrap();

        let mut next = created.clone();
        next.entries[0].sets = 6;
        next.entries[0].notes = "heavier".into();
        store.update_workout(&next).await.unwrap();

        let fetched = store.get_workout_by_id(created.id).await.unwrap();
        assert_eq!(fetched.entries.len(), 3);
        assert_eq!(fetched.entries[0].id, created.entries[0].id);
        assert_eq!(fetched.entries[0].sets, 6);
        assert_eq!(fetched.entries[0].notes, "heavier");
    }

    #[tokio::test]
    async fn empty_entry_list_clears_entries() {
        let store = InMemoryWorkoutStore::new();
        let created = store.create_workout(push_day()).await.unwrap();

        let mut next = created.clone();
        next.entries.clear();
        store.update_workout(&next).await.unwrap();

        let fetched = store.get_workout_by_id(created.id).await.unwrap();
        assert!(fetched.entries.is_empty());
    }

    #[tokio::test]
    async fn push_day_scenario() {
        let store = InMemoryWorkoutStore::new();
        let created = store.create_workout(push_day()).await.unwrap();
        let fetched = store.get_workout_by_id(created.id).await.unwrap();
        let third_id = fetched.entries[2].id;

        let mut next = fetched.clone();
        next.entries.truncate(2);
        next.entries[0].reps = Some(5);
        next.entries[1].reps = Some(6);
        next.entries.push(timed_entry("Rower", 1, 600, 3));
        store.update_workout(&next).await.unwrap();

        let after = store.get_workout_by_id(created.id).await.unwrap();
        assert_eq!(after.entries.len(), 3);
        assert_eq!(after.entries[0].id, fetched.entries[0].id);
        assert_eq!(after.entries[0].reps, Some(5));
        assert_eq!(after.entries[1].id, fetched.entries[1].id);
        assert_eq!(after.entries[1].reps, Some(6));
        assert_eq!(after.entries[2].exercise_name, "Rower");
        assert!(after.entries.iter().all(|e| e.id != third_id));
    }

    #[tokio::test]
    async fn failing_entry_leaves_previous_state() {
        let store = InMemoryWorkoutStore::new();
        let created = store.create_workout(push_day()).await.unwrap();

        let mut next = created.clone();
        next.title = "Changed".into();
        next.entries.remove(0);
        next.entries.push(reps_entry("Dip", 3, 12, 4));
        let mut bad = reps_entry("Broken", 1, 1, 5);
        bad.duration_seconds = Some(30);
        next.entries.push(bad);

        let err = store.update_workout(&next).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
        assert_eq!(store.get_workout_by_id(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn entry_of_another_workout_is_rejected() {
        let store = InMemoryWorkoutStore::new();
        let first = store.create_workout(push_day()).await.unwrap();
        let second = store.create_workout(push_day()).await.unwrap();

        let mut next = second.clone();
        next.entries[0].id = first.entries[0].id;
        let err = store.update_workout(&next).await.unwrap_err();
        assert!(matches!(err, StoreError::InconsistentEntry { .. }));

        assert_eq!(store.get_workout_by_id(first.id).await.unwrap(), first);
        assert_eq!(store.get_workout_by_id(second.id).await.unwrap(), second);
    }

    #[tokio::test]
    async fn failed_create_stores_nothing() {
        let store = InMemoryWorkoutStore::new();
        let mut workout = push_day();
        workout.entries[1].sets = 0;

        assert!(store.create_workout(workout).await.is_err());
        assert!(matches!(
            store.get_workout_by_id(1).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn update_of_missing_workout_is_not_found() {
        let store = InMemoryWorkoutStore::new();
        let mut workout = push_day();
        workout.id = 42;
        assert!(matches!(
            store.update_workout(&workout).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn negative_reps_or_duration_is_a_constraint_violation() {
        let store = InMemoryWorkoutStore::new();

        let mut workout = push_day();
        workout.entries[0] = reps_entry("Push up", 1, -3, 1);
        let err = store.create_workout(workout).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));

        let mut workout = push_day();
        workout.entries[2] = timed_entry("Treadmill run", 1, -60, 3);
        let err = store.create_workout(workout).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));

        let created = store.create_workout(push_day()).await.unwrap();
        let mut next = created.clone();
        next.entries[1].reps = Some(-1);
        let err = store.update_workout(&next).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
        assert_eq!(store.get_workout_by_id(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn missing_workout_wins_over_invalid_header() {
        let store = InMemoryWorkoutStore::new();
        let mut workout = push_day();
        workout.id = 42;
        workout.calories_burned = -1;
        assert!(matches!(
            store.update_workout(&workout).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_cascades_and_missing_id_is_not_found() {
        let store = InMemoryWorkoutStore::new();
        let created = store.create_workout(push_day()).await.unwrap();
        let other = store.create_workout(push_day()).await.unwrap();

        assert!(matches!(
            store.delete_workout(999).await,
            Err(StoreError::NotFound)
        ));
        assert_eq!(store.get_workout_by_id(created.id).await.unwrap(), created);

        store.delete_workout(created.id).await.unwrap();
        assert!(matches!(
            store.get_workout_by_id(created.id).await,
            Err(StoreError::NotFound)
        ));
        assert_eq!(store.tables.lock().await.entry_ids(created.id).len(), 0);
        assert_eq!(store.get_workout_by_id(other.id).await.unwrap(), other);
    }
}
