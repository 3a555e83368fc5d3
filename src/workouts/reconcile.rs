//! Entry reconciliation for workout updates.
//!
//! A submitted entry list is the desired state of a workout's children.
//! [`plan`] compares it with the ids currently persisted for the workout and
//! sorts every entry into one of three buckets:
//!
//! - entries without an id (or id `0`) are inserted,
//! - entries with a persisted id are updated in place,
//! - persisted ids missing from the submission are deleted.
//!
//! Planning performs no I/O. Stores apply the resulting [`ReconcilePlan`]
//! inside a single transaction so that either every operation lands or none
//! does. Order indices are written as submitted; nothing is resequenced.

use std::collections::BTreeSet;

use crate::error::StoreError;

use super::model::WorkoutEntry;

#[derive(Debug, Default)]
pub struct ReconcilePlan<'a> {
    pub inserts: Vec<&'a WorkoutEntry>,
    pub updates: Vec<(i64, &'a WorkoutEntry)>,
    pub deletes: Vec<i64>,
}

impl ReconcilePlan<'_> {
    pub fn is_noop(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }
}

/// Builds the operations that turn `current` into `submitted` for `workout_id`.
///
/// Fails with [`StoreError::InconsistentEntry`] when a submitted id is not
/// persisted under this workout, and with [`StoreError::DuplicateEntry`] when
/// the same id is submitted twice.
pub fn plan<'a>(
    workout_id: i64,
    current: &BTreeSet<i64>,
    submitted: &'a [WorkoutEntry],
) -> Result<ReconcilePlan<'a>, StoreError> {
    let mut plan = ReconcilePlan::default();
    let mut kept = BTreeSet::new();

    for entry in submitted {
        match entry.persisted_id() {
            None => plan.inserts.push(entry),
            Some(entry_id) => {
                if !current.contains(&entry_id) {
                    return Err(StoreError::InconsistentEntry {
                        entry_id,
                        workout_id,
                    });
                }
                if !kept.insert(entry_id) {
                    return Err(StoreError::DuplicateEntry(entry_id));
                }
                plan.updates.push((entry_id, entry));
            }
        }
    }

    plan.deletes = current.difference(&kept).copied().collect();
    Ok(plan)
}
