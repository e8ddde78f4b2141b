//! In-memory task store.
//!
//! This module provides the `TaskStore` struct holding the ordered task
//! collection that the UI mutates in response to user actions.

use tracing::debug;

use crate::codec;
use crate::error::StoreError;
use crate::fields::{Field, TaskType};
use crate::task::{now_timestamp, Task};

/// Ordered collection of task records.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing records, keeping their order.
    #[cfg(test)]
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        TaskStore { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Get a task by ID.
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Next available id: one past the largest id, or 0 when empty.
    /// Ids freed by deletion are not reused unless they were the maximum.
    pub fn next_id(&self) -> Result<u64, StoreError> {
        match self.tasks.iter().map(|t| t.id).max() {
            None => Ok(0),
            Some(max) => max.checked_add(1).ok_or(StoreError::IdsExhausted { max }),
        }
    }

    /// Append a new record stamped with the current local time.
    pub fn add(&mut self) -> Result<u64, StoreError> {
        self.add_at(now_timestamp())
    }

    /// Append a new record with the given timestamp, default type and empty content.
    pub fn add_at(&mut self, date: impl Into<String>) -> Result<u64, StoreError> {
        let id = self.next_id()?;
        self.tasks.push(Task::new(id, date));
        debug!(id, "task added");
        Ok(id)
    }

    /// Append a `finish` record stamped with the current local time.
    pub fn mark_finish(&mut self) -> Result<u64, StoreError> {
        self.mark_finish_at(now_timestamp())
    }

    pub fn mark_finish_at(&mut self, date: impl Into<String>) -> Result<u64, StoreError> {
        let id = self.add_at(date)?;
        if let Some(task) = self.get_mut(id) {
            task.kind = TaskType::Finish;
        }
        Ok(id)
    }

    /// Overwrite one field of the record with `id`.
    ///
    /// An empty `value` leaves the record untouched, as does an unknown id.
    /// Returns whether the record changed.
    pub fn edit_field(&mut self, id: u64, field: Field, value: &str) -> Result<bool, StoreError> {
        if value.is_empty() {
            return Ok(false);
        }
        let Some(task) = self.get_mut(id) else {
            return Ok(false);
        };

        let changed = match field {
            Field::Date => replace(&mut task.date, value),
            Field::Content => replace(&mut task.content, value),
            Field::Type => {
                let kind = value.parse::<TaskType>().map_err(StoreError::InvalidType)?;
                let changed = task.kind != kind;
                task.kind = kind;
                changed
            }
        };
        if changed {
            debug!(id, field = field.name(), "task field edited");
        }
        Ok(changed)
    }

    /// Remove the record with `id`. Returns whether one was removed.
    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            debug!(id, "task deleted");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
        debug!("task list cleared");
    }

    /// Stable ascending sort by parsed date. Unparseable dates go last.
    pub fn sort(&mut self) {
        self.tasks.sort_by_key(|t| match t.timestamp() {
            Some(ts) => (false, Some(ts)),
            None => (true, None),
        });
    }

    /// Replace the whole collection with the records decoded from `csv`.
    ///
    /// On failure the current collection is left as it was.
    pub fn import_from(&mut self, csv: &str) -> Result<usize, StoreError> {
        let tasks = codec::decode(csv)?;
        self.tasks = tasks;
        debug!(count = self.tasks.len(), "tasks imported");
        Ok(self.tasks.len())
    }

    /// CSV encoding of the current collection.
    pub fn to_csv(&self) -> String {
        codec::encode(&self.tasks)
    }
}

fn replace(slot: &mut String, value: &str) -> bool {
    if slot == value {
        return false;
    }
    *slot = value.to_string();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;

    fn sample() -> TaskStore {
        let mut store = TaskStore::new();
        store.add_at("2024-01-03 10:00:00").unwrap();
        store.add_at("2024-01-01 09:00:00").unwrap();
        store.add_at("2024-01-02 08:00:00").unwrap();
        store
    }

    #[test]
    fn test_add_assigns_ids_from_max() {
        let mut store = TaskStore::new();
        assert_eq!(store.add_at("2024-01-01"), Ok(0));
        assert_eq!(store.add_at("2024-01-01"), Ok(1));
        store.delete(0);
        assert_eq!(store.add_at("2024-01-01"), Ok(2));

        let mut store = TaskStore::from_tasks(vec![Task::new(41, "x"), Task::new(7, "y")]);
        assert_eq!(store.add(), Ok(42));
        let added = store.get(42).unwrap();
        assert_eq!(added.kind, TaskType::Other);
        assert!(added.content.is_empty());
        assert!(added.timestamp().is_some());
    }

    #[test]
    fn test_add_fails_when_id_space_is_used_up() {
        let mut store = TaskStore::new();
        store
            .import_from("id,date,type,content\n18446744073709551615,2024-01-01,other,x\n")
            .unwrap();
        let before = store.clone();
        assert_eq!(
            store.add_at("2024-01-02"),
            Err(StoreError::IdsExhausted { max: u64::MAX })
        );
        assert_eq!(
            store.mark_finish_at("2024-01-02"),
            Err(StoreError::IdsExhausted { max: u64::MAX })
        );
        assert_eq!(store, before);

        let mut store = TaskStore::from_tasks(vec![Task::new(u64::MAX - 1, "x")]);
        assert_eq!(store.add_at("y"), Ok(u64::MAX));
        assert!(store.add_at("z").is_err());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_ids_not_reassigned_after_delete() {
        let mut store = sample();
        store.delete(1);
        let ids: Vec<u64> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn test_edit_field() {
        let mut store = sample();
        assert_eq!(store.edit_field(0, Field::Content, "fix bug"), Ok(true));
        assert_eq!(store.edit_field(0, Field::Type, "meeting"), Ok(true));
        assert_eq!(store.edit_field(0, Field::Date, "2024-02-01"), Ok(true));
        let task = store.get(0).unwrap();
        assert_eq!(task.content, "fix bug");
        assert_eq!(task.kind, TaskType::Meeting);
        assert_eq!(task.date, "2024-02-01");
        assert_eq!(store.edit_field(0, Field::Content, "fix bug"), Ok(false));
    }

    #[test]
    fn test_edit_field_empty_value_is_ignored() {
        let mut store = sample();
        store.edit_field(0, Field::Content, "keep me").unwrap();
        assert_eq!(store.edit_field(0, Field::Content, ""), Ok(false));
        assert_eq!(store.get(0).unwrap().content, "keep me");
    }

    #[test]
    fn test_edit_field_unknown_id_is_noop() {
        let mut store = sample();
        let before = store.clone();
        assert_eq!(store.edit_field(99, Field::Content, "x"), Ok(false));
        assert_eq!(store, before);
    }

    #[test]
    fn test_edit_field_rejects_unknown_type() {
        let mut store = sample();
        assert!(matches!(
            store.edit_field(0, Field::Type, "lunch"),
            Err(StoreError::InvalidType(_))
        ));
        assert_eq!(store.get(0).unwrap().kind, TaskType::Other);
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let mut store = sample();
        store.edit_field(2, Field::Content, "third").unwrap();
        let before = store.clone();
        assert!(store.delete(1));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0), before.get(0));
        assert_eq!(store.get(2), before.get(2));
        assert!(!store.delete(1));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut store = sample();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.next_id(), Ok(0));
    }

    #[test]
    fn test_sort_orders_by_date_and_is_idempotent() {
        let mut store = sample();
        store.add_at("not a date").unwrap();
        store.add_at("2024-01-01 09:00:00").unwrap();
        store.sort();
        let ids: Vec<u64> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 4, 2, 0, 3]);

        let stamps: Vec<_> = store.tasks().iter().filter_map(|t| t.timestamp()).collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));

        let once = store.clone();
        store.sort();
        assert_eq!(store, once);
    }

    #[test]
    fn test_sort_compares_offsets_by_instant() {
        let mut store = TaskStore::new();
        store.add_at("2024-01-01T05:00:00Z").unwrap();
        store.add_at("2024-01-01T10:00:00+09:00").unwrap();
        store.sort();
        let ids: Vec<u64> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 0]);
    }

    #[test]
    fn test_mark_finish() {
        let mut store = sample();
        let id = store.mark_finish_at("2024-01-04 18:00:00").unwrap();
        assert_eq!(id, 3);
        assert_eq!(store.get(id).unwrap().kind, TaskType::Finish);
    }

    #[test]
    fn test_import_replaces_collection() {
        let mut store = sample();
        let n = store
            .import_from("id,date,type,content\n5,2024-03-01,review,pr\n")
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(store.tasks()[0].id, 5);
        assert_eq!(store.next_id(), Ok(6));
    }

    #[test]
    fn test_import_malformed_keeps_collection() {
        let mut store = sample();
        let before = store.clone();
        let err = store.import_from("id,date,type,content\n0,2024-01-01\n").unwrap_err();
        assert_eq!(
            err,
            StoreError::Import(CodecError::FieldCount { line: 2, expected: 4, found: 2 })
        );
        assert_eq!(store, before);
    }

    #[test]
    fn test_csv_round_trip_through_store() {
        let mut store = sample();
        store.edit_field(1, Field::Content, "write, then \"review\"").unwrap();
        let mut reloaded = TaskStore::new();
        reloaded.import_from(&store.to_csv()).unwrap();
        assert_eq!(reloaded, store);
    }
}
