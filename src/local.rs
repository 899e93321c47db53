//! The local-only task list. Entirely parallel to the remote entity
//! containers: records never leave the client, identifiers are
//! client-generated, and every mutation synchronously rewrites the full
//! collection in persistent storage.

use std::sync::Arc;

use chrono::{Local, Utc};

use crate::io::storage::{self, KeyStorage, StorageError};
use crate::model::local_task::{FieldError, LocalTask, TaskForm};

/// Fixed storage key for the persisted task collection
pub const TASKS_KEY: &str = "tasks";

/// Error type for local store mutations
#[derive(Debug, thiserror::Error)]
pub enum LocalStoreError {
    /// The form did not validate; nothing was added or persisted.
    #[error("validation failed: {}", .0.iter().map(|e| e.field).collect::<Vec<_>>().join(", "))]
    Invalid(Vec<FieldError>),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Completion-based view over the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
    All,
    Active,
    Completed,
}

impl TaskFilter {
    pub fn accepts(self, task: &LocalTask) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Active => !task.is_completed,
            TaskFilter::Completed => task.is_completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

pub struct LocalTaskStore {
    storage: Arc<dyn KeyStorage>,
    tasks: Vec<LocalTask>,
}

impl LocalTaskStore {
    /// Load the persisted collection. Missing or malformed storage
    /// yields an empty list.
    pub fn load(storage: Arc<dyn KeyStorage>) -> Self {
        let tasks = storage::read_json(storage.as_ref(), TASKS_KEY).unwrap_or_default();
        LocalTaskStore { storage, tasks }
    }

    pub fn tasks(&self) -> &[LocalTask] {
        &self.tasks
    }

    /// Validate the form and append a new task. The identifier is
    /// derived from the current time, bumped past any existing id so
    /// rapid adds within one millisecond stay unique.
    pub fn add_task(&mut self, form: TaskForm) -> Result<LocalTask, LocalStoreError> {
        let errors = form.validate(Local::now().date_naive());
        if !errors.is_empty() {
            return Err(LocalStoreError::Invalid(errors));
        }

        let now = Utc::now();
        let task = LocalTask {
            id: self.next_id(now.timestamp_millis()),
            title: form.title.trim().to_string(),
            description: form.description,
            due_date: form.due_date,
            priority: form.priority,
            is_completed: false,
            completed_at: None,
            category: form.category,
            color: form.color,
            created_at: now,
        };
        self.tasks.push(task.clone());
        self.persist()?;
        Ok(task)
    }

    /// Flip completion. Completing stamps `completed_at`; reopening
    /// clears it. Returns false when no task has the given id.
    pub fn toggle_completion(&mut self, id: &str) -> Result<bool, LocalStoreError> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        task.is_completed = !task.is_completed;
        task.completed_at = task.is_completed.then(Utc::now);
        self.persist()?;
        Ok(true)
    }

    /// Remove by identifier. Returns false when no task had the id.
    pub fn delete_task(&mut self, id: &str) -> Result<bool, LocalStoreError> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Derived view by completion and creation order; never mutates
    /// stored state.
    pub fn view(&self, filter: TaskFilter, direction: SortDirection) -> Vec<&LocalTask> {
        let mut view: Vec<&LocalTask> = self.tasks.iter().filter(|&t| filter.accepts(t)).collect();
        view.sort_by_key(|t| t.created_at);
        if direction == SortDirection::Desc {
            view.reverse();
        }
        view
    }

    /// Derived view by completion, in stored order.
    pub fn filtered(&self, filter: TaskFilter) -> Vec<&LocalTask> {
        self.tasks.iter().filter(|&t| filter.accepts(t)).collect()
    }

    /// Derived view ordered by creation time.
    pub fn sorted_by_created(&self, direction: SortDirection) -> Vec<&LocalTask> {
        self.view(TaskFilter::All, direction)
    }

    fn next_id(&self, millis: i64) -> String {
        let mut candidate = millis;
        while self.tasks.iter().any(|t| t.id == candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }

    /// Rewrite the whole collection. Called after every mutation so
    /// storage always holds exactly the in-memory state.
    fn persist(&self) -> Result<(), StorageError> {
        storage::write_json(self.storage.as_ref(), TASKS_KEY, &self.tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::storage::MemoryStorage;
    use crate::model::task::Priority;
    use chrono::{Duration, Local};
    use pretty_assertions::assert_eq;

    fn fresh_store() -> LocalTaskStore {
        LocalTaskStore::load(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn add_then_delete_round_trip() {
        let mut store = fresh_store();
        let mut form = TaskForm::new("Buy milk");
        form.priority = Priority::Low;

        let task = store.add_task(form).unwrap();
        assert_eq!(store.tasks().len(), 1);
        assert!(!task.id.is_empty());
        assert!(!task.is_completed);
        assert!(task.completed_at.is_none());

        assert!(store.delete_task(&task.id).unwrap());
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn empty_title_blocks_add() {
        let mut store = fresh_store();
        let err = store.add_task(TaskForm::new("   ")).unwrap_err();
        match err {
            LocalStoreError::Invalid(errors) => assert_eq!(errors[0].field, "title"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn past_due_date_blocks_add() {
        let mut store = fresh_store();
        let mut form = TaskForm::new("X");
        form.due_date = Some(Local::now().date_naive() - Duration::days(1));
        let err = store.add_task(form).unwrap_err();
        match err {
            LocalStoreError::Invalid(errors) => assert_eq!(errors[0].field, "due_date"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn toggle_stamps_and_clears_completion() {
        let mut store = fresh_store();
        let task = store.add_task(TaskForm::new("X")).unwrap();

        assert!(store.toggle_completion(&task.id).unwrap());
        let toggled = &store.tasks()[0];
        assert!(toggled.is_completed);
        assert!(toggled.completed_at.is_some());

        assert!(store.toggle_completion(&task.id).unwrap());
        let toggled = &store.tasks()[0];
        assert!(!toggled.is_completed);
        assert!(toggled.completed_at.is_none());
    }

    #[test]
    fn toggle_unknown_id_is_false() {
        let mut store = fresh_store();
        assert!(!store.toggle_completion("nope").unwrap());
    }

    #[test]
    fn ids_stay_unique_under_rapid_adds() {
        let mut store = fresh_store();
        for i in 0..5 {
            store.add_task(TaskForm::new(format!("task {i}"))).unwrap();
        }
        let mut ids: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn every_mutation_persists_the_whole_collection() {
        let storage: Arc<MemoryStorage> = Arc::new(MemoryStorage::new());
        let mut store = LocalTaskStore::load(storage.clone());
        store.add_task(TaskForm::new("one")).unwrap();
        store.add_task(TaskForm::new("two")).unwrap();

        // A fresh store over the same storage sees the same collection
        let reloaded = LocalTaskStore::load(storage.clone());
        assert_eq!(reloaded.tasks(), store.tasks());

        let id = store.tasks()[0].id.clone();
        store.delete_task(&id).unwrap();
        let reloaded = LocalTaskStore::load(storage);
        assert_eq!(reloaded.tasks().len(), 1);
        assert_eq!(reloaded.tasks()[0].title, "two");
    }

    #[test]
    fn filtered_views_do_not_mutate() {
        let mut store = fresh_store();
        let a = store.add_task(TaskForm::new("a")).unwrap();
        store.add_task(TaskForm::new("b")).unwrap();
        store.toggle_completion(&a.id).unwrap();

        assert_eq!(store.filtered(TaskFilter::All).len(), 2);
        assert_eq!(store.filtered(TaskFilter::Active).len(), 1);
        assert_eq!(store.filtered(TaskFilter::Completed).len(), 1);
        assert_eq!(store.tasks().len(), 2);
    }

    #[test]
    fn view_filters_and_orders_together() {
        let mut store = fresh_store();
        let a = store.add_task(TaskForm::new("a")).unwrap();
        store.add_task(TaskForm::new("b")).unwrap();
        let c = store.add_task(TaskForm::new("c")).unwrap();
        store.toggle_completion(&a.id).unwrap();
        store.toggle_completion(&c.id).unwrap();

        let active = store.view(TaskFilter::Active, SortDirection::Asc);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "b");

        let done = store.view(TaskFilter::Completed, SortDirection::Desc);
        let titles: Vec<&str> = done.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a"]);
    }

    #[test]
    fn sort_by_created_both_directions() {
        let mut store = fresh_store();
        store.add_task(TaskForm::new("first")).unwrap();
        store.add_task(TaskForm::new("second")).unwrap();

        let asc = store.sorted_by_created(SortDirection::Asc);
        assert_eq!(asc[0].title, "first");
        let desc = store.sorted_by_created(SortDirection::Desc);
        assert_eq!(desc[0].title, "second");
    }

    #[test]
    fn malformed_storage_loads_empty() {
        let storage: Arc<MemoryStorage> = Arc::new(MemoryStorage::new());
        storage.set(TASKS_KEY, "broken [").unwrap();
        let store = LocalTaskStore::load(storage);
        assert!(store.tasks().is_empty());
    }
}
