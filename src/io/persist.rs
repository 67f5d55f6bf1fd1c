//! Persistence of the task list and theme preference.
//!
//! Both live in a [`KeyValueStore`] under fixed keys. Reads never fail:
//! a missing or unreadable entry degrades to the empty list or the
//! fallback theme, with the cause logged.

use crate::io::storage::{KeyValueStore, StorageError};
use crate::model::task::Task;
use crate::model::theme::Theme;
use crate::ops::task_ops::TaskStore;

/// Key of the JSON array of tasks
pub const TASKS_KEY: &str = "glassdo_tasks_v1";
/// Key of the theme literal (`light` or `dark`)
pub const THEME_KEY: &str = "glassdo_theme_v1";

pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Persistence { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the task list, or an empty one if the entry is absent or malformed.
    pub fn load_tasks(&self) -> TaskStore {
        let raw = match self.store.get(TASKS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return TaskStore::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read task list, starting empty");
                return TaskStore::new();
            }
        };
        match deserialize_tasks(&raw) {
            Ok(tasks) => TaskStore::from_tasks(tasks),
            Err(e) => {
                tracing::warn!(error = %e, "stored task list is malformed, starting empty");
                TaskStore::new()
            }
        }
    }

    /// Load the theme: the stored value, else `system`, else dark.
    pub fn load_theme(&self, system: Option<Theme>) -> Theme {
        let stored = match self.store.get(THEME_KEY) {
            Ok(Some(raw)) => match raw.parse::<Theme>() {
                Ok(theme) => Some(theme),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring stored theme");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read theme");
                None
            }
        };
        stored.or(system).unwrap_or_default()
    }

    pub fn save_tasks(&self, tasks: &TaskStore) -> Result<(), StorageError> {
        let json = serialize_tasks(tasks.tasks())?;
        self.store.set(TASKS_KEY, &json)
    }

    pub fn save_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.store.set(THEME_KEY, theme.as_str())
    }

    /// Write both entries. The theme is written even if the task write fails.
    pub fn save_all(&self, tasks: &TaskStore, theme: Theme) -> Result<(), StorageError> {
        let tasks_result = self.save_tasks(tasks);
        let theme_result = self.save_theme(theme);
        tasks_result.and(theme_result)
    }
}

pub fn serialize_tasks(tasks: &[Task]) -> Result<String, serde_json::Error> {
    serde_json::to_string(tasks)
}

pub fn deserialize_tasks(raw: &str) -> Result<Vec<Task>, serde_json::Error> {
    serde_json::from_str(raw)
}
