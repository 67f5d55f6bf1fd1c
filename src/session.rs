//! The application state container.
//!
//! A [`Session`] owns the task list, the theme and the persistence adapter.
//! Every mutation that changes state is followed by a write of both
//! entries. Mutations never fail: invalid input is a no-op, and a failed
//! write is logged and kept for the caller to inspect with
//! [`Session::take_write_error`].

use crate::io::persist::Persistence;
use crate::io::storage::{KeyValueStore, StorageError};
use crate::model::filter::FilterMode;
use crate::model::task::Task;
use crate::model::theme::Theme;
use crate::ops::task_ops::{TaskStore, now_millis, parse_due};
use crate::suggest::SuggestionClient;

pub struct Session<S> {
    tasks: TaskStore,
    theme: Theme,
    persistence: Persistence<S>,
    write_error: Option<StorageError>,
}

/// A parent task waiting for its suggestions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSuggestion {
    pub parent: String,
    /// Trimmed parent text, as sent upstream
    pub text: String,
    pub due_at: Option<i64>,
}

/// What the suggest flow added
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestOutcome {
    /// The task typed by the user, `None` if its text was blank
    pub parent: Option<String>,
    /// Ids of the suggested subtasks, in display order
    pub subtasks: Vec<String>,
}

impl<S: KeyValueStore> Session<S> {
    /// Load state from `store`, using the environment's light/dark signal
    /// when no theme has been saved.
    pub fn load(store: S) -> Self {
        Self::load_with_system_theme(store, Theme::system_preference())
    }

    pub fn load_with_system_theme(store: S, system: Option<Theme>) -> Self {
        let persistence = Persistence::new(store);
        let tasks = persistence.load_tasks();
        let theme = persistence.load_theme(system);
        tracing::debug!(tasks = tasks.len(), %theme, "session loaded");
        Session {
            tasks,
            theme,
            persistence,
            write_error: None,
        }
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn storage(&self) -> &S {
        self.persistence.store()
    }

    /// Tasks visible under `mode`, newest first
    pub fn visible(&self, mode: FilterMode) -> Vec<&Task> {
        self.tasks.filter(mode)
    }

    pub fn resolve_id(&self, prefix: &str) -> Option<String> {
        self.tasks.resolve_prefix(prefix).map(str::to_string)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub fn add(&mut self, text: &str, due: Option<&str>) -> Option<String> {
        let id = self.tasks.add(text, due);
        if id.is_some() {
            self.persist();
        }
        id
    }

    pub fn add_batch<I, T>(&mut self, items: I, due_at: Option<i64>) -> Vec<String>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let ids = self.tasks.add_batch(items, due_at);
        if !ids.is_empty() {
            self.persist();
        }
        ids
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        self.apply(|tasks| tasks.toggle(id))
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.apply(|tasks| tasks.remove(id))
    }

    pub fn edit(&mut self, id: &str, new_text: &str) -> bool {
        self.apply(|tasks| tasks.edit(id, new_text))
    }

    pub fn set_theme(&mut self, theme: Theme) -> bool {
        if self.theme == theme {
            return false;
        }
        self.theme = theme;
        self.persist();
        true
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.set_theme(self.theme.toggled());
        self.theme
    }

    /// Add `text` as a task, then ask `client` to break it down and add the
    /// suggestions above it, each prefixed with `prefix` and sharing the
    /// parent's due date.
    ///
    /// The parent is saved before the request goes out. There is no
    /// cancellation: whatever comes back is added when it arrives.
    pub async fn add_with_suggestions<C>(
        &mut self,
        client: &C,
        text: &str,
        due: Option<&str>,
        prefix: &str,
    ) -> SuggestOutcome
    where
        C: SuggestionClient + ?Sized,
    {
        let Some(pending) = self.begin_suggestion(text, due) else {
            return SuggestOutcome::default();
        };
        let suggestions = client.suggest(&pending.text).await;
        self.finish_suggestion(pending, &suggestions, prefix)
    }

    /// First half of the suggest flow: add the parent task and return what
    /// the request needs. `None` if the text is blank.
    ///
    /// The CLI drops the data lock while the request is in flight and calls
    /// [`Session::finish_suggestion`] on a freshly loaded session.
    pub fn begin_suggestion(&mut self, text: &str, due: Option<&str>) -> Option<PendingSuggestion> {
        let due_at = due.and_then(parse_due);
        let parent = self.tasks.add_at(text, due_at, now_millis())?;
        self.persist();
        Some(PendingSuggestion {
            parent,
            text: text.trim().to_string(),
            due_at,
        })
    }

    /// Second half of the suggest flow: add the suggestions at the front.
    /// An empty list leaves the store untouched.
    pub fn finish_suggestion(
        &mut self,
        pending: PendingSuggestion,
        suggestions: &[String],
        prefix: &str,
    ) -> SuggestOutcome {
        let items: Vec<String> = suggestions
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| format!("{}{}", prefix, s))
            .collect();
        let subtasks = self.add_batch(items, pending.due_at);
        SuggestOutcome {
            parent: Some(pending.parent),
            subtasks,
        }
    }

    /// Take the most recent write failure, if any.
    pub fn take_write_error(&mut self) -> Option<StorageError> {
        self.write_error.take()
    }

    fn apply(&mut self, op: impl FnOnce(&mut TaskStore) -> bool) -> bool {
        let changed = op(&mut self.tasks);
        if changed {
            self.persist();
        }
        changed
    }

    fn persist(&mut self) {
        if let Err(e) = self.persistence.save_all(&self.tasks, self.theme) {
            tracing::error!(error = %e, "could not save tasks");
            self.write_error = Some(e);
        }
    }
}
