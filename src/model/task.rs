use serde::{Deserialize, Serialize};

/// A single to-do item.
///
/// Field names serialize in camelCase so the persisted entry reads
/// `{"id", "text", "completed", "createdAt", "dueAt"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque unique identifier (UUID v4), fixed at creation
    pub id: String,
    /// Display text, always trimmed and non-empty
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// Creation time in milliseconds since the Unix epoch
    pub created_at: i64,
    /// Due time in milliseconds since the Unix epoch
    #[serde(default)]
    pub due_at: Option<i64>,
}

impl Task {
    /// Build a fresh, incomplete task with a newly generated id.
    ///
    /// Callers are responsible for trimming `text` and rejecting blanks;
    /// only the store constructs tasks.
    pub(crate) fn new(text: String, created_at: i64, due_at: Option<i64>) -> Self {
        Task {
            id: new_task_id(),
            text,
            completed: false,
            created_at,
            due_at,
        }
    }

    /// First eight characters of the id, as shown in listings
    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.id.len());
        &self.id[..end]
    }
}

/// Generate a new opaque task id
pub fn new_task_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
