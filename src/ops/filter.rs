use serde::Serialize;

use crate::model::filter::FilterMode;
use crate::model::task::Task;

/// Number of tasks visible under each filter mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub all: usize,
    pub active: usize,
    pub completed: usize,
}

impl TaskCounts {
    pub fn get(&self, mode: FilterMode) -> usize {
        match mode {
            FilterMode::All => self.all,
            FilterMode::Active => self.active,
            FilterMode::Completed => self.completed,
        }
    }
}

/// The ordered subsequence of `tasks` visible under `mode`.
pub fn filter_tasks(tasks: &[Task], mode: FilterMode) -> Vec<&Task> {
    tasks.iter().filter(|t| mode.admits(t.completed)).collect()
}

pub fn count_tasks(tasks: &[Task]) -> TaskCounts {
    let completed = tasks.iter().filter(|t| t.completed).count();
    TaskCounts {
        all: tasks.len(),
        active: tasks.len() - completed,
        completed,
    }
}
