use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which subset of tasks a listing shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    All,
    /// Only tasks not yet completed
    Active,
    Completed,
}

impl FilterMode {
    pub const ALL_MODES: [FilterMode; 3] = [FilterMode::All, FilterMode::Active, FilterMode::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Active => "active",
            FilterMode::Completed => "completed",
        }
    }

    /// Whether a task with the given completion flag is visible under this mode
    pub fn admits(self, completed: bool) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Active => !completed,
            FilterMode::Completed => completed,
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
