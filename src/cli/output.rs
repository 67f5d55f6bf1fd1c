use chrono::{Local, TimeZone};
use serde::Serialize;

use crate::model::filter::FilterMode;
use crate::model::task::Task;
use crate::model::theme::Theme;
use crate::ops::filter::TaskCounts;
use crate::util::unicode::fit_to_width;

/// Cells given to task text in the plain listing
pub const TEXT_WIDTH: usize = 48;

pub const EMPTY_MESSAGE: &str = "No active tasks. Take a breath.";

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskJson {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub created_at: i64,
    pub due_at: Option<i64>,
    pub overdue: bool,
}

#[derive(Serialize)]
pub struct ListJson {
    pub filter: FilterMode,
    pub counts: TaskCounts,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct SuggestJson {
    pub parent: Option<String>,
    pub subtasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct ThemeJson {
    pub theme: Theme,
}

pub fn task_to_json(task: &Task, now_ms: i64) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        text: task.text.clone(),
        completed: task.completed,
        created_at: task.created_at,
        due_at: task.due_at,
        overdue: is_overdue(task, now_ms),
    }
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

/// ANSI styles for the plain listing, picked per theme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub id: &'static str,
    pub done: &'static str,
    pub due: &'static str,
    pub overdue: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Palette {
                id: "\x1b[38;5;141m",
                done: "\x1b[2;9m",
                due: "\x1b[38;5;250m",
                overdue: "\x1b[38;5;203m",
                reset: "\x1b[0m",
            },
            Theme::Light => Palette {
                id: "\x1b[38;5;97m",
                done: "\x1b[38;5;245;9m",
                due: "\x1b[38;5;240m",
                overdue: "\x1b[38;5;160m",
                reset: "\x1b[0m",
            },
        }
    }

    /// No escape codes at all
    pub fn plain() -> Self {
        Palette {
            id: "",
            done: "",
            due: "",
            overdue: "",
            reset: "",
        }
    }
}

/// A task with a due time in the past that is not yet completed
pub fn is_overdue(task: &Task, now_ms: i64) -> bool {
    !task.completed && task.due_at.is_some_and(|due| due < now_ms)
}

/// Format a timestamp like `Jan 1, 10:00` in the given timezone
pub fn format_due_in<Tz: TimeZone>(ms: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match tz.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%b %-d, %H:%M").to_string(),
        None => "-".to_string(),
    }
}

pub fn format_due(ms: i64) -> String {
    format_due_in(ms, &Local)
}

/// One listing line: checkbox, short id, text, due date.
pub fn format_task_line_with(
    task: &Task,
    now_ms: i64,
    palette: &Palette,
    due_fmt: impl Fn(i64) -> String,
) -> String {
    let check = if task.completed { "[x]" } else { "[ ]" };
    let text = fit_to_width(&task.text, TEXT_WIDTH);
    let text = if task.completed {
        format!("{}{}{}", palette.done, text, palette.reset)
    } else {
        text
    };
    let mut line = format!(
        "{} {}{}{}  {}",
        check,
        palette.id,
        task.short_id(),
        palette.reset,
        text
    );
    if let Some(due) = task.due_at {
        if is_overdue(task, now_ms) {
            line.push_str(&format!(
                "  {}due {} (overdue){}",
                palette.overdue,
                due_fmt(due),
                palette.reset
            ));
        } else {
            line.push_str(&format!("  {}due {}{}", palette.due, due_fmt(due), palette.reset));
        }
    }
    line.trim_end().to_string()
}

pub fn format_task_line(task: &Task, now_ms: i64, palette: &Palette) -> String {
    format_task_line_with(task, now_ms, palette, format_due)
}

/// The whole listing for a filter, including the summary footer.
pub fn format_listing(
    tasks: &[&Task],
    counts: TaskCounts,
    now_ms: i64,
    palette: &Palette,
) -> Vec<String> {
    if tasks.is_empty() {
        return vec![EMPTY_MESSAGE.to_string()];
    }
    let mut lines: Vec<String> = tasks
        .iter()
        .map(|t| format_task_line(t, now_ms, palette))
        .collect();
    lines.push(String::new());
    lines.push(format_counts(counts));
    lines
}

pub fn format_counts(counts: TaskCounts) -> String {
    format!(
        "{} {}, {} active, {} completed",
        counts.all,
        if counts.all == 1 { "task" } else { "tasks" },
        counts.active,
        counts.completed
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;

    const NOW: i64 = 1_735_725_600_000; // 2025-01-01T10:00:00Z

    fn task(text: &str, completed: bool, due_at: Option<i64>) -> Task {
        Task {
            id: "0123456789abcdef".into(),
            text: text.into(),
            completed,
            created_at: 0,
            due_at,
        }
    }

    fn utc_fmt(ms: i64) -> String {
        format_due_in(ms, &FixedOffset::east_opt(0).unwrap())
    }

    #[test]
    fn format_due_short_month() {
        assert_eq!(utc_fmt(NOW), "Jan 1, 10:00");
    }

    #[test]
    fn overdue_only_when_incomplete_and_past() {
        assert!(is_overdue(&task("a", false, Some(NOW - 1)), NOW));
        assert!(!is_overdue(&task("a", true, Some(NOW - 1)), NOW));
        assert!(!is_overdue(&task("a", false, Some(NOW + 1)), NOW));
        assert!(!is_overdue(&task("a", false, None), NOW));
    }

    #[test]
    fn plain_line_without_due() {
        let line = format_task_line_with(&task("Buy milk", false, None), NOW, &Palette::plain(), utc_fmt);
        assert_eq!(line, "[ ] 01234567  Buy milk");
    }

    #[test]
    fn plain_line_with_due_and_overdue() {
        let upcoming = format_task_line_with(
            &task("Call Bob", false, Some(NOW + 3_600_000)),
            NOW,
            &Palette::plain(),
            utc_fmt,
        );
        assert_eq!(
            upcoming,
            format!("[ ] 01234567  {:<48}  due Jan 1, 11:00", "Call Bob")
        );

        let late = format_task_line_with(
            &task("Call Bob", false, Some(NOW - 3_600_000)),
            NOW,
            &Palette::plain(),
            utc_fmt,
        );
        assert!(late.ends_with("due Jan 1, 09:00 (overdue)"));
    }

    #[test]
    fn completed_line_is_checked() {
        let line = format_task_line_with(&task("Done thing", true, None), NOW, &Palette::plain(), utc_fmt);
        assert!(line.starts_with("[x] "));
    }

    #[test]
    fn styled_line_wraps_text_in_codes() {
        let palette = Palette::for_theme(Theme::Dark);
        let line = format_task_line_with(&task("Done", true, None), NOW, &palette, utc_fmt);
        assert!(line.contains(palette.done));
        assert!(line.contains(palette.reset));
        assert_ne!(Palette::for_theme(Theme::Light), palette);
    }

    #[test]
    fn empty_listing_message() {
        let lines = format_listing(&[], TaskCounts::default(), NOW, &Palette::plain());
        assert_eq!(lines, vec![EMPTY_MESSAGE.to_string()]);
    }

    #[test]
    fn counts_footer() {
        let counts = TaskCounts { all: 3, active: 1, completed: 2 };
        assert_eq!(format_counts(counts), "3 tasks, 1 active, 2 completed");
        let one = TaskCounts { all: 1, active: 1, completed: 0 };
        assert_eq!(format_counts(one), "1 task, 1 active, 0 completed");
    }

    #[test]
    fn json_has_camel_case_and_overdue() {
        let json = serde_json::to_value(task_to_json(&task("x", false, Some(NOW - 1)), NOW)).unwrap();
        assert_eq!(json["createdAt"], 0);
        assert_eq!(json["dueAt"], NOW - 1);
        assert_eq!(json["overdue"], true);
    }
}
