use std::collections::HashSet;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::model::filter::FilterMode;
use crate::model::task::{Task, new_task_id};
use crate::ops::filter::{TaskCounts, count_tasks, filter_tasks};

/// Ordered task list, newest first.
///
/// Every operation is soft-fail: blank text and unknown ids are ignored
/// rather than reported. Mutators return whether anything changed so the
/// caller knows when to persist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        TaskStore::default()
    }

    /// Build a store from previously persisted tasks.
    ///
    /// Records with a blank text or an id already seen earlier in the list
    /// are dropped so the store invariants hold from the start.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(tasks.len());
        for task in tasks {
            if task.text.trim().is_empty() {
                tracing::warn!(id = %task.id, "dropping stored task with blank text");
                continue;
            }
            if !seen.insert(task.id.clone()) {
                tracing::warn!(id = %task.id, "dropping stored task with duplicate id");
                continue;
            }
            kept.push(task);
        }
        TaskStore { tasks: kept }
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

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Resolve a full id or a unique id prefix to the full id.
    /// Ambiguous and unknown prefixes resolve to `None`.
    pub fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return None;
        }
        if let Some(exact) = self.get(prefix) {
            return Some(exact.id.as_str());
        }
        let mut matches = self.tasks.iter().filter(|t| t.id.starts_with(prefix));
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(first.id.as_str())
    }

    /// Number of tasks whose id starts with `prefix`
    pub fn prefix_match_count(&self, prefix: &str) -> usize {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return 0;
        }
        self.tasks.iter().filter(|t| t.id.starts_with(prefix)).count()
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    /// Add a task at the front. `due` is a date string as typed by the user
    /// (see [`parse_due`]). Returns the new id, or `None` if `text` is blank.
    pub fn add(&mut self, text: &str, due: Option<&str>) -> Option<String> {
        let due_at = due.and_then(parse_due);
        self.add_at(text, due_at, now_millis())
    }

    /// Add a task at the front with an already-resolved due time and an
    /// explicit creation time.
    pub fn add_at(&mut self, text: &str, due_at: Option<i64>, now: i64) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let task = self.fresh_task(text.to_string(), now, due_at);
        let id = task.id.clone();
        self.tasks.insert(0, task);
        Some(id)
    }

    /// Add a block of tasks at the front, keeping the block's order.
    pub fn add_batch<I, S>(&mut self, items: I, due_at: Option<i64>) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_batch_at(items, due_at, now_millis())
    }

    /// Batch insert with an explicit base time. Item `i` is created at
    /// `now + i + 1` so the block sorts after anything created at `now`.
    /// Blank items are skipped and do not consume an offset.
    pub fn add_batch_at<I, S>(&mut self, items: I, due_at: Option<i64>, now: i64) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut block = Vec::new();
        for item in items {
            let text = item.as_ref().trim();
            if text.is_empty() {
                continue;
            }
            let created_at = now + block.len() as i64 + 1;
            let task = self.fresh_task_excluding(text.to_string(), created_at, due_at, &block);
            block.push(task);
        }
        let ids = block.iter().map(|t| t.id.clone()).collect();
        self.tasks.splice(0..0, block);
        ids
    }

    fn fresh_task(&self, text: String, created_at: i64, due_at: Option<i64>) -> Task {
        self.fresh_task_excluding(text, created_at, due_at, &[])
    }

    fn fresh_task_excluding(
        &self,
        text: String,
        created_at: i64,
        due_at: Option<i64>,
        pending: &[Task],
    ) -> Task {
        let mut task = Task::new(text, created_at, due_at);
        while self.get(&task.id).is_some() || pending.iter().any(|p| p.id == task.id) {
            task.id = new_task_id();
        }
        task
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Flip the completion flag. No-op for an unknown id.
    pub fn toggle(&mut self, id: &str) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Replace the text of a task. Blank text discards the edit.
    pub fn edit(&mut self, id: &str, new_text: &str) -> bool {
        let new_text = new_text.trim();
        if new_text.is_empty() {
            return false;
        }
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) if task.text != new_text => {
                task.text = new_text.to_string();
                true
            }
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub fn filter(&self, mode: FilterMode) -> Vec<&Task> {
        filter_tasks(&self.tasks, mode)
    }

    pub fn counts(&self) -> TaskCounts {
        count_tasks(&self.tasks)
    }
}

// ---------------------------------------------------------------------------
// Time helpers
// ---------------------------------------------------------------------------

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parse a user-entered due date into epoch milliseconds.
///
/// Accepts `YYYY-MM-DDTHH:MM[:SS]`, `YYYY-MM-DD HH:MM[:SS]` and `YYYY-MM-DD`
/// in local time, or an RFC 3339 timestamp. Blank input means no due date;
/// anything unparseable also yields `None`.
pub fn parse_due(input: &str) -> Option<i64> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    let parsed = parse_due_in(s, &Local);
    if parsed.is_none() {
        tracing::warn!(input = s, "ignoring unparseable due date");
    }
    parsed
}

/// Timezone-parameterised core of [`parse_due`].
pub fn parse_due_in<Tz: TimeZone>(s: &str, tz: &Tz) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
    ];
    let naive = FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn store_with(texts: &[&str]) -> TaskStore {
        let mut store = TaskStore::new();
        // Added oldest first so the listing reads in the given order.
        for (i, text) in texts.iter().rev().enumerate() {
            store.add_at(text, None, i as i64).unwrap();
        }
        store
    }

    fn texts(store: &TaskStore) -> Vec<&str> {
        store.tasks().iter().map(|t| t.text.as_str()).collect()
    }

    // --- add ---

    #[test]
    fn add_blank_text_is_noop() {
        let mut store = store_with(&["existing"]);
        let before = store.clone();
        assert_eq!(store.add("", None), None);
        assert_eq!(store.add("   \t\n", Some("2025-01-01")), None);
        assert_eq!(store, before);
    }

    #[test]
    fn add_prepends_trimmed_task() {
        let mut store = store_with(&["older"]);
        let id = store.add("  Buy milk  ", None).unwrap();
        assert_eq!(store.len(), 2);
        let first = &store.tasks()[0];
        assert_eq!(first.id, id);
        assert_eq!(first.text, "Buy milk");
        assert!(!first.completed);
        assert_eq!(first.due_at, None);
    }

    #[test]
    fn add_at_records_times() {
        let mut store = TaskStore::new();
        let id = store.add_at("Call Bob", Some(99), 1234).unwrap();
        let task = store.get(&id).unwrap();
        assert_eq!(task.created_at, 1234);
        assert_eq!(task.due_at, Some(99));
    }

    #[test]
    fn add_with_unparseable_due_has_no_due() {
        let mut store = TaskStore::new();
        let id = store.add("Pay rent", Some("someday")).unwrap();
        assert_eq!(store.get(&id).unwrap().due_at, None);
    }

    // --- add_batch ---

    #[test]
    fn batch_is_prepended_as_block_in_order() {
        let mut store = store_with(&["parent", "older"]);
        let ids = store.add_batch_at(["one", "two", "three"], Some(7), 1000);
        assert_eq!(ids.len(), 3);
        assert_eq!(texts(&store), ["one", "two", "three", "parent", "older"]);
        for (i, task) in store.tasks()[..3].iter().enumerate() {
            assert_eq!(task.id, ids[i]);
            assert_eq!(task.created_at, 1000 + i as i64 + 1);
            assert_eq!(task.due_at, Some(7));
            assert!(!task.completed);
        }
    }

    #[test]
    fn batch_skips_blank_items() {
        let mut store = TaskStore::new();
        let ids = store.add_batch_at(["first", "  ", "second"], None, 0);
        assert_eq!(ids.len(), 2);
        assert_eq!(texts(&store), ["first", "second"]);
        assert_eq!(store.tasks()[1].created_at, 2);
    }

    #[test]
    fn empty_batch_changes_nothing() {
        let mut store = store_with(&["a"]);
        let before = store.clone();
        let ids = store.add_batch_at(Vec::<String>::new(), None, 0);
        assert!(ids.is_empty());
        assert_eq!(store, before);
    }

    #[test]
    fn ids_stay_unique() {
        let mut store = TaskStore::new();
        for i in 0..50 {
            store.add_at(&format!("task {}", i), None, i).unwrap();
        }
        store.add_batch_at(["x", "y", "z"], None, 100);
        let unique: HashSet<_> = store.tasks().iter().map(|t| &t.id).collect();
        assert_eq!(unique.len(), store.len());
    }

    // --- toggle / remove / edit ---

    #[test]
    fn double_toggle_restores_state() {
        let mut store = store_with(&["a"]);
        let id = store.tasks()[0].id.clone();
        assert!(store.toggle(&id));
        assert!(store.get(&id).unwrap().completed);
        assert!(store.toggle(&id));
        assert!(!store.get(&id).unwrap().completed);
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let mut store = store_with(&["a"]);
        let before = store.clone();
        assert!(!store.toggle("missing"));
        assert_eq!(store, before);
    }

    #[test]
    fn remove_deletes_only_match() {
        let mut store = store_with(&["a", "b", "c"]);
        let id = store.tasks()[1].id.clone();
        assert!(store.remove(&id));
        assert_eq!(texts(&store), ["a", "c"]);
        assert!(!store.remove(&id));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn edit_replaces_trimmed_text() {
        let mut store = store_with(&["draft"]);
        let id = store.tasks()[0].id.clone();
        assert!(store.edit(&id, "  final  "));
        assert_eq!(store.get(&id).unwrap().text, "final");
    }

    #[test]
    fn edit_with_blank_text_keeps_original() {
        let mut store = store_with(&["keep me"]);
        let id = store.tasks()[0].id.clone();
        assert!(!store.edit(&id, "   "));
        assert_eq!(store.get(&id).unwrap().text, "keep me");
    }

    #[test]
    fn edit_unknown_id_is_noop() {
        let mut store = store_with(&["a"]);
        let before = store.clone();
        assert!(!store.edit("missing", "text"));
        assert_eq!(store, before);
    }

    #[test]
    fn edit_preserves_identity_fields() {
        let mut store = TaskStore::new();
        let id = store.add_at("a", Some(5), 10).unwrap();
        store.toggle(&id);
        store.edit(&id, "b");
        let task = store.get(&id).unwrap();
        assert_eq!(task.created_at, 10);
        assert_eq!(task.due_at, Some(5));
        assert!(task.completed);
    }

    // --- scenario ---

    #[test]
    fn buy_milk_then_call_bob() {
        let mut store = TaskStore::new();
        store.add("Buy milk", None).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.tasks()[0].text, "Buy milk");
        assert!(!store.tasks()[0].completed);
        assert_eq!(store.tasks()[0].due_at, None);

        let bob = store.add("Call Bob", Some("2025-01-01T10:00")).unwrap();
        assert!(store.get(&bob).unwrap().due_at.is_some());
        store.toggle(&bob);

        assert!(store.get(&bob).unwrap().completed);
        let milk = store.tasks().iter().find(|t| t.text == "Buy milk").unwrap();
        assert!(!milk.completed);
    }

    // --- from_tasks / lookup ---

    #[test]
    fn from_tasks_drops_invalid_records() {
        let task = |id: &str, text: &str| Task {
            id: id.into(),
            text: text.into(),
            completed: false,
            created_at: 0,
            due_at: None,
        };
        let store = TaskStore::from_tasks(vec![
            task("a", "first"),
            task("b", "  "),
            task("a", "dupe"),
            task("c", "third"),
        ]);
        assert_eq!(texts(&store), ["first", "third"]);
    }

    #[test]
    fn resolve_prefix_requires_uniqueness() {
        let task = |id: &str| Task {
            id: id.into(),
            text: id.into(),
            completed: false,
            created_at: 0,
            due_at: None,
        };
        let store = TaskStore::from_tasks(vec![task("abc1"), task("abc2"), task("xyz")]);
        assert_eq!(store.resolve_prefix("x"), Some("xyz"));
        assert_eq!(store.resolve_prefix("abc1"), Some("abc1"));
        assert_eq!(store.resolve_prefix("abc"), None);
        assert_eq!(store.resolve_prefix("nope"), None);
        assert_eq!(store.resolve_prefix(""), None);

        assert_eq!(store.prefix_match_count("abc"), 2);
        assert_eq!(store.prefix_match_count("x"), 1);
        assert_eq!(store.prefix_match_count("nope"), 0);
        assert_eq!(store.prefix_match_count("  "), 0);
    }

    #[test]
    fn filter_does_not_mutate() {
        let mut store = store_with(&["a", "b"]);
        let id = store.tasks()[0].id.clone();
        store.toggle(&id);
        let before = store.clone();
        assert_eq!(store.filter(FilterMode::Completed).len(), 1);
        assert_eq!(store.filter(FilterMode::Active).len(), 1);
        assert_eq!(store, before);
    }

    // --- parse_due ---

    #[test]
    fn parse_due_local_forms() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let expected = 1_735_725_600_000; // 2025-01-01T10:00:00Z
        assert_eq!(parse_due_in("2025-01-01T10:00", &utc), Some(expected));
        assert_eq!(parse_due_in("2025-01-01T10:00:00", &utc), Some(expected));
        assert_eq!(parse_due_in("2025-01-01 10:00", &utc), Some(expected));
        assert_eq!(
            parse_due_in("2025-01-01", &utc),
            Some(expected - 10 * 3_600_000)
        );
    }

    #[test]
    fn parse_due_applies_offset() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            parse_due_in("2025-01-01T12:00", &plus_two),
            Some(1_735_725_600_000)
        );
    }

    #[test]
    fn parse_due_rfc3339() {
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(
            parse_due_in("2025-01-01T11:00:00+01:00", &utc),
            Some(1_735_725_600_000)
        );
    }

    #[test]
    fn parse_due_rejects_garbage() {
        assert_eq!(parse_due(""), None);
        assert_eq!(parse_due("   "), None);
        assert_eq!(parse_due("tomorrow-ish"), None);
        assert_eq!(parse_due("2025-13-01"), None);
    }
}
