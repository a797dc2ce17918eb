//! Edit/commit behaviour of the editable table cells.
//!
//! Cells hold their in-progress value locally and only produce a
//! [`TaskPatch`] when editing finishes, so a half-typed value is never
//! visible in the chart.

use chrono::NaiveDate;

use crate::model::dependency;
use crate::model::task::{clamp_progress, MAX_PROGRESS};
use crate::model::{Task, TaskId, TaskPatch, TaskStore};

/// Free-text columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Name,
    Remark,
}

impl TextField {
    pub fn value(self, task: &Task) -> &str {
        match self {
            TextField::Name => &task.name,
            TextField::Remark => task.remark.as_deref().unwrap_or_default(),
        }
    }
}

/// A text cell being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCell {
    field: TextField,
    initial: String,
    buffer: String,
}

impl TextCell {
    pub fn begin(task: &Task, field: TextField) -> Self {
        let initial = field.value(task).to_string();
        Self {
            field,
            buffer: initial.clone(),
            initial,
        }
    }

    pub fn field(&self) -> TextField {
        self.field
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut String {
        &mut self.buffer
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.buffer = value.into();
    }

    /// The patch for a finished edit, or `None` if the value is unchanged.
    pub fn commit(&self) -> Option<TaskPatch> {
        if self.buffer == self.initial {
            return None;
        }
        let patch = TaskPatch::default();
        Some(match self.field {
            TextField::Name => patch.with_name(self.buffer.clone()),
            TextField::Remark if self.buffer.is_empty() => patch.with_remark(None),
            TextField::Remark => patch.with_remark(Some(self.buffer.clone())),
        })
    }
}

/// The progress cell: accepts numeric text only, commits a clamped integer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressCell {
    initial: String,
    buffer: String,
}

impl ProgressCell {
    pub fn begin(task: &Task) -> Self {
        let initial = task.progress.to_string();
        Self {
            buffer: initial.clone(),
            initial,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Replace the buffer with `raw` if it is numeric (or empty). Returns
    /// whether the keystroke was accepted.
    pub fn input(&mut self, raw: &str) -> bool {
        if !is_numeric_entry(raw) {
            return false;
        }
        self.buffer = raw.to_string();
        true
    }

    /// Finish editing: clamp and round the entry. The buffer is reset to the
    /// committed value so an entry above 100 reads back as `100`.
    pub fn commit(&mut self) -> Option<TaskPatch> {
        if self.buffer == self.initial {
            return None;
        }
        let value = parse_progress(&self.buffer);
        self.buffer = value.to_string();
        if self.buffer == self.initial {
            return None;
        }
        Some(TaskPatch::default().with_progress(value as i64))
    }
}

fn is_numeric_entry(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed.parse::<f64>().map(|v| v.is_finite()).unwrap_or(false)
}

fn parse_progress(raw: &str) -> u8 {
    let value = raw.trim().parse::<f64>().unwrap_or(0.0);
    if value >= MAX_PROGRESS as f64 {
        return MAX_PROGRESS;
    }
    clamp_progress(value.round() as i64)
}

/// The date-range cell: both ends are committed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRangeCell {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRangeCell {
    pub fn begin(task: &Task) -> Self {
        Self {
            start: task.start,
            end: task.end,
        }
    }

    pub fn range(&self) -> (NaiveDate, NaiveDate) {
        (self.start, self.end)
    }

    /// A new selection in the picker. A missing `to` means a single-day
    /// range; the pair is stored in order. Returns a patch whenever the
    /// range differs from the current one.
    pub fn select(&mut self, from: NaiveDate, to: Option<NaiveDate>) -> Option<TaskPatch> {
        let to = to.unwrap_or(from);
        let (start, end) = if to < from { (to, from) } else { (from, to) };
        if (start, end) == (self.start, self.end) {
            return None;
        }
        self.start = start;
        self.end = end;
        Some(TaskPatch::default().with_dates(start, end))
    }
}

/// The dependency tag list of one task. Every add or remove commits
/// immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyTags {
    task_id: TaskId,
}

impl DependencyTags {
    pub fn new(task_id: TaskId) -> Self {
        Self { task_id }
    }

    pub fn add(&self, store: &mut TaskStore, depends_on: &TaskId) -> bool {
        dependency::add_dependency(store, &self.task_id, depends_on)
    }

    pub fn remove(&self, store: &mut TaskStore, depends_on: &TaskId) -> bool {
        dependency::remove_dependency(store, &self.task_id, depends_on)
    }
}

/// Apply a finished cell edit through the store.
pub fn commit_to(store: &mut TaskStore, id: &TaskId, patch: Option<TaskPatch>) -> bool {
    match patch {
        Some(patch) => store.update_task(id, patch),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn task() -> Task {
        let mut t = Task::new("Write docs", date(3), date(5));
        t.progress = 40;
        t
    }

    #[test]
    fn text_commits_only_changes() {
        let t = task();
        let mut cell = TextCell::begin(&t, TextField::Name);
        assert_eq!(cell.commit(), None);

        cell.set("Write more docs");
        assert_eq!(
            cell.commit(),
            Some(TaskPatch::default().with_name("Write more docs"))
        );

        cell.set("Write docs");
        assert_eq!(cell.commit(), None);
    }

    #[test]
    fn empty_remark_clears_it() {
        let mut t = task();
        t.remark = Some("check".into());
        let mut cell = TextCell::begin(&t, TextField::Remark);
        cell.buffer_mut().clear();
        assert_eq!(cell.commit(), Some(TaskPatch::default().with_remark(None)));
    }

    #[test]
    fn progress_rejects_non_numeric_keystrokes() {
        let mut cell = ProgressCell::begin(&task());
        assert!(cell.input("4"));
        assert!(!cell.input("4a"));
        assert!(!cell.input("-"));
        assert_eq!(cell.buffer(), "4");
        assert!(cell.input(""));
    }

    #[test]
    fn progress_commit_clamps_and_resets_buffer() {
        let mut cell = ProgressCell::begin(&task());
        cell.input("250");
        assert_eq!(cell.commit(), Some(TaskPatch::default().with_progress(100)));
        assert_eq!(cell.buffer(), "100");

        let mut cell = ProgressCell::begin(&task());
        cell.input("-3");
        assert_eq!(cell.commit(), Some(TaskPatch::default().with_progress(0)));

        let mut cell = ProgressCell::begin(&task());
        cell.input("39.6");
        assert_eq!(cell.commit(), None);
        assert_eq!(cell.buffer(), "40");
    }

    #[test]
    fn date_range_orders_and_fills_missing_end() {
        let mut cell = DateRangeCell::begin(&task());
        assert_eq!(cell.select(date(3), Some(date(5))), None);
        assert_eq!(
            cell.select(date(9), Some(date(7))),
            Some(TaskPatch::default().with_dates(date(7), date(9)))
        );
        assert_eq!(
            cell.select(date(12), None),
            Some(TaskPatch::default().with_dates(date(12), date(12)))
        );
        assert_eq!(cell.range(), (date(12), date(12)));
    }

    fn store_with(names: &[&str]) -> (TaskStore, Vec<TaskId>) {
        let mut store = TaskStore::new();
        let ids = names
            .iter()
            .map(|name| store.create_task_on(Some(name), date(1)).id)
            .collect();
        (store, ids)
    }

    #[test]
    fn each_tag_change_commits_on_its_own() {
        let (mut store, ids) = store_with(&["Plan", "Build"]);
        let tags = DependencyTags::new(ids[1].clone());
        let revision = store.revision();

        assert!(tags.add(&mut store, &ids[0]));
        assert!(!tags.add(&mut store, &ids[0]));
        assert_eq!(store.revision(), revision + 1);
        assert_eq!(store.get(&ids[1]).unwrap().dependencies, vec![ids[0].clone()]);

        assert!(tags.remove(&mut store, &ids[0]));
        assert_eq!(store.revision(), revision + 2);
        assert!(store.get(&ids[1]).unwrap().dependencies.is_empty());
        assert!(!tags.remove(&mut store, &ids[0]));
        assert_eq!(store.revision(), revision + 2);
    }

    #[test]
    fn tag_cannot_point_at_its_own_task_or_a_stranger() {
        let (mut store, ids) = store_with(&["Plan"]);
        let tags = DependencyTags::new(ids[0].clone());
        let revision = store.revision();

        assert!(!tags.add(&mut store, &ids[0]));
        assert!(!tags.add(&mut store, &TaskId::from("missing")));
        assert_eq!(store.revision(), revision);
        assert!(store.get(&ids[0]).unwrap().dependencies.is_empty());
    }

    #[test]
    fn commit_applies_finished_edits_only() {
        let (mut store, ids) = store_with(&["Plan"]);
        let revision = store.revision();

        let mut cell = TextCell::begin(store.get(&ids[0]).unwrap(), TextField::Name);
        assert!(!commit_to(&mut store, &ids[0], cell.commit()));
        assert_eq!(store.revision(), revision);

        cell.set("Plan the launch");
        assert!(commit_to(&mut store, &ids[0], cell.commit()));
        assert_eq!(store.get(&ids[0]).unwrap().name, "Plan the launch");
        assert_eq!(store.revision(), revision + 1);
    }
}
