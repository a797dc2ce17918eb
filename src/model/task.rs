use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder shown for tasks without a name.
pub const UNNAMED: &str = "Unnamed";

/// Upper bound of `Task::progress`.
pub const MAX_PROGRESS: u8 = 100;

/// Opaque task identifier. Stable for the task's lifetime and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single schedulable row of the task table / bar of the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(default)]
    pub name: String,
    #[serde(with = "date_serde")]
    pub start: NaiveDate,
    #[serde(with = "date_serde")]
    pub end: NaiveDate,
    /// Completion percentage, always within `0..=100`.
    #[serde(default, deserialize_with = "progress_serde::deserialize")]
    pub progress: u8,
    /// Ids of the tasks this one depends on, in insertion order.
    #[serde(default, deserialize_with = "dependencies_serde::deserialize")]
    pub dependencies: Vec<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl Task {
    /// Create a new task with a fresh id and no progress or dependencies.
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: TaskId::generate(),
            name: name.into(),
            start,
            end,
            progress: 0,
            dependencies: Vec::new(),
            remark: None,
        }
    }

    /// The default one-day task starting on `today`.
    pub fn new_on(name: impl Into<String>, today: NaiveDate) -> Self {
        Self::new(name, today, today + Duration::days(1))
    }

    /// Name for display, falling back to the placeholder.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            UNNAMED
        } else {
            &self.name
        }
    }

    pub fn depends_on(&self, id: &TaskId) -> bool {
        self.dependencies.contains(id)
    }

    /// Number of days covered by the bar (zero for inverted ranges).
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days().max(0)
    }
}

/// Clamp an arbitrary integer percentage into `0..=100`.
pub fn clamp_progress(raw: i64) -> u8 {
    raw.clamp(0, MAX_PROGRESS as i64) as u8
}

/// Round and clamp a fractional percentage. `NaN` counts as zero.
pub fn progress_from_f64(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, MAX_PROGRESS as f64) as u8
}

/// A partial update of a task. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Raw percentage; clamped when applied.
    pub progress: Option<i64>,
    /// Full replacement of the dependency list.
    pub dependencies: Option<Vec<TaskId>>,
    /// `Some(None)` clears the remark.
    pub remark: Option<Option<String>>,
}

impl TaskPatch {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn with_progress(mut self, progress: i64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<TaskId>) -> Self {
        self.dependencies = Some(dependencies);
        self
    }

    pub fn with_remark(mut self, remark: Option<String>) -> Self {
        self.remark = Some(remark);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The task with this patch merged in. Progress is clamped; dependency
    /// lists are taken as given.
    pub fn applied_to(&self, task: &Task) -> Task {
        let mut next = task.clone();
        if let Some(name) = &self.name {
            next.name = name.clone();
        }
        if let Some(start) = self.start {
            next.start = start;
        }
        if let Some(end) = self.end {
            next.end = end;
        }
        if let Some(progress) = self.progress {
            next.progress = clamp_progress(progress);
        }
        if let Some(dependencies) = &self.dependencies {
            next.dependencies = dependencies.clone();
        }
        if let Some(remark) = &self.remark {
            next.remark = remark.clone();
        }
        next
    }
}

/// Parse a calendar date, ignoring any time component after the date.
pub fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .or_else(|| s.get(..10).and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok()))
}

/// Canonical date format of the task file and the timeline callbacks.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Serde helper: `YYYY-MM-DD` out, `YYYY-MM-DD[...]` in.
mod date_serde {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(super::DATE_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_calendar_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid calendar date `{raw}`")))
    }
}

/// Serde helper: accepts any JSON number and clamps it into `0..=100`.
mod progress_serde {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u8, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        Ok(super::progress_from_f64(raw))
    }
}

/// Serde helper: dependency lists may be an array of ids or a comma-separated
/// string.
mod dependencies_serde {
    use serde::{Deserialize, Deserializer};

    use super::TaskId;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDependencies {
        List(Vec<TaskId>),
        Joined(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<TaskId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawDependencies::deserialize(deserializer)? {
            RawDependencies::List(ids) => ids,
            RawDependencies::Joined(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(TaskId::from)
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_on_spans_one_day() {
        let task = Task::new_on("", date(2024, 3, 1));
        assert_eq!(task.end, date(2024, 3, 2));
        assert_eq!(task.progress, 0);
        assert!(task.dependencies.is_empty());
        assert_eq!(task.display_name(), UNNAMED);
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(TaskId::generate(), TaskId::generate());
    }

    #[test]
    fn progress_clamping() {
        assert_eq!(clamp_progress(150), 100);
        assert_eq!(clamp_progress(-5), 0);
        assert_eq!(progress_from_f64(42.6), 43);
        assert_eq!(progress_from_f64(f64::NAN), 0);
    }

    #[test]
    fn patch_merges_only_given_fields() {
        let task = Task::new_on("Design", date(2024, 3, 1));
        let next = TaskPatch::default()
            .with_progress(250)
            .with_remark(Some("late".into()))
            .applied_to(&task);
        assert_eq!(next.name, "Design");
        assert_eq!(next.progress, 100);
        assert_eq!(next.remark.as_deref(), Some("late"));
        assert_eq!(next.id, task.id);
    }

    #[test]
    fn deserializes_lenient_fields() {
        let json = r#"{
            "id": "3",
            "name": "Build",
            "start": "2024-01-02 00:00:00",
            "end": "2024-01-05T12:00:00Z",
            "progress": 120.4,
            "dependencies": "1, 2",
            "_index": 7
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.start, date(2024, 1, 2));
        assert_eq!(task.end, date(2024, 1, 5));
        assert_eq!(task.progress, 100);
        assert_eq!(task.dependencies, vec![TaskId::from("1"), TaskId::from("2")]);
        assert_eq!(task.remark, None);
    }

    #[test]
    fn serializes_plain_dates() {
        let mut task = Task::new("Ship", date(2024, 1, 2), date(2024, 1, 3));
        task.id = TaskId::from("a");
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["start"], "2024-01-02");
        assert_eq!(json["end"], "2024-01-03");
        assert!(json.get("remark").is_none());
    }
}
