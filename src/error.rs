//! Error types for the editor's fallible operations (file I/O, import, settings).

use std::io;

use crate::model::TaskId;

/// Result type alias for editor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the editor.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reader/writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Two tasks in one collection share an id.
    #[error("Duplicate task id `{0}`")]
    DuplicateTaskId(TaskId),

    /// A task without an id.
    #[error("Task at position {0} has an empty id")]
    EmptyTaskId(usize),

    /// A CSV header row without the columns needed to build tasks.
    #[error("CSV is missing required columns. Found headers: {found:?}. Need columns for: task name, start date, end date.")]
    MissingColumns { found: Vec<String> },

    /// Every data row of an import was rejected.
    #[error("No valid tasks found ({skipped} rows skipped)")]
    NoValidRows { skipped: usize },

    /// Export requested for an empty collection.
    #[error("Nothing to export: the task list is empty")]
    EmptyProject,
}
