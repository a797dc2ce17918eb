use std::path::Path;

use log::info;

use crate::error::Result;
use crate::model::store::normalize_collection;
use crate::model::Task;

/// Serialize tasks to the task-file format (a pretty JSON array).
pub fn export_tasks(tasks: &[Task]) -> Result<String> {
    Ok(serde_json::to_string_pretty(tasks)?)
}

/// Parse and validate a task file. Never touches a store, so a failed
/// import leaves the current collection as it was.
pub fn import_tasks(json: &str) -> Result<Vec<Task>> {
    let tasks: Vec<Task> = serde_json::from_str(json)?;
    normalize_collection(tasks)
}

/// Save tasks to a JSON file.
pub fn save_tasks(tasks: &[Task], path: &Path) -> Result<()> {
    let json = export_tasks(tasks)?;
    std::fs::write(path, json)?;
    info!("saved {} tasks to {}", tasks.len(), path.display());
    Ok(())
}

/// Load tasks from a JSON file.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    let json = std::fs::read_to_string(path)?;
    let tasks = import_tasks(&json)?;
    info!("loaded {} tasks from {}", tasks.len(), path.display());
    Ok(tasks)
}

/// Write an SVG capture of the timeline.
pub fn save_svg(markup: &str, path: &Path) -> Result<()> {
    std::fs::write(path, markup)?;
    info!("exported timeline image to {}", path.display());
    Ok(())
}
