use std::path::Path;

use log::info;

use crate::error::{Error, Result};
use crate::model::task::DATE_FORMAT;
use crate::model::Task;

/// Column order shared with the importer.
pub const HEADERS: [&str; 7] = [
    "ID",
    "Name",
    "Start",
    "End",
    "Progress",
    "Dependencies",
    "Remark",
];

/// Write tasks as semicolon-delimited CSV, one row per task in table order.
/// Dependencies are a comma-separated list of ids.
pub fn write_csv<W: std::io::Write>(tasks: &[Task], out: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(out);

    wtr.write_record(HEADERS)?;
    for task in tasks {
        let deps = task
            .dependencies
            .iter()
            .map(|d| d.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let start = task.start.format(DATE_FORMAT).to_string();
        let end = task.end.format(DATE_FORMAT).to_string();
        let progress = task.progress.to_string();
        wtr.write_record([
            task.id.as_str(),
            task.name.as_str(),
            start.as_str(),
            end.as_str(),
            progress.as_str(),
            deps.as_str(),
            task.remark.as_deref().unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render tasks as a CSV string.
pub fn export_csv_string(tasks: &[Task]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(tasks, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Export tasks to a CSV file. Returns the number of tasks written.
pub fn export_csv(tasks: &[Task], path: &Path) -> Result<usize> {
    if tasks.is_empty() {
        return Err(Error::EmptyProject);
    }
    let file = std::fs::File::create(path)?;
    write_csv(tasks, file)?;
    info!("exported {} tasks to {}", tasks.len(), path.display());
    Ok(tasks.len())
}
