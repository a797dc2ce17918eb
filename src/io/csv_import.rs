use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use log::{info, warn};

use crate::error::{Error, Result};
use crate::model::store::normalize_collection;
use crate::model::task::progress_from_f64;
use crate::model::{Task, TaskId};

/// Tasks read from a CSV file plus the number of rejected rows.
#[derive(Debug, Clone)]
pub struct CsvImport {
    pub tasks: Vec<Task>,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    Id,
    Name,
    Start,
    End,
    Progress,
    Dependencies,
    Remark,
}

/// Map a progress cell to a percentage: either a number or a status word.
fn parse_progress(s: &str) -> u8 {
    let s = s.trim().trim_end_matches('%');
    if let Ok(value) = s.parse::<f64>() {
        return progress_from_f64(value);
    }
    match s.to_lowercase().as_str() {
        "finished" | "done" | "complete" | "completed" => 100,
        "in progress" | "in-progress" | "active" | "started" => 50,
        "released" | "planned" => 25,
        _ => 0,
    }
}

/// Try parsing a date string with several common formats.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_'], "")
}

fn header_to_column(normalized: &str) -> Option<Column> {
    match normalized {
        "id" | "taskid" | "key" | "uid" => Some(Column::Id),
        "name" | "task" | "tasklabel" | "taskname" | "label" | "title" | "activity" => {
            Some(Column::Name)
        }
        "start" | "startdate" | "from" | "begin" | "begindate" => Some(Column::Start),
        "end" | "enddate" | "to" | "finish" | "finishdate" | "due" | "duedate" => Some(Column::End),
        "progress" | "status" | "state" | "done" | "complete" | "percentcomplete" => {
            Some(Column::Progress)
        }
        "dependencies" | "dependson" | "predecessors" | "deps" => Some(Column::Dependencies),
        "remark" | "remarks" | "notes" | "note" | "comment" | "comments" | "description" => {
            Some(Column::Remark)
        }
        _ => None,
    }
}

struct Row {
    task: Task,
    dependencies: Vec<String>,
}

/// Parse CSV text into tasks.
///
/// Auto-detects the delimiter and matches headers flexibly. Rows with
/// neither a name nor an id, or with unparseable dates, are skipped.
/// Dependencies may name other rows by id or, failing that, by task name.
/// Names and remarks are kept verbatim, surrounding spaces included.
pub fn import_csv_str(content: &str) -> Result<CsvImport> {
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let columns: Vec<Option<Column>> = headers
        .iter()
        .map(|h| header_to_column(&normalize_header(h)))
        .collect();

    let has = |c: Column| columns.contains(&Some(c));
    if !has(Column::Name) || !has(Column::Start) || !has(Column::End) {
        return Err(Error::MissingColumns {
            found: headers.iter().map(str::to_string).collect(),
        });
    }

    let mut rows: Vec<Row> = Vec::new();
    let mut skipped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let line = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping CSV row {line}: {e}");
                skipped += 1;
                continue;
            }
        };

        let mut fields: HashMap<Column, &str> = HashMap::new();
        for (idx, field) in record.iter().enumerate() {
            if let Some(Some(column)) = columns.get(idx) {
                fields.entry(*column).or_insert(field);
            }
        }
        let field = |c: Column| fields.get(&c).copied().unwrap_or("");

        let name = field(Column::Name);
        let id = field(Column::Id).trim();
        // Unnamed rows are kept only when they carry an id
        if name.trim().is_empty() && id.is_empty() {
            skipped += 1;
            continue;
        }
        let (Some(start), Some(end)) = (parse_date(field(Column::Start)), parse_date(field(Column::End))) else {
            warn!(
                "skipping CSV row {line}: invalid dates '{}' / '{}'",
                field(Column::Start),
                field(Column::End)
            );
            skipped += 1;
            continue;
        };

        let mut task = Task::new(name, start, end);
        if !id.is_empty() {
            task.id = TaskId::from(id);
        }
        task.progress = parse_progress(field(Column::Progress));
        let remark = field(Column::Remark);
        task.remark = (!remark.is_empty()).then(|| remark.to_string());

        let dependencies = field(Column::Dependencies)
            .split([',', '|'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        rows.push(Row { task, dependencies });
    }

    if rows.is_empty() {
        return Err(Error::NoValidRows { skipped });
    }

    // Second pass: resolve dependency references by id, then by name.
    let ids: HashMap<String, TaskId> = rows
        .iter()
        .map(|r| (r.task.id.as_str().to_string(), r.task.id.clone()))
        .collect();
    let names: HashMap<String, TaskId> = rows
        .iter()
        .map(|r| (r.task.name.to_lowercase(), r.task.id.clone()))
        .collect();

    let mut tasks = Vec::with_capacity(rows.len());
    for Row { mut task, dependencies } in rows {
        for reference in dependencies {
            match ids
                .get(&reference)
                .or_else(|| names.get(&reference.to_lowercase()))
            {
                Some(dep) => task.dependencies.push(dep.clone()),
                None => warn!("dependency '{reference}' of '{}' not found", task.name),
            }
        }
        tasks.push(task);
    }

    let tasks = normalize_collection(tasks)?;
    Ok(CsvImport { tasks, skipped })
}

/// Import tasks from a CSV file.
pub fn import_csv(path: &Path) -> Result<CsvImport> {
    let content = std::fs::read_to_string(path)?;
    let import = import_csv_str(&content)?;
    info!(
        "imported {} tasks from {} ({} rows skipped)",
        import.tasks.len(),
        path.display(),
        import.skipped
    );
    Ok(import)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_comma_file_with_loose_headers() {
        let csv = "Task Label,Start Date,End Date,Status,Notes\n\
                   Kickoff,01/02/2024,03/02/2024,Finished,\n\
                   Design,2024-02-04,2024-02-10,In Progress,needs review\n\
                   ,2024-02-04,2024-02-10,,\n\
                   Broken,someday,2024-02-10,,\n";
        let import = import_csv_str(csv).unwrap();
        assert_eq!(import.skipped, 2);
        assert_eq!(import.tasks.len(), 2);
        assert_eq!(import.tasks[0].progress, 100);
        assert_eq!(import.tasks[0].start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(import.tasks[1].progress, 50);
        assert_eq!(import.tasks[1].remark.as_deref(), Some("needs review"));
    }

    #[test]
    fn resolves_dependencies_by_name() {
        let csv = "Name;Start;End;Dependencies\n\
                   Plan;2024-01-01;2024-01-02;\n\
                   Build;2024-01-03;2024-01-09;plan\n";
        let import = import_csv_str(csv).unwrap();
        assert_eq!(import.tasks[1].dependencies, vec![import.tasks[0].id.clone()]);
    }

    #[test]
    fn keeps_padding_in_names_and_remarks() {
        let csv = "Id;Name;Start;End;Progress;Dependencies;Remark\n\
                   a; Plan ; 2024-01-01 ;2024-01-02 ; 40 ;;  indented note\n\
                   b;Build;2024-01-03;2024-01-09;;  a ;\n";
        let import = import_csv_str(csv).unwrap();
        let plan = &import.tasks[0];
        assert_eq!(plan.name, " Plan ");
        assert_eq!(plan.remark.as_deref(), Some("  indented note"));
        assert_eq!(plan.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(plan.progress, 40);
        assert_eq!(import.tasks[1].dependencies, vec![TaskId::from("a")]);
    }

    #[test]
    fn padded_values_survive_export_and_import() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let mut task = Task::new("  leading and trailing  ", start, start);
        task.remark = Some(" see notes ".into());

        let csv = crate::io::csv_export::export_csv_string(std::slice::from_ref(&task)).unwrap();
        let import = import_csv_str(&csv).unwrap();
        assert_eq!(import.tasks, vec![task]);
    }

    #[test]
    fn missing_columns_is_an_error() {
        let err = import_csv_str("Name;Owner\nPlan;me\n").unwrap_err();
        assert!(matches!(err, Error::MissingColumns { .. }));
    }
}
