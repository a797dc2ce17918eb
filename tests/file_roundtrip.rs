use chrono::NaiveDate;
use gantt_editor::io::{self, csv_export, csv_import};
use gantt_editor::model::dependency::add_dependency;
use gantt_editor::model::{TaskId, TaskPatch, TaskStore};
use gantt_editor::Error;
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_store() -> TaskStore {
    let mut store = TaskStore::new();
    let a = store.create_task_on(Some("Research"), date(2025, 1, 6)).id;
    let b = store.create_task_on(Some("Design; v2"), date(2025, 1, 8)).id;
    let c = store.create_task_on(None, date(2025, 1, 12)).id;
    store.update_task(
        &a,
        TaskPatch::default()
            .with_progress(100)
            .with_remark(Some("done early".into())),
    );
    store.update_task(
        &b,
        TaskPatch::default().with_dates(date(2025, 1, 8), date(2025, 1, 15)),
    );
    add_dependency(&mut store, &b, &a);
    add_dependency(&mut store, &c, &a);
    add_dependency(&mut store, &c, &b);
    store
}

#[test]
fn json_export_then_import_is_identity() {
    let store = sample_store();
    let json = io::export_tasks(store.tasks()).unwrap();
    let imported = io::import_tasks(&json).unwrap();
    assert_eq!(imported, store.tasks());
}

#[test]
fn json_import_drops_renderer_fields() {
    let json = r#"[
        {"id": "a", "name": "A", "start": "2025-02-01 09:30", "end": "2025-02-03",
         "progress": 33.4, "dependencies": "", "_start": 123, "_index": 0,
         "custom_class": "bar-milestone"},
        {"id": "b", "name": "B", "start": "2025-02-04", "end": "2025-02-06",
         "progress": 250, "dependencies": "a, missing, b"}
    ]"#;
    let tasks = io::import_tasks(json).unwrap();

    assert_eq!(tasks[0].start, date(2025, 2, 1));
    assert_eq!(tasks[0].progress, 33);
    assert!(tasks[0].dependencies.is_empty());
    assert_eq!(tasks[1].progress, 100);
    assert_eq!(tasks[1].dependencies, vec![TaskId::from("a")]);

    let written = io::export_tasks(&tasks).unwrap();
    assert!(!written.contains("_start"));
    assert!(!written.contains("custom_class"));
}

#[test]
fn malformed_json_leaves_the_store_untouched() {
    let mut store = sample_store();
    let before = store.snapshot();

    let result = io::import_tasks("[{\"id\": \"x\", \"start\": ").and_then(|t| store.replace_all(t));
    assert!(matches!(result, Err(Error::Json(_))));

    let duplicate = r#"[{"id": "x", "start": "2025-01-01", "end": "2025-01-02"},
                        {"id": "x", "start": "2025-01-01", "end": "2025-01-02"}]"#;
    let result = io::import_tasks(duplicate).and_then(|t| store.replace_all(t));
    assert!(matches!(result, Err(Error::DuplicateTaskId(_))));

    assert!(before.same_as(&store.snapshot()));
}

#[test]
fn save_and_load_through_a_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plan.json");
    let store = sample_store();

    io::save_tasks(store.tasks(), &path).unwrap();
    let loaded = io::load_tasks(&path).unwrap();

    assert_eq!(loaded, store.tasks());
    let mut reopened = TaskStore::new();
    reopened.replace_all(loaded).unwrap();
    assert_eq!(reopened.len(), 3);
}

#[test]
fn loading_a_missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = io::load_tasks(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn csv_export_then_import_keeps_the_table() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plan.csv");
    let store = sample_store();

    assert_eq!(csv_export::export_csv(store.tasks(), &path).unwrap(), 3);
    let import = csv_import::import_csv(&path).unwrap();

    assert_eq!(import.skipped, 0);
    assert_eq!(import.tasks, store.tasks());
}

#[test]
fn csv_export_of_nothing_is_refused() {
    let dir = TempDir::new().unwrap();
    let err = csv_export::export_csv(&[], &dir.path().join("empty.csv")).unwrap_err();
    assert!(matches!(err, Error::EmptyProject));
}

#[test]
fn svg_export_writes_a_standalone_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gantt.svg");
    let markup = "<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>";

    io::save_svg(markup, &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), markup);
}
