use std::collections::HashSet;

use chrono::NaiveDate;
use gantt_editor::editor::{Placement, RowController};
use gantt_editor::model::dependency::add_dependency;
use gantt_editor::model::{TaskId, TaskPatch, TaskStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

fn ids(store: &TaskStore) -> Vec<TaskId> {
    store.tasks().iter().map(|t| t.id.clone()).collect()
}

fn assert_unique_ids(store: &TaskStore) {
    let all = ids(store);
    let unique: HashSet<_> = all.iter().collect();
    assert_eq!(unique.len(), all.len(), "duplicate ids in {all:?}");
}

fn assert_references_resolve(store: &TaskStore) {
    for task in store.tasks() {
        for dep in &task.dependencies {
            assert!(store.contains(dep), "{} depends on missing {dep}", task.id);
            assert_ne!(dep, &task.id, "{} depends on itself", task.id);
        }
    }
}

#[test]
fn ids_stay_unique_under_random_edits() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rng = StdRng::seed_from_u64(0x6a77);
    let mut store = TaskStore::new();
    let mut rows = RowController::new();

    for _ in 0..400 {
        let len = store.len();
        match rng.random_range(0..7) {
            0 => {
                store.create_task_on(None, today());
            }
            1 if len > 0 => {
                let id = store.tasks()[rng.random_range(0..len)].id.clone();
                store.delete_task(&id);
            }
            2 if len > 1 => {
                store.reorder(rng.random_range(0..len), rng.random_range(0..len));
            }
            3 if len > 0 => {
                let id = store.tasks()[rng.random_range(0..len)].id.clone();
                let patch = TaskPatch::default()
                    .with_progress(rng.random_range(-50..200))
                    .with_name(format!("task {}", rng.random_range(0..100)));
                store.update_task(&id, patch);
            }
            4 if len > 1 => {
                let a = store.tasks()[rng.random_range(0..len)].id.clone();
                let b = store.tasks()[rng.random_range(0..len)].id.clone();
                add_dependency(&mut store, &a, &b);
            }
            5 if len > 0 => {
                let id = store.tasks()[rng.random_range(0..len)].id.clone();
                rows.select(id);
                let placement = if rng.random_bool(0.5) {
                    Placement::Above
                } else {
                    Placement::Below
                };
                rows.insert_relative_on(&mut store, placement, today());
            }
            _ => {
                rows.delete_selected(&mut store);
            }
        }

        assert_unique_ids(&store);
        assert_references_resolve(&store);
        for task in store.tasks() {
            assert!(task.progress <= 100);
        }
    }
}

#[test]
fn reorder_preserves_count_and_id_set() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut store = TaskStore::new();
    for _ in 0..12 {
        store.create_task_on(None, today());
    }
    let before: HashSet<_> = ids(&store).into_iter().collect();

    for _ in 0..50 {
        store.reorder(rng.random_range(0..12), rng.random_range(0..12));
        let after: HashSet<_> = ids(&store).into_iter().collect();
        assert_eq!(store.len(), 12);
        assert_eq!(after, before);
    }
}

#[test]
fn deleting_a_task_removes_it_from_every_dependency_list() {
    let mut store = TaskStore::new();
    let a = store.create_task_on(Some("A"), today()).id;
    let b = store.create_task_on(Some("B"), today()).id;
    let c = store.create_task_on(Some("C"), today()).id;
    assert!(add_dependency(&mut store, &b, &a));
    assert!(add_dependency(&mut store, &c, &a));
    assert!(add_dependency(&mut store, &c, &b));

    store.delete_task(&a);

    assert!(store.get(&b).unwrap().dependencies.is_empty());
    assert_eq!(store.get(&c).unwrap().dependencies, vec![b]);
}

#[test]
fn adding_the_same_dependency_twice_is_idempotent() {
    let mut store = TaskStore::new();
    let a = store.create_task_on(Some("A"), today()).id;
    let b = store.create_task_on(Some("B"), today()).id;

    assert!(add_dependency(&mut store, &b, &a));
    let revision = store.revision();
    assert!(!add_dependency(&mut store, &b, &a));

    assert_eq!(store.revision(), revision);
    assert_eq!(store.get(&b).unwrap().dependencies, vec![a]);
}

#[test]
fn progress_is_clamped_on_update() {
    let mut store = TaskStore::new();
    let id = store.create_task_on(None, today()).id;

    store.update_task(&id, TaskPatch::default().with_progress(150));
    assert_eq!(store.get(&id).unwrap().progress, 100);

    store.update_task(&id, TaskPatch::default().with_progress(-5));
    assert_eq!(store.get(&id).unwrap().progress, 0);
}

#[test]
fn insert_above_selection_after_create() {
    let mut store = TaskStore::new();
    let a = store.create_task_on(Some("A"), today()).id;
    let created = store.create_task_on(None, today()).id;

    let mut rows = RowController::new();
    rows.select(a.clone());
    let inserted = rows
        .insert_relative_on(&mut store, Placement::Above, today())
        .unwrap();

    let order = ids(&store);
    assert_eq!(order[..2], [inserted.clone(), a.clone()]);
    assert_eq!(order[2], created);
    assert_unique_ids(&store);
    assert!(store.get(&a).unwrap().dependencies.is_empty());
    // Selection stays on the original row
    assert_eq!(rows.selected_id(&store), Some(a));
}

#[test]
fn new_tasks_span_one_day_from_today() {
    let mut store = TaskStore::new();
    let task = store.create_task_on(None, today());
    assert_eq!(task.start, today());
    assert_eq!(task.end, NaiveDate::from_ymd_opt(2025, 3, 11).unwrap());
    assert_eq!(task.progress, 0);
    assert_eq!(task.display_name(), "Unnamed");
}

#[test]
fn unknown_ids_are_silent_no_ops() {
    let mut store = TaskStore::new();
    store.create_task_on(None, today());
    let revision = store.revision();
    let ghost = TaskId::from("ghost");

    assert!(!store.update_task(&ghost, TaskPatch::default().with_progress(10)));
    assert!(store.delete_task(&ghost).is_none());
    assert!(!add_dependency(&mut store, &ghost, &ghost));
    assert_eq!(store.revision(), revision);
}
