use chrono::NaiveDate;
use gantt_editor::editor::{Placement, RowController};
use gantt_editor::model::dependency::add_dependency;
use gantt_editor::model::{TaskId, TaskStore};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
}

fn store_with(names: &[&str]) -> (TaskStore, Vec<TaskId>) {
    let mut store = TaskStore::new();
    let ids = names
        .iter()
        .map(|name| store.create_task_on(Some(name), today()).id)
        .collect();
    (store, ids)
}

fn names(store: &TaskStore) -> Vec<&str> {
    store.tasks().iter().map(|t| t.name.as_str()).collect()
}

#[test]
fn row_operations_need_a_selection() {
    let (mut store, _) = store_with(&["A", "B"]);
    let mut rows = RowController::new();
    let revision = store.revision();

    assert!(!rows.has_selection(&store));
    assert!(rows.insert_relative_on(&mut store, Placement::Above, today()).is_none());
    assert!(rows.insert_relative_on(&mut store, Placement::Below, today()).is_none());
    assert!(rows.delete_selected(&mut store).is_none());
    assert_eq!(store.revision(), revision);
}

#[test]
fn insert_below_lands_after_the_selected_row() {
    let (mut store, ids) = store_with(&["A", "B", "C"]);
    let mut rows = RowController::new();
    rows.select(ids[1].clone());

    let new_id = rows
        .insert_relative_on(&mut store, Placement::Below, today())
        .unwrap();

    assert_eq!(store.index_of(&new_id), Some(2));
    assert_eq!(names(&store), ["A", "B", "", "C"]);
    assert_eq!(rows.selected_index(&store), Some(1));
}

#[test]
fn insert_above_the_first_row() {
    let (mut store, ids) = store_with(&["A"]);
    let mut rows = RowController::new();
    rows.select(ids[0].clone());

    let new_id = rows
        .insert_relative_on(&mut store, Placement::Above, today())
        .unwrap();

    assert_eq!(store.index_of(&new_id), Some(0));
    assert_eq!(rows.selected_index(&store), Some(1));
}

#[test]
fn delete_selected_clears_selection_and_prunes_references() {
    let (mut store, ids) = store_with(&["A", "B"]);
    assert!(add_dependency(&mut store, &ids[1], &ids[0]));

    let mut rows = RowController::new();
    rows.select(ids[0].clone());
    let removed = rows.delete_selected(&mut store).unwrap();

    assert_eq!(removed.name, "A");
    assert!(!rows.has_selection(&store));
    assert_eq!(names(&store), ["B"]);
    assert!(store.tasks()[0].dependencies.is_empty());
}

#[test]
fn selection_of_a_deleted_task_reads_as_nothing() {
    let (mut store, ids) = store_with(&["A", "B"]);
    let mut rows = RowController::new();
    rows.select(ids[0].clone());

    store.delete_task(&ids[0]);

    assert!(rows.selected(&store).is_none());
    assert!(rows.insert_relative_on(&mut store, Placement::Below, today()).is_none());
    assert_eq!(store.len(), 1);
}

#[test]
fn dropping_a_row_onto_another_moves_it_there() {
    let (mut store, ids) = store_with(&["A", "B", "C", "D"]);
    let mut rows = RowController::new();

    assert!(rows.handle_reorder(&mut store, &ids[0], &ids[2]));
    assert_eq!(names(&store), ["B", "C", "A", "D"]);

    assert!(rows.handle_reorder(&mut store, &ids[3], &ids[1]));
    assert_eq!(names(&store), ["D", "B", "C", "A"]);
}

#[test]
fn dropping_a_row_onto_itself_or_a_stranger_does_nothing() {
    let (mut store, ids) = store_with(&["A", "B"]);
    let mut rows = RowController::new();
    let revision = store.revision();

    assert!(!rows.handle_reorder(&mut store, &ids[0], &ids[0]));
    assert!(!rows.handle_reorder(&mut store, &ids[0], &TaskId::from("nope")));
    assert_eq!(store.revision(), revision);
}
