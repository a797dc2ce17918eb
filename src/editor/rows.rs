//! Row selection and the structural edits of the task table: add, insert
//! above/below the selection, delete the selection, drag-reorder.

use chrono::NaiveDate;
use log::debug;

use crate::model::{Task, TaskId, TaskStore};

/// Where a new row goes relative to the selected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Above,
    Below,
}

/// Tracks the selected row by task id, never by index.
#[derive(Debug, Clone, Default)]
pub struct RowController {
    selected: Option<TaskId>,
}

impl RowController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, id: TaskId) {
        self.selected = Some(id);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// The selected task id, if it still exists in `store`.
    pub fn selected<'a>(&self, store: &'a TaskStore) -> Option<&'a Task> {
        self.selected.as_ref().and_then(|id| store.get(id))
    }

    pub fn selected_id(&self, store: &TaskStore) -> Option<TaskId> {
        self.selected(store).map(|t| t.id.clone())
    }

    /// Current row index of the selected task.
    pub fn selected_index(&self, store: &TaskStore) -> Option<usize> {
        self.selected.as_ref().and_then(|id| store.index_of(id))
    }

    /// Whether insert/delete controls should be enabled.
    pub fn has_selection(&self, store: &TaskStore) -> bool {
        self.selected_index(store).is_some()
    }

    pub fn is_selected(&self, id: &TaskId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    /// Forget a selection whose task no longer exists.
    pub fn prune(&mut self, store: &TaskStore) {
        if self.selected.is_some() && !self.has_selection(store) {
            self.selected = None;
        }
    }

    /// Append a fresh task.
    pub fn add_task(&mut self, store: &mut TaskStore) -> TaskId {
        self.add_task_on(store, chrono::Local::now().date_naive())
    }

    pub fn add_task_on(&mut self, store: &mut TaskStore, today: NaiveDate) -> TaskId {
        store.create_task_on(None, today).id
    }

    /// Insert a fresh task directly above or below the selected row. Does
    /// nothing without a selection.
    pub fn insert_relative_to_selection(
        &mut self,
        store: &mut TaskStore,
        placement: Placement,
    ) -> Option<TaskId> {
        self.insert_relative_on(store, placement, chrono::Local::now().date_naive())
    }

    pub fn insert_relative_on(
        &mut self,
        store: &mut TaskStore,
        placement: Placement,
        today: NaiveDate,
    ) -> Option<TaskId> {
        let Some(index) = self.selected_index(store) else {
            debug!("insert {placement:?} ignored: nothing selected");
            return None;
        };
        let at = match placement {
            Placement::Above => index,
            Placement::Below => index + 1,
        };
        let task = store.new_task_on(None, today);
        let id = task.id.clone();
        store.insert_at(at, task).then_some(id)
    }

    /// Delete the selected task and clear the selection. Does nothing
    /// without a selection.
    pub fn delete_selected(&mut self, store: &mut TaskStore) -> Option<Task> {
        let Some(id) = self.selected_id(store) else {
            debug!("delete ignored: nothing selected");
            self.selected = None;
            return None;
        };
        self.selected = None;
        store.delete_task(&id)
    }

    /// Delete any task, clearing the selection if it pointed at it.
    pub fn delete(&mut self, store: &mut TaskStore, id: &TaskId) -> Option<Task> {
        if self.is_selected(id) {
            self.selected = None;
        }
        store.delete_task(id)
    }

    /// Move `dragged` to the row currently occupied by `target`.
    pub fn handle_reorder(&mut self, store: &mut TaskStore, dragged: &TaskId, target: &TaskId) -> bool {
        if dragged == target {
            return false;
        }
        match (store.index_of(dragged), store.index_of(target)) {
            (Some(from), Some(to)) => store.reorder(from, to),
            _ => {
                debug!("reorder ignored: `{dragged}` or `{target}` not found");
                false
            }
        }
    }
}
