//! The canonical ordered task collection.
//!
//! Every mutation installs a fresh [`Snapshot`]; views compare snapshots by
//! identity to decide whether to redraw. Mutations against unknown ids are
//! silent no-ops.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, warn};

use super::task::{Task, TaskId, TaskPatch};
use crate::error::{Error, Result};
use crate::sync::observer::{Observers, Subscription};

/// An immutable point-in-time value of the task collection.
#[derive(Debug, Clone)]
pub struct Snapshot {
    tasks: Arc<Vec<Task>>,
    revision: u64,
}

impl Snapshot {
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Monotonically increasing per store; bumped by every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True if both values are the very same snapshot.
    pub fn same_as(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.tasks, &other.tasks)
    }
}

/// Owner of the task collection and its single mutation entrypoint.
pub struct TaskStore {
    current: Snapshot,
    observers: Observers<Snapshot>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            current: Snapshot {
                tasks: Arc::new(Vec::new()),
                revision: 0,
            },
            observers: Observers::new(),
        }
    }

    /// A store seeded with `tasks`, validated like an import.
    pub fn with_tasks(tasks: Vec<Task>) -> Result<Self> {
        let mut store = Self::new();
        store.replace_all(tasks)?;
        Ok(store)
    }

    // ── Reads ───────────────────────────────────────────────────

    pub fn snapshot(&self) -> Snapshot {
        self.current.clone()
    }

    pub fn tasks(&self) -> &[Task] {
        self.current.tasks()
    }

    pub fn revision(&self) -> u64 {
        self.current.revision
    }

    pub fn len(&self) -> usize {
        self.tasks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks().is_empty()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks().iter().find(|t| &t.id == id)
    }

    pub fn index_of(&self, id: &TaskId) -> Option<usize> {
        self.tasks().iter().position(|t| &t.id == id)
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.index_of(id).is_some()
    }

    /// Register a listener for every new snapshot.
    pub fn subscribe(&self, listener: impl FnMut(&Snapshot) + 'static) -> Subscription {
        self.observers.subscribe(listener)
    }

    // ── Mutations ───────────────────────────────────────────────

    /// Append a default task starting today.
    pub fn create_task(&mut self, name: Option<&str>) -> Task {
        self.create_task_on(name, chrono::Local::now().date_naive())
    }

    /// Append a default task starting on `today`.
    pub fn create_task_on(&mut self, name: Option<&str>, today: NaiveDate) -> Task {
        let task = self.new_task_on(name, today);
        let mut tasks = self.tasks().to_vec();
        tasks.push(task.clone());
        self.commit(tasks, "create");
        task
    }

    /// A detached default task whose id is unused in this store.
    pub fn new_task_on(&self, name: Option<&str>, today: NaiveDate) -> Task {
        let mut task = Task::new_on(name.unwrap_or_default(), today);
        while self.contains(&task.id) {
            task.id = TaskId::generate();
        }
        task
    }

    /// Merge `patch` into the task with `id`. Returns whether a new snapshot
    /// was produced.
    pub fn update_task(&mut self, id: &TaskId, patch: TaskPatch) -> bool {
        let Some(index) = self.index_of(id) else {
            debug!("update ignored: no task `{id}`");
            return false;
        };

        let mut next = patch.applied_to(&self.tasks()[index]);
        if patch.dependencies.is_some() {
            next.dependencies = self.sanitize_dependencies(id, &next.dependencies);
        }
        if next == self.tasks()[index] {
            return false;
        }

        let mut tasks = self.tasks().to_vec();
        tasks[index] = next;
        self.commit(tasks, "update");
        true
    }

    /// Remove the task and prune it from every dependency list.
    pub fn delete_task(&mut self, id: &TaskId) -> Option<Task> {
        let Some(index) = self.index_of(id) else {
            debug!("delete ignored: no task `{id}`");
            return None;
        };

        let mut tasks = self.tasks().to_vec();
        let removed = tasks.remove(index);
        for task in tasks.iter_mut() {
            task.dependencies.retain(|dep| dep != id);
        }
        self.commit(tasks, "delete");
        Some(removed)
    }

    /// Move the task at `from` to position `to`; the other tasks keep their
    /// relative order.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.len();
        if from >= len || to >= len {
            debug!("reorder ignored: {from} -> {to} out of bounds (len {len})");
            return false;
        }
        if from == to {
            return false;
        }

        let mut tasks = self.tasks().to_vec();
        let moved = tasks.remove(from);
        tasks.insert(to, moved);
        self.commit(tasks, "reorder");
        true
    }

    /// Insert `task` at `index` (clamped to the collection length). A task
    /// whose id is already present is rejected.
    pub fn insert_at(&mut self, index: usize, mut task: Task) -> bool {
        if task.id.is_empty() || self.contains(&task.id) {
            warn!("insert rejected: task id `{}` is empty or already in use", task.id);
            return false;
        }

        task.dependencies = self.sanitize_dependencies(&task.id, &task.dependencies);
        let mut tasks = self.tasks().to_vec();
        let index = index.min(tasks.len());
        tasks.insert(index, task);
        self.commit(tasks, "insert");
        true
    }

    /// Replace the whole collection. Fails without touching the store if
    /// ids are empty or duplicated; self and dangling dependencies are pruned.
    pub fn replace_all(&mut self, tasks: Vec<Task>) -> Result<()> {
        let tasks = normalize_collection(tasks)?;
        self.commit(tasks, "replace");
        Ok(())
    }

    fn sanitize_dependencies(&self, owner: &TaskId, deps: &[TaskId]) -> Vec<TaskId> {
        let mut seen = HashSet::new();
        deps.iter()
            .filter(|dep| *dep != owner && self.contains(dep))
            .filter(|dep| seen.insert((*dep).clone()))
            .cloned()
            .collect()
    }

    fn commit(&mut self, tasks: Vec<Task>, op: &str) {
        self.current = Snapshot {
            tasks: Arc::new(tasks),
            revision: self.current.revision + 1,
        };
        debug!(
            "{op}: revision {} ({} tasks)",
            self.current.revision,
            self.current.tasks.len()
        );
        self.observers.notify(&self.current);
    }
}

/// Check id uniqueness and prune self, dangling and duplicate dependencies.
pub fn normalize_collection(mut tasks: Vec<Task>) -> Result<Vec<Task>> {
    let mut ids = HashSet::new();
    for (position, task) in tasks.iter().enumerate() {
        if task.id.is_empty() {
            return Err(Error::EmptyTaskId(position));
        }
        if !ids.insert(task.id.clone()) {
            return Err(Error::DuplicateTaskId(task.id.clone()));
        }
    }

    for task in tasks.iter_mut() {
        let before = task.dependencies.len();
        let mut seen = HashSet::new();
        let own = task.id.clone();
        task.dependencies
            .retain(|dep| *dep != own && ids.contains(dep) && seen.insert(dep.clone()));
        if task.dependencies.len() != before {
            warn!(
                "pruned {} invalid dependency reference(s) from task `{}`",
                before - task.dependencies.len(),
                task.id
            );
        }
    }
    Ok(tasks)
}
