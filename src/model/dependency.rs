//! Set-like editing of a task's dependency list, plus the derived views the
//! dependency column needs.

use std::collections::HashSet;

use log::debug;

use super::store::TaskStore;
use super::task::{Task, TaskId, TaskPatch};

/// The two disjoint halves of the collection as seen from one task, both in
/// collection order.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyView<'a> {
    /// Tasks `target` depends on.
    pub resolved: Vec<&'a Task>,
    /// Every other task that could be added as a dependency.
    pub eligible: Vec<&'a Task>,
}

/// Split `tasks` into `target`'s dependencies and the remaining candidates.
pub fn resolve<'a>(tasks: &'a [Task], target: &Task) -> DependencyView<'a> {
    let mut view = DependencyView {
        resolved: Vec::new(),
        eligible: Vec::new(),
    };
    for task in tasks {
        if task.id == target.id {
            continue;
        }
        if target.depends_on(&task.id) {
            view.resolved.push(task);
        } else {
            view.eligible.push(task);
        }
    }
    view
}

/// Tasks that list `id` among their dependencies.
pub fn dependents_of<'a>(tasks: &'a [Task], id: &TaskId) -> Vec<&'a Task> {
    tasks.iter().filter(|t| t.depends_on(id)).collect()
}

/// Make `task_id` depend on `depends_on`. Idempotent; self links and unknown
/// ids are ignored. Cycles are allowed.
pub fn add_dependency(store: &mut TaskStore, task_id: &TaskId, depends_on: &TaskId) -> bool {
    if task_id == depends_on || !store.contains(depends_on) {
        debug!("add dependency ignored: `{task_id}` -> `{depends_on}`");
        return false;
    }
    let Some(task) = store.get(task_id) else {
        return false;
    };
    if task.depends_on(depends_on) {
        return false;
    }

    let mut deps = task.dependencies.clone();
    deps.push(depends_on.clone());
    store.update_task(task_id, TaskPatch::default().with_dependencies(deps))
}

/// Drop `depends_on` from `task_id`'s dependencies if present.
pub fn remove_dependency(store: &mut TaskStore, task_id: &TaskId, depends_on: &TaskId) -> bool {
    let Some(task) = store.get(task_id) else {
        return false;
    };
    if !task.depends_on(depends_on) {
        return false;
    }

    let deps = task
        .dependencies
        .iter()
        .filter(|d| *d != depends_on)
        .cloned()
        .collect();
    store.update_task(task_id, TaskPatch::default().with_dependencies(deps))
}

/// True if adding `task_id -> depends_on` would close a dependency cycle,
/// i.e. `depends_on` already (transitively) depends on `task_id`.
pub fn would_create_cycle(tasks: &[Task], task_id: &TaskId, depends_on: &TaskId) -> bool {
    if task_id == depends_on {
        return true;
    }
    let mut stack = vec![depends_on];
    let mut visited = HashSet::new();
    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        let Some(task) = tasks.iter().find(|t| &t.id == current) else {
            continue;
        };
        for dep in &task.dependencies {
            if dep == task_id {
                return true;
            }
            stack.push(dep);
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn store_with(names: &[&str]) -> (TaskStore, Vec<TaskId>) {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut store = TaskStore::new();
        let ids = names
            .iter()
            .map(|n| store.create_task_on(Some(n), today).id)
            .collect();
        (store, ids)
    }

    #[test]
    fn resolve_splits_in_collection_order() {
        let (mut store, ids) = store_with(&["A", "B", "C", "D"]);
        add_dependency(&mut store, &ids[0], &ids[3]);
        add_dependency(&mut store, &ids[0], &ids[1]);

        let target = store.get(&ids[0]).unwrap().clone();
        let view = resolve(store.tasks(), &target);
        let resolved: Vec<_> = view.resolved.iter().map(|t| t.name.as_str()).collect();
        let eligible: Vec<_> = view.eligible.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(resolved, ["B", "D"]);
        assert_eq!(eligible, ["C"]);
    }

    #[test]
    fn add_is_idempotent_and_rejects_self() {
        let (mut store, ids) = store_with(&["A", "B"]);
        assert!(add_dependency(&mut store, &ids[0], &ids[1]));
        assert!(!add_dependency(&mut store, &ids[0], &ids[1]));
        assert!(!add_dependency(&mut store, &ids[0], &ids[0]));
        assert!(!add_dependency(&mut store, &ids[0], &TaskId::from("nope")));
        assert_eq!(store.get(&ids[0]).unwrap().dependencies.len(), 1);
    }

    #[test]
    fn remove_only_when_present() {
        let (mut store, ids) = store_with(&["A", "B"]);
        add_dependency(&mut store, &ids[0], &ids[1]);
        assert!(remove_dependency(&mut store, &ids[0], &ids[1]));
        assert!(!remove_dependency(&mut store, &ids[0], &ids[1]));
        assert!(store.get(&ids[0]).unwrap().dependencies.is_empty());
    }

    #[test]
    fn cycles_are_detected_but_allowed() {
        let (mut store, ids) = store_with(&["A", "B", "C"]);
        add_dependency(&mut store, &ids[1], &ids[0]);
        add_dependency(&mut store, &ids[2], &ids[1]);

        assert!(would_create_cycle(store.tasks(), &ids[0], &ids[2]));
        assert!(!would_create_cycle(store.tasks(), &ids[2], &ids[0]));
        assert!(add_dependency(&mut store, &ids[0], &ids[2]));
        assert_eq!(dependents_of(store.tasks(), &ids[0]).len(), 1);
    }
}
