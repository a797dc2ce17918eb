//! Keeps a timeline renderer in step with the task store.
//!
//! Store → renderer: `sync` pushes the full task list whenever the store's
//! snapshot changed since the last push. Renderer → store: drag callbacks
//! arrive as [`TimelineEvent`]s and become exactly one `update_task` each.
//! Pushing never calls back into the store.

use chrono::NaiveDateTime;
use log::debug;

use crate::model::task::progress_from_f64;
use crate::model::{Snapshot, Task, TaskId, TaskPatch, TaskStore, ViewMode};

/// The operations a timeline renderer exposes to the rest of the app.
pub trait TimelineRenderer {
    /// Replace the render input with `tasks` and redraw everything.
    fn refresh(&mut self, tasks: &[Task]);

    /// Switch the time-axis granularity.
    fn change_view_mode(&mut self, mode: ViewMode);

    /// Markup of what is currently rendered.
    fn serialize_current_view(&self) -> String;
}

/// A callback from the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    /// A bar was moved or resized.
    DateChange {
        task_id: TaskId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// A bar's progress handle was dragged.
    ProgressChange { task_id: TaskId, progress: f64 },
}

pub struct TimelineBridge<R> {
    renderer: R,
    last_pushed: Option<Snapshot>,
    view_mode: ViewMode,
}

impl<R: TimelineRenderer> TimelineBridge<R> {
    pub fn new(mut renderer: R, view_mode: ViewMode) -> Self {
        renderer.change_view_mode(view_mode);
        Self {
            renderer,
            last_pushed: None,
            view_mode,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable access for drawing. Callers must route the renderer's
    /// callbacks back through [`TimelineBridge::handle`].
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Push the store's tasks if its snapshot changed since the last push.
    /// Returns whether the renderer was refreshed.
    pub fn sync(&mut self, store: &TaskStore) -> bool {
        let snapshot = store.snapshot();
        if let Some(last) = &self.last_pushed {
            if last.same_as(&snapshot) {
                return false;
            }
        }
        debug!("timeline refresh at revision {}", snapshot.revision());
        self.renderer.refresh(snapshot.tasks());
        self.last_pushed = Some(snapshot);
        true
    }

    /// Apply a renderer callback to the store.
    ///
    /// The next `sync` always re-pushes, so whatever the renderer previewed
    /// during the drag is replaced by the canonical state.
    pub fn handle(&mut self, store: &mut TaskStore, event: TimelineEvent) -> bool {
        self.last_pushed = None;
        match event {
            TimelineEvent::DateChange { task_id, start, end } => {
                let patch = TaskPatch::default().with_dates(start.date(), end.date());
                store.update_task(&task_id, patch)
            }
            TimelineEvent::ProgressChange { task_id, progress } => {
                let patch = TaskPatch::default().with_progress(progress_from_f64(progress) as i64);
                store.update_task(&task_id, patch)
            }
        }
    }

    pub fn on_date_change(
        &mut self,
        store: &mut TaskStore,
        task_id: TaskId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> bool {
        self.handle(store, TimelineEvent::DateChange { task_id, start, end })
    }

    pub fn on_progress_change(&mut self, store: &mut TaskStore, task_id: TaskId, progress: f64) -> bool {
        self.handle(store, TimelineEvent::ProgressChange { task_id, progress })
    }

    /// Forward a granularity change to the renderer. The store is untouched.
    pub fn change_view_mode(&mut self, mode: ViewMode) {
        if mode == self.view_mode {
            return;
        }
        self.view_mode = mode;
        self.renderer.change_view_mode(mode);
    }

    /// A point-in-time capture of the current render.
    pub fn export_svg(&self) -> String {
        self.renderer.serialize_current_view()
    }
}
