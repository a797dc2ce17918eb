pub mod dependency;
pub mod store;
pub mod task;
pub mod timeline;

pub use dependency::DependencyView;
pub use store::{Snapshot, TaskStore};
pub use task::{Task, TaskId, TaskPatch};
pub use timeline::{TimelineViewport, ViewMode};
