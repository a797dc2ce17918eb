pub mod cells;
pub mod rows;

pub use cells::{DateRangeCell, DependencyTags, ProgressCell, TextCell, TextField};
pub use rows::{Placement, RowController};
