//! Core of the Gantt task editor: the task store, dependency editing, row
//! operations, cell commit rules and the bridge that keeps a timeline
//! renderer in sync with the table.

pub mod config;
pub mod editor;
pub mod error;
pub mod io;
pub mod logging;
pub mod model;
pub mod sync;

pub use error::{Error, Result};
