pub mod csv_export;
pub mod csv_import;
pub mod file;
pub mod svg;

pub use file::{export_tasks, import_tasks, load_tasks, save_svg, save_tasks};
