#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod ui;

use gantt_editor::config::Settings;

fn main() -> eframe::Result<()> {
    let settings_path = Settings::default_path();
    let settings = Settings::load_from(&settings_path);
    gantt_editor::logging::init(&settings.log_level);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 760.0])
            .with_min_inner_size([900.0, 420.0])
            .with_title("Gantt Editor"),
        ..Default::default()
    };

    eframe::run_native(
        "Gantt Editor",
        options,
        Box::new(|cc| Ok(Box::new(app::GanttApp::new(cc, settings, settings_path)))),
    )
}
