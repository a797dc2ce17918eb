use crate::app::GanttApp;
use crate::ui::theme;
use egui::{menu, RichText, Ui};
use gantt_editor::model::ViewMode;

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut GanttApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui.button("  New").clicked() {
                app.new_project();
                ui.close_menu();
            }
            if ui.button("  Open...").clicked() {
                app.open_project();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Save          Ctrl+S").clicked() {
                app.save_project();
                ui.close_menu();
            }
            if ui.button("  Save As...").clicked() {
                app.save_project_as();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Import CSV...").clicked() {
                app.import_csv();
                ui.close_menu();
            }
            if ui.button("  Export CSV...").clicked() {
                app.export_csv();
                ui.close_menu();
            }
            if ui.button("  Export SVG...").clicked() {
                app.export_svg();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            if ui.button("  Zoom In        Ctrl+Scroll ↑").clicked() {
                app.bridge.renderer_mut().zoom_in();
                ui.close_menu();
            }
            if ui.button("  Zoom Out      Ctrl+Scroll ↓").clicked() {
                app.bridge.renderer_mut().zoom_out();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            if ui.button("CSV Format").clicked() {
                app.show_csv_help = true;
                ui.close_menu();
            }
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        ui.separator();

        // View-mode toggle
        let current = app.bridge.view_mode();
        for mode in ViewMode::ALL {
            if ui.selectable_label(current == mode, mode.label()).clicked() {
                app.set_view_mode(mode);
            }
        }

        // Right-aligned file name
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let name = app
                .file_path
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Untitled".to_string());
            let modified = if app.dirty { " •" } else { "" };
            ui.label(RichText::new(format!("{name}{modified}")).size(11.0).weak());
        });
    });
}
