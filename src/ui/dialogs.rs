use crate::app::GanttApp;
use crate::ui::theme;
use egui::{Context, RichText, Window};

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut GanttApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([320.0, 180.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Gantt Editor").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("Edit tasks in the table or drag them on the timeline.");
                ui.label("Both views always show the same data.");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}

/// Render the "CSV Format" help dialog.
pub fn show_csv_help_dialog(app: &mut GanttApp, ctx: &Context) {
    let mut should_close = false;

    Window::new(RichText::new("CSV Format").strong().size(14.0))
        .resizable(true)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .default_size([560.0, 460.0])
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(4.0);

                ui.label(RichText::new("Delimiters").strong());
                ui.label("Import auto-detects comma (,), semicolon (;) or tab. Export writes semicolons.");
                ui.add_space(8.0);

                ui.label(RichText::new("Columns").strong());
                ui.add_space(2.0);
                egui::Grid::new("csv_columns")
                    .num_columns(3)
                    .striped(true)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("Column").underline());
                        ui.label(RichText::new("Accepted headers").underline());
                        ui.label(RichText::new("Values").underline());
                        ui.end_row();

                        let rows = [
                            ("ID", "ID, Task ID, Key, UID", "Optional; generated when missing"),
                            ("Name", "Name, Task, Task Name, Label, Title, Activity", "Required"),
                            ("Start", "Start, Start Date, From, Begin", "Required date"),
                            ("End", "End, End Date, To, Finish, Due", "Required date"),
                            ("Progress", "Progress, Status, State, Percent Complete", "0-100 or Done / In Progress / Planned"),
                            ("Dependencies", "Dependencies, Depends On, Predecessors", "Comma-separated ids or names"),
                            ("Remark", "Remark, Notes, Comment, Description", "Any text"),
                        ];
                        for (column, headers, values) in rows {
                            ui.label(RichText::new(column).strong());
                            ui.label(headers);
                            ui.label(values);
                            ui.end_row();
                        }
                    });
                ui.add_space(8.0);

                ui.label(RichText::new("Supported Date Formats").strong());
                ui.add_space(2.0);
                for fmt in &[
                    "YYYY-MM-DD   (e.g. 2025-06-15)",
                    "DD/MM/YYYY   (e.g. 15/06/2025)",
                    "MM/DD/YYYY   (e.g. 06/15/2025)",
                    "DD-MM-YYYY   (e.g. 15-06-2025)",
                    "DD.MM.YYYY   (e.g. 15.06.2025)",
                    "YYYY/MM/DD   (e.g. 2025/06/15)",
                ] {
                    ui.label(RichText::new(*fmt).monospace().size(11.0));
                }
                ui.add_space(8.0);

                ui.label(RichText::new("Notes").strong());
                ui.add_space(2.0);
                let notes = [
                    "• Header matching is case-insensitive and ignores spaces, hyphens and underscores.",
                    "• Rows with a missing name or an invalid start or end date are skipped.",
                    "• Unknown dependencies are dropped with a warning in the log.",
                    "• Importing replaces every task in the editor.",
                ];
                for note in &notes {
                    ui.label(RichText::new(*note).small());
                }
                ui.add_space(10.0);

                ui.label(RichText::new("Example").strong());
                ui.add_space(2.0);
                let example = "ID;Name;Start;End;Progress;Dependencies;Remark\n\
                               t1;Research;2025-01-01;2025-01-05;100;;\n\
                               t2;Design;2025-01-06;2025-01-12;40;t1;Needs review\n\
                               t3;Build;2025-01-13;2025-01-31;0;t1,t2;";
                egui::Frame::dark_canvas(ui.style()).show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut example.to_string())
                            .font(egui::TextStyle::Monospace)
                            .desired_width(f32::INFINITY)
                            .interactive(false),
                    );
                });
                ui.add_space(8.0);
            });

            ui.separator();
            ui.add_space(4.0);
            if ui.add_sized([80.0, 28.0], egui::Button::new("Close")).clicked() {
                should_close = true;
            }
            ui.add_space(2.0);
        });

    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_csv_help = false;
    }
}
