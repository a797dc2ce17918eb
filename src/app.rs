use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{Duration, NaiveDate};
use log::{error, info};

use gantt_editor::config::Settings;
use gantt_editor::editor::{cells, DependencyTags, RowController};
use gantt_editor::io::{self, csv_export, csv_import};
use gantt_editor::model::{Task, TaskId, TaskStore, ViewMode};
use gantt_editor::sync::{Subscription, TimelineBridge};

use crate::ui;
use crate::ui::gantt_chart::ChartView;
use crate::ui::task_table::{TableEditState, TaskTableAction};

/// Main application state.
pub struct GanttApp {
    pub store: TaskStore,
    pub rows: RowController,
    pub bridge: TimelineBridge<ChartView>,
    pub file_path: Option<PathBuf>,
    pub dirty: bool,

    pub settings: Settings,
    settings_path: PathBuf,

    // Table cell edits in progress
    edit: TableEditState,

    // Dialog state
    pub show_about: bool,
    pub show_csv_help: bool,

    // Status message
    pub status_message: String,

    // Set by the store subscription whenever a new snapshot is committed
    changed: Rc<Cell<bool>>,
    _subscription: Subscription,
}

impl GanttApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings, settings_path: PathBuf) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let today = chrono::Local::now().date_naive();
        let store = TaskStore::with_tasks(Self::sample_tasks(today)).unwrap_or_else(|e| {
            error!("sample tasks rejected: {e}");
            TaskStore::new()
        });

        let changed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&changed);
        let subscription = store.subscribe(move |_| flag.set(true));

        let bridge = TimelineBridge::new(ChartView::new(today), settings.view_mode);

        Self {
            store,
            rows: RowController::new(),
            bridge,
            file_path: None,
            dirty: false,
            settings,
            settings_path,
            edit: TableEditState::default(),
            show_about: false,
            show_csv_help: false,
            status_message: "Ready".to_string(),
            changed,
            _subscription: subscription,
        }
    }

    fn sample_tasks(today: NaiveDate) -> Vec<Task> {
        let mut research = Task::new("Research", today - Duration::days(3), today + Duration::days(2));
        research.id = TaskId::new("research");
        research.progress = 60;

        let mut design = Task::new("Design", today + Duration::days(3), today + Duration::days(8));
        design.id = TaskId::new("design");
        design.progress = 20;
        design.dependencies = vec![research.id.clone()];

        let mut build = Task::new("Build", today + Duration::days(9), today + Duration::days(20));
        build.id = TaskId::new("build");
        build.dependencies = vec![design.id.clone()];
        build.remark = Some("Split into milestones once design is signed off".to_string());

        vec![research, design, build]
    }

    // --- File operations ---

    fn dialog(&self) -> rfd::FileDialog {
        let dialog = rfd::FileDialog::new();
        match &self.settings.last_directory {
            Some(dir) => dialog.set_directory(dir),
            None => dialog,
        }
    }

    fn remember(&mut self, path: &Path) {
        self.settings.remember_directory(path);
        self.save_settings();
    }

    fn save_settings(&mut self) {
        if let Err(e) = self.settings.save_to(&self.settings_path) {
            error!("could not save settings: {e}");
        }
    }

    fn replace_tasks(&mut self, tasks: Vec<Task>) -> gantt_editor::Result<()> {
        self.store.replace_all(tasks)?;
        self.rows.prune(&self.store);
        self.edit.prune(&self.store);
        Ok(())
    }

    pub fn new_project(&mut self) {
        match self.replace_tasks(Vec::new()) {
            Ok(()) => {
                self.file_path = None;
                self.rows.clear_selection();
                self.dirty = false;
                self.changed.set(false);
                self.status_message = "New project created".to_string();
            }
            Err(e) => self.status_message = format!("Error: {e}"),
        }
    }

    pub fn open_project(&mut self) {
        let Some(path) = self
            .dialog()
            .add_filter("Gantt Tasks", &["json"])
            .pick_file()
        else {
            return;
        };
        self.remember(&path);
        let result = io::load_tasks(&path).and_then(|tasks| self.replace_tasks(tasks));
        match result {
            Ok(()) => {
                self.file_path = Some(path);
                self.dirty = false;
                self.changed.set(false);
                self.status_message = format!("Loaded {} tasks", self.store.len());
            }
            Err(e) => self.status_message = format!("Error loading: {e}"),
        }
    }

    pub fn save_project(&mut self) {
        match self.file_path.clone() {
            Some(path) => self.write_to(&path),
            None => self.save_project_as(),
        }
    }

    pub fn save_project_as(&mut self) {
        if let Some(path) = self
            .dialog()
            .add_filter("Gantt Tasks", &["json"])
            .set_file_name("tasks.json")
            .save_file()
        {
            self.remember(&path);
            self.file_path = Some(path.clone());
            self.write_to(&path);
        }
    }

    fn write_to(&mut self, path: &Path) {
        match io::save_tasks(self.store.tasks(), path) {
            Ok(()) => {
                self.dirty = false;
                self.status_message = format!("Saved {}", path.display());
            }
            Err(e) => self.status_message = format!("Error saving: {e}"),
        }
    }

    pub fn import_csv(&mut self) {
        // Guard: if the editor has tasks, confirm before replacing
        if !self.store.is_empty() {
            let confirm = rfd::MessageDialog::new()
                .set_title("Import CSV")
                .set_description("This will replace all current tasks. Continue?")
                .set_buttons(rfd::MessageButtons::YesNo)
                .show();
            if confirm != rfd::MessageDialogResult::Yes {
                return;
            }
        }

        let Some(path) = self
            .dialog()
            .add_filter("CSV Files", &["csv", "txt"])
            .pick_file()
        else {
            return;
        };
        self.remember(&path);

        let result = csv_import::import_csv(&path).and_then(|import| {
            let skipped = import.skipped;
            self.replace_tasks(import.tasks).map(|()| skipped)
        });
        match result {
            Ok(skipped) => {
                self.file_path = None;
                self.dirty = true;
                let count = self.store.len();
                self.status_message = if skipped > 0 {
                    format!("Imported {count} tasks ({skipped} rows skipped)")
                } else {
                    format!("Imported {count} tasks")
                };
            }
            Err(e) => self.status_message = format!("CSV import failed: {e}"),
        }
    }

    pub fn export_csv(&mut self) {
        if self.store.is_empty() {
            self.status_message = "Nothing to export: no tasks".to_string();
            return;
        }

        if let Some(path) = self
            .dialog()
            .add_filter("CSV Files", &["csv"])
            .set_file_name("tasks.csv")
            .save_file()
        {
            self.remember(&path);
            match csv_export::export_csv(self.store.tasks(), &path) {
                Ok(count) => self.status_message = format!("Exported {count} tasks to CSV"),
                Err(e) => self.status_message = format!("CSV export failed: {e}"),
            }
        }
    }

    pub fn export_svg(&mut self) {
        // Make sure the capture reflects the latest edits
        self.bridge.sync(&self.store);

        let Some(path) = self
            .dialog()
            .add_filter("SVG Image", &["svg"])
            .set_file_name("gantt.svg")
            .save_file()
        else {
            return;
        };
        self.remember(&path);
        match io::save_svg(&self.bridge.export_svg(), &path) {
            Ok(()) => {
                self.status_message = format!("Exported {}", path.display());
                if let Err(e) = open::that(&path) {
                    info!("could not open exported image: {e}");
                }
            }
            Err(e) => self.status_message = format!("SVG export failed: {e}"),
        }
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.bridge.view_mode() == mode {
            return;
        }
        self.bridge.change_view_mode(mode);
        self.settings.view_mode = mode;
        self.save_settings();
        self.status_message = format!("View: {}", mode.label());
    }

    // --- Task operations ---

    fn apply_table_actions(&mut self, actions: Vec<TaskTableAction>) {
        for action in actions {
            match action {
                TaskTableAction::Select(id) => self.rows.select(id),
                TaskTableAction::Add => {
                    self.rows.add_task(&mut self.store);
                    self.status_message = "Task added".to_string();
                }
                TaskTableAction::Insert(placement) => {
                    if self
                        .rows
                        .insert_relative_to_selection(&mut self.store, placement)
                        .is_some()
                    {
                        self.status_message = "Task inserted".to_string();
                    }
                }
                TaskTableAction::DeleteSelected => {
                    if let Some(task) = self.rows.delete_selected(&mut self.store) {
                        self.edit.prune(&self.store);
                        self.status_message = format!("Deleted '{}'", task.display_name());
                    }
                }
                TaskTableAction::Patch(id, patch) => {
                    cells::commit_to(&mut self.store, &id, patch);
                }
                TaskTableAction::AddDependency { task, depends_on } => {
                    DependencyTags::new(task).add(&mut self.store, &depends_on);
                }
                TaskTableAction::RemoveDependency { task, depends_on } => {
                    DependencyTags::new(task).remove(&mut self.store, &depends_on);
                }
                TaskTableAction::Reorder { dragged, target } => {
                    self.rows.handle_reorder(&mut self.store, &dragged, &target);
                }
            }
        }
    }

    fn describe(&self, id: &TaskId) -> String {
        self.store
            .get(id)
            .map(|task| {
                format!(
                    "Updated '{}' ({} → {}, {}%)",
                    task.display_name(),
                    task.start.format("%Y-%m-%d"),
                    task.end.format("%Y-%m-%d"),
                    task.progress
                )
            })
            .unwrap_or_else(|| "Timeline updated".to_string())
    }
}

impl eframe::App for GanttApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);

        // Handle keyboard shortcuts outside closures to avoid borrow issues
        let should_save = ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::S));
        if should_save {
            self.save_project();
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(24.0)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .size(11.0)
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!(
                                "Tasks: {}  ·  Revision {}  ·  {:.0} px/day",
                                self.store.len(),
                                self.store.revision(),
                                self.bridge.renderer().pixels_per_day()
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Left panel: action bar + editable table
        let selected = self.rows.selected_id(&self.store);
        let mut actions = Vec::new();
        egui::SidePanel::left("task_panel")
            .default_width(ui::theme::SIDE_PANEL_WIDTH)
            .min_width(360.0)
            .resizable(true)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_PANEL)
                    .inner_margin(egui::Margin::same(8.0))
                    .stroke(egui::Stroke::new(1.0, ui::theme::BORDER_SUBTLE)),
            )
            .show(ctx, |ui| {
                actions = ui::task_table::show_task_table(
                    &self.store,
                    selected.as_ref(),
                    &mut self.edit,
                    ui,
                );
            });
        self.apply_table_actions(actions);

        // Central panel: Gantt chart, redrawn from the latest snapshot
        self.bridge.sync(&self.store);
        let selected = self.rows.selected_id(&self.store);
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let output = egui::CentralPanel::default()
            .frame(chart_frame)
            .show(ctx, |ui| self.bridge.renderer_mut().show(ui, selected.as_ref()))
            .inner;

        if let Some(id) = output.clicked {
            self.rows.select(id);
        } else if output.background_clicked {
            self.rows.clear_selection();
        }
        for event in output.events {
            if self.bridge.handle(&mut self.store, event.clone()) {
                let id = match &event {
                    gantt_editor::sync::TimelineEvent::DateChange { task_id, .. }
                    | gantt_editor::sync::TimelineEvent::ProgressChange { task_id, .. } => task_id,
                };
                self.status_message = self.describe(id);
            }
        }

        if self.changed.replace(false) {
            self.dirty = true;
            ctx.request_repaint();
        }

        // Dialogs
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
        if self.show_csv_help {
            ui::dialogs::show_csv_help_dialog(self, ctx);
        }
    }
}
