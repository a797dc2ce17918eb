use egui::{Color32, RichText, Ui};

use gantt_editor::editor::{DateRangeCell, Placement, ProgressCell, TextCell, TextField};
use gantt_editor::model::dependency::{self, would_create_cycle};
use gantt_editor::model::{Task, TaskId, TaskPatch, TaskStore};

use crate::ui::theme;

/// Actions that the task table can request.
#[derive(Debug, Clone)]
pub enum TaskTableAction {
    Select(TaskId),
    Add,
    Insert(Placement),
    DeleteSelected,
    /// A finished cell edit; `None` when the value came back unchanged.
    Patch(TaskId, Option<TaskPatch>),
    AddDependency { task: TaskId, depends_on: TaskId },
    RemoveDependency { task: TaskId, depends_on: TaskId },
    Reorder { dragged: TaskId, target: TaskId },
}

/// In-progress cell edits. Only one text cell and one progress cell can be
/// open at a time.
#[derive(Debug, Default)]
pub struct TableEditState {
    text: Option<(TaskId, TextCell)>,
    progress: Option<(TaskId, ProgressCell)>,
    progress_buffer: String,
}

impl TableEditState {
    fn finish_text(&mut self, actions: &mut Vec<TaskTableAction>) {
        if let Some((id, cell)) = self.text.take() {
            actions.push(TaskTableAction::Patch(id, cell.commit()));
        }
    }

    fn finish_progress(&mut self, actions: &mut Vec<TaskTableAction>) {
        if let Some((id, mut cell)) = self.progress.take() {
            actions.push(TaskTableAction::Patch(id, cell.commit()));
        }
    }

    /// Drop edits for tasks that no longer exist.
    pub fn prune(&mut self, store: &TaskStore) {
        if matches!(&self.text, Some((id, _)) if !store.contains(id)) {
            self.text = None;
        }
        if matches!(&self.progress, Some((id, _)) if !store.contains(id)) {
            self.progress = None;
        }
    }
}

/// Render the editable task table.
pub fn show_task_table(
    store: &TaskStore,
    selected: Option<&TaskId>,
    edit: &mut TableEditState,
    ui: &mut Ui,
) -> Vec<TaskTableAction> {
    let mut actions = Vec::new();
    let tasks = store.tasks();

    let dependents = selected
        .map(|id| dependency::dependents_of(tasks, id))
        .unwrap_or_default();
    show_action_bar(tasks.len(), selected.is_some(), &dependents, ui, &mut actions);

    ui.add_space(6.0);
    ui.separator();
    show_column_headers(ui);
    ui.add_space(2.0);

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for (i, task) in tasks.iter().enumerate() {
                let is_selected = selected == Some(&task.id);
                show_row(tasks, task, i, is_selected, edit, ui, &mut actions);
            }
            if tasks.is_empty() {
                ui.add_space(12.0);
                ui.label(RichText::new("No tasks yet").color(theme::TEXT_DIM));
            }
        });

    actions
}

/// Hover text for the delete button, naming the tasks that will lose a
/// dependency.
fn delete_hint(dependents: &[&Task]) -> String {
    const LISTED: usize = 5;
    if dependents.is_empty() {
        return "Delete the selected task".to_string();
    }
    let mut names: Vec<&str> = dependents
        .iter()
        .take(LISTED)
        .map(|t| t.display_name())
        .collect();
    if dependents.len() > LISTED {
        names.push("…");
    }
    let noun = if dependents.len() == 1 { "task depends" } else { "tasks depend" };
    format!(
        "Delete the selected task. {} {noun} on it and will lose the link: {}",
        dependents.len(),
        names.join(", ")
    )
}

fn show_action_bar(
    count: usize,
    has_selection: bool,
    dependents: &[&Task],
    ui: &mut Ui,
    actions: &mut Vec<TaskTableAction>,
) {
    ui.add_space(2.0);
    ui.horizontal(|ui| {
        ui.label(
            RichText::new("Tasks")
                .strong()
                .size(15.0)
                .color(theme::TEXT_PRIMARY),
        );
        ui.label(
            RichText::new(format!("({count})"))
                .size(11.0)
                .color(theme::TEXT_DIM),
        );
        ui.add_space(12.0);

        let add = egui::Button::new(
            RichText::new(format!("{}  Task", egui_phosphor::regular::PLUS))
                .color(Color32::WHITE)
                .size(12.0),
        )
        .fill(theme::ACCENT)
        .rounding(egui::Rounding::same(5.0));
        if ui.add(add).clicked() {
            actions.push(TaskTableAction::Add);
        }

        let above = egui::Button::new(format!("{}  Insert above", egui_phosphor::regular::ARROW_UP));
        if ui.add_enabled(has_selection, above).clicked() {
            actions.push(TaskTableAction::Insert(Placement::Above));
        }
        let below = egui::Button::new(format!("{}  Insert below", egui_phosphor::regular::ARROW_DOWN));
        if ui.add_enabled(has_selection, below).clicked() {
            actions.push(TaskTableAction::Insert(Placement::Below));
        }
        let delete = egui::Button::new(
            RichText::new(format!("{}  Delete", egui_phosphor::regular::TRASH)).color(theme::TEXT_DANGER),
        );
        if ui
            .add_enabled(has_selection, delete)
            .on_hover_text(delete_hint(dependents))
            .clicked()
        {
            actions.push(TaskTableAction::DeleteSelected);
        }
    });
}

fn show_column_headers(ui: &mut Ui) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 4.0;
        let hdr = |ui: &mut Ui, text: &str, width: f32| {
            ui.allocate_ui(egui::vec2(width, 16.0), |ui| {
                ui.label(RichText::new(text).size(9.0).color(theme::TEXT_DIM).strong());
            });
        };
        hdr(ui, "", theme::COL_HANDLE);
        hdr(ui, "NAME", theme::COL_NAME);
        hdr(ui, "START → END", theme::COL_DATES);
        hdr(ui, "%", theme::COL_PROGRESS);
        hdr(ui, "DEPENDS ON", theme::COL_DEPS);
        hdr(ui, "REMARK", theme::COL_REMARK);
    });
}

fn show_row(
    tasks: &[Task],
    task: &Task,
    index: usize,
    is_selected: bool,
    edit: &mut TableEditState,
    ui: &mut Ui,
    actions: &mut Vec<TaskTableAction>,
) {
    let row_bg = if is_selected {
        theme::BG_SELECTED
    } else if index % 2 == 0 {
        theme::BG_PANEL
    } else {
        theme::BG_DARK
    };

    let frame = egui::Frame {
        fill: row_bg,
        rounding: egui::Rounding::same(4.0),
        inner_margin: egui::Margin::symmetric(4.0, 2.0),
        outer_margin: egui::Margin::ZERO,
        stroke: egui::Stroke::NONE,
        shadow: egui::epaint::Shadow::NONE,
    };

    let frame_resp = frame.show(ui, |ui| {
        ui.set_min_height(theme::ROW_HEIGHT - 4.0);
        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 4.0;

            // Drag handle
            let handle_id = egui::Id::new(("row-drag", &task.id));
            ui.allocate_ui(egui::vec2(theme::COL_HANDLE, theme::ROW_HEIGHT - 4.0), |ui| {
                ui.dnd_drag_source(handle_id, task.id.clone(), |ui| {
                    ui.label(
                        RichText::new(egui_phosphor::regular::DOTS_SIX_VERTICAL)
                            .size(14.0)
                            .color(theme::TEXT_DIM),
                    );
                })
                .response
                .on_hover_cursor(egui::CursorIcon::Grab);
            });

            text_cell(ui, edit, task, TextField::Name, theme::COL_NAME, actions);
            date_cell(ui, task, actions);
            progress_cell(ui, edit, task, actions);
            dependency_cell(ui, tasks, task, actions);
            text_cell(ui, edit, task, TextField::Remark, theme::COL_REMARK, actions);
        });
    });

    let row_response = frame_resp.response.interact(egui::Sense::click());
    // Any press inside the row selects it, cells included
    let pressed_inside =
        row_response.contains_pointer() && ui.input(|i| i.pointer.any_pressed());
    if (row_response.clicked() || pressed_inside) && !is_selected {
        actions.push(TaskTableAction::Select(task.id.clone()));
    }

    // Highlight as a drop target while another row hovers over it
    if let Some(dragged) = row_response.dnd_hover_payload::<TaskId>() {
        if *dragged != task.id {
            ui.painter().rect_filled(
                row_response.rect,
                egui::Rounding::same(4.0),
                theme::BG_DROP_TARGET,
            );
        }
    }
    if let Some(dragged) = row_response.dnd_release_payload::<TaskId>() {
        if *dragged != task.id {
            actions.push(TaskTableAction::Reorder {
                dragged: (*dragged).clone(),
                target: task.id.clone(),
            });
        }
    }
}

fn text_cell(
    ui: &mut Ui,
    edit: &mut TableEditState,
    task: &Task,
    field: TextField,
    width: f32,
    actions: &mut Vec<TaskTableAction>,
) {
    let size = [width, theme::ROW_HEIGHT - 8.0];
    let hint = match field {
        TextField::Name => "Unnamed",
        TextField::Remark => "",
    };

    let active = matches!(&edit.text, Some((id, cell)) if id == &task.id && cell.field() == field);
    if active {
        let Some((_, cell)) = edit.text.as_mut() else {
            return;
        };
        let response = ui.add_sized(
            size,
            egui::TextEdit::singleline(cell.buffer_mut()).hint_text(hint),
        );
        if response.lost_focus() {
            edit.finish_text(actions);
        }
        return;
    }

    let mut scratch = field.value(task).to_string();
    let response = ui.add_sized(
        size,
        egui::TextEdit::singleline(&mut scratch).hint_text(hint),
    );
    if response.gained_focus() || response.changed() {
        edit.finish_text(actions);
        let mut cell = TextCell::begin(task, field);
        cell.set(scratch);
        edit.text = Some((task.id.clone(), cell));
    }
}

fn progress_cell(
    ui: &mut Ui,
    edit: &mut TableEditState,
    task: &Task,
    actions: &mut Vec<TaskTableAction>,
) {
    let size = [theme::COL_PROGRESS, theme::ROW_HEIGHT - 8.0];
    let active = matches!(&edit.progress, Some((id, _)) if id == &task.id);

    if active {
        let response = ui.add_sized(
            size,
            egui::TextEdit::singleline(&mut edit.progress_buffer)
                .horizontal_align(egui::Align::Center),
        );
        if response.changed() {
            if let Some((_, cell)) = edit.progress.as_mut() {
                // Non-numeric keystrokes are rejected
                if !cell.input(&edit.progress_buffer) {
                    edit.progress_buffer = cell.buffer().to_string();
                }
            }
        }
        if response.lost_focus() {
            edit.finish_progress(actions);
        }
        return;
    }

    let mut scratch = task.progress.to_string();
    let response = ui.add_sized(
        size,
        egui::TextEdit::singleline(&mut scratch).horizontal_align(egui::Align::Center),
    );
    if response.gained_focus() || response.changed() {
        edit.finish_progress(actions);
        let mut cell = ProgressCell::begin(task);
        cell.input(&scratch);
        edit.progress_buffer = cell.buffer().to_string();
        edit.progress = Some((task.id.clone(), cell));
    }
}

fn date_cell(ui: &mut Ui, task: &Task, actions: &mut Vec<TaskTableAction>) {
    let mut cell = DateRangeCell::begin(task);
    let (mut start, mut end) = cell.range();

    ui.allocate_ui(egui::vec2(theme::COL_DATES, theme::ROW_HEIGHT - 4.0), |ui| {
        ui.horizontal(|ui| {
            let start_changed = ui
                .add(
                    egui_extras::DatePickerButton::new(&mut start)
                        .id_salt(&format!("dp-start-{}", task.id))
                        .calendar_week(false),
                )
                .changed();
            ui.label(RichText::new("→").color(theme::TEXT_DIM));
            let end_changed = ui
                .add(
                    egui_extras::DatePickerButton::new(&mut end)
                        .id_salt(&format!("dp-end-{}", task.id))
                        .calendar_week(false),
                )
                .changed();

            if start_changed {
                // A new start with no end picked yet keeps the span's end
                let patch = cell.select(start, Some(end.max(start)));
                actions.push(TaskTableAction::Patch(task.id.clone(), patch));
            } else if end_changed {
                let patch = cell.select(start, Some(end));
                actions.push(TaskTableAction::Patch(task.id.clone(), patch));
            }
        });
    });
}

fn dependency_cell(ui: &mut Ui, tasks: &[Task], task: &Task, actions: &mut Vec<TaskTableAction>) {
    let view = dependency::resolve(tasks, task);

    ui.allocate_ui(egui::vec2(theme::COL_DEPS, theme::ROW_HEIGHT - 4.0), |ui| {
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing.x = 2.0;
            for dep in &view.resolved {
                let tag = egui::Button::new(
                    RichText::new(format!("{} {}", dep.display_name(), egui_phosphor::regular::X))
                        .size(10.5),
                )
                .fill(theme::BG_HEADER)
                .rounding(egui::Rounding::same(8.0));
                if ui.add(tag).on_hover_text("Remove dependency").clicked() {
                    actions.push(TaskTableAction::RemoveDependency {
                        task: task.id.clone(),
                        depends_on: dep.id.clone(),
                    });
                }
            }

            ui.add_enabled_ui(!view.eligible.is_empty(), |ui| {
                ui.menu_button(egui_phosphor::regular::PLUS, |ui| {
                    for candidate in &view.eligible {
                        let cyclic = would_create_cycle(tasks, &task.id, &candidate.id);
                        let label = if cyclic {
                            RichText::new(format!("{}  (creates a cycle)", candidate.display_name()))
                                .color(theme::TEXT_WARNING)
                        } else {
                            RichText::new(candidate.display_name())
                        };
                        if ui.button(label).clicked() {
                            actions.push(TaskTableAction::AddDependency {
                                task: task.id.clone(),
                                depends_on: candidate.id.clone(),
                            });
                            ui.close_menu();
                        }
                    }
                });
            });
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(name: &str) -> Task {
        let day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        Task::new(name, day, day)
    }

    #[test]
    fn delete_hint_names_dependent_tasks() {
        assert_eq!(delete_hint(&[]), "Delete the selected task");

        let build = task("Build");
        let unnamed = task("");
        let hint = delete_hint(&[&build, &unnamed]);
        assert!(hint.contains("2 tasks depend"));
        assert!(hint.contains(&format!("Build, {}", unnamed.display_name())));
    }

    #[test]
    fn delete_hint_caps_the_listed_names() {
        let tasks: Vec<Task> = (0..7).map(|i| task(&format!("T{i}"))).collect();
        let refs: Vec<&Task> = tasks.iter().collect();
        let hint = delete_hint(&refs);
        assert!(hint.contains("7 tasks depend"));
        assert!(hint.contains("T4, …"));
        assert!(!hint.contains("T5"));
    }

    #[test]
    fn unchanged_text_edit_still_reports_its_cell() {
        let t = task("Plan");
        let mut edit = TableEditState {
            text: Some((t.id.clone(), TextCell::begin(&t, TextField::Name))),
            ..Default::default()
        };
        let mut actions = Vec::new();
        edit.finish_text(&mut actions);
        assert!(matches!(&actions[..], [TaskTableAction::Patch(id, None)] if *id == t.id));
        assert!(edit.text.is_none());
    }
}
