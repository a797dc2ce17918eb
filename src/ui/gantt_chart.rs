use chrono::{Duration, NaiveDate, NaiveTime};
use egui::{Color32, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};

use gantt_editor::io::svg;
use gantt_editor::model::{Task, TaskId, TimelineViewport, ViewMode};
use gantt_editor::sync::{TimelineEvent, TimelineRenderer};

use crate::ui::theme;

const ROW_HEIGHT: f32 = theme::ROW_HEIGHT;
const ROW_PADDING: f32 = theme::ROW_GAP;
const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;
const HANDLE_WIDTH: f32 = theme::HANDLE_WIDTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragMode {
    Move,
    ResizeLeft,
    ResizeRight,
    Progress,
}

/// Local state of a bar drag. The chart draws from it until the drag ends;
/// only then is a callback emitted.
#[derive(Debug, Clone)]
struct DragPreview {
    task_id: TaskId,
    mode: DragMode,
    pointer_x: f32,
    bar_width: f32,
    origin_start: NaiveDate,
    origin_end: NaiveDate,
    origin_progress: u8,
    start: NaiveDate,
    end: NaiveDate,
    progress: f64,
}

impl DragPreview {
    fn begin(task: &Task, mode: DragMode, pointer_x: f32, bar_width: f32) -> Self {
        Self {
            task_id: task.id.clone(),
            mode,
            pointer_x,
            bar_width,
            origin_start: task.start,
            origin_end: task.end,
            origin_progress: task.progress,
            start: task.start,
            end: task.end,
            progress: task.progress as f64,
        }
    }

    fn update(&mut self, pointer_x: f32, viewport: &TimelineViewport) {
        let delta_x = pointer_x - self.pointer_x;
        let days = Duration::days(viewport.drag_days(delta_x));
        match self.mode {
            DragMode::Move => {
                self.start = self.origin_start + days;
                self.end = self.origin_end + days;
            }
            DragMode::ResizeLeft => {
                self.start = (self.origin_start + days).min(self.origin_end);
            }
            DragMode::ResizeRight => {
                self.end = (self.origin_end + days).max(self.origin_start);
            }
            DragMode::Progress => {
                let delta = delta_x / self.bar_width.max(1.0) * 100.0;
                self.progress = (self.origin_progress as f64 + delta as f64).clamp(0.0, 100.0);
            }
        }
    }

    /// The callback for a finished drag, if anything moved.
    fn finish(self) -> Option<TimelineEvent> {
        match self.mode {
            DragMode::Progress => (self.progress.round() as i64 != self.origin_progress as i64)
                .then(|| TimelineEvent::ProgressChange {
                    task_id: self.task_id,
                    progress: self.progress,
                }),
            _ => (self.start != self.origin_start || self.end != self.origin_end).then(|| {
                TimelineEvent::DateChange {
                    task_id: self.task_id,
                    start: self.start.and_time(NaiveTime::MIN),
                    end: self.end.and_time(NaiveTime::MIN),
                }
            }),
        }
    }
}

/// What happened in the chart during one frame.
#[derive(Debug, Default)]
pub struct ChartOutput {
    pub events: Vec<TimelineEvent>,
    pub clicked: Option<TaskId>,
    pub background_clicked: bool,
}

/// The interactive timeline. Its task list is only ever replaced through
/// [`TimelineRenderer::refresh`].
pub struct ChartView {
    tasks: Vec<Task>,
    viewport: TimelineViewport,
    today: NaiveDate,
    preview: Option<DragPreview>,
}

impl ChartView {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            tasks: Vec::new(),
            viewport: TimelineViewport::fit(&[], ViewMode::default(), today),
            today,
            preview: None,
        }
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn pixels_per_day(&self) -> f32 {
        self.viewport.pixels_per_day
    }

    /// Dates and progress to draw for `task`, honoring an active drag.
    fn displayed(&self, task: &Task) -> (NaiveDate, NaiveDate, f32) {
        match &self.preview {
            Some(p) if p.task_id == task.id => (p.start, p.end, p.progress as f32),
            _ => (task.start, task.end, task.progress as f32),
        }
    }

    /// Render the chart and collect this frame's interactions.
    pub fn show(&mut self, ui: &mut Ui, selected: Option<&TaskId>) -> ChartOutput {
        let mut out = ChartOutput::default();
        let available = ui.available_size();
        let chart_width = self.viewport.total_width().max(available.x);
        let chart_height =
            HEADER_HEIGHT + (self.tasks.len() as f32 * (ROW_HEIGHT + ROW_PADDING)) + 40.0;

        // Ctrl + scroll wheel zooms
        let scroll_delta = ui.input(|i| i.smooth_scroll_delta);
        if ui.rect_contains_pointer(ui.max_rect()) && ui.input(|i| i.modifiers.ctrl) {
            if scroll_delta.y > 0.0 {
                self.viewport.zoom_in();
            } else if scroll_delta.y < 0.0 {
                self.viewport.zoom_out();
            }
        }

        egui::ScrollArea::both()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let (response, painter) = ui.allocate_painter(
                    Vec2::new(chart_width, chart_height.max(available.y)),
                    Sense::click(),
                );
                let origin = response.rect.min;

                painter.rect_filled(response.rect, 0.0, theme::BG_DARK);
                self.draw_rows(&painter, origin, chart_width);
                draw_timeline_header(&painter, origin, &self.viewport, chart_width, chart_height);
                draw_today_line(&painter, origin, &self.viewport, self.today, chart_height);
                self.draw_arrows(&painter, origin);

                let mut consumed_click = false;
                for row in 0..self.tasks.len() {
                    let task = self.tasks[row].clone();
                    let is_selected = selected == Some(&task.id);
                    if self.bar(ui, &painter, origin, row, &task, is_selected, &mut out) {
                        consumed_click = true;
                    }
                }

                // Empty click on background clears selection
                if response.clicked() && !consumed_click {
                    out.background_clicked = true;
                }
            });

        out
    }

    fn row_top(origin: Pos2, row: usize) -> f32 {
        origin.y + HEADER_HEIGHT + row as f32 * (ROW_HEIGHT + ROW_PADDING)
    }

    fn bar_rect(&self, origin: Pos2, row: usize, start: NaiveDate, end: NaiveDate) -> Rect {
        let first = start.min(end);
        let days = (end - start).num_days().abs() + 1;
        let x = origin.x + self.viewport.date_to_x(first);
        let width = (days as f32 * self.viewport.pixels_per_day).max(6.0);
        let inset = theme::BAR_INSET;
        let y = Self::row_top(origin, row) + ROW_PADDING;
        Rect::from_min_size(
            Pos2::new(x, y + inset),
            Vec2::new(width, ROW_HEIGHT - inset * 2.0),
        )
    }

    fn draw_rows(&self, painter: &egui::Painter, origin: Pos2, width: f32) {
        for row in 0..self.tasks.len() {
            let y = Self::row_top(origin, row);
            let row_bg = if row % 2 == 0 {
                theme::BG_PANEL
            } else {
                theme::BG_DARK
            };
            painter.rect_filled(
                Rect::from_min_size(
                    Pos2::new(origin.x, y),
                    Vec2::new(width, ROW_HEIGHT + ROW_PADDING),
                ),
                0.0,
                row_bg,
            );
            painter.line_segment(
                [
                    Pos2::new(origin.x, y + ROW_HEIGHT + ROW_PADDING),
                    Pos2::new(origin.x + width, y + ROW_HEIGHT + ROW_PADDING),
                ],
                Stroke::new(0.5, theme::BORDER_SUBTLE),
            );
        }
    }

    fn draw_arrows(&self, painter: &egui::Painter, origin: Pos2) {
        let stroke = Stroke::new(1.2, theme::ARROW_COLOR);
        for (row, task) in self.tasks.iter().enumerate() {
            let (start, end, _) = self.displayed(task);
            let to_rect = self.bar_rect(origin, row, start, end);
            for dep in &task.dependencies {
                let Some(from_row) = self.tasks.iter().position(|t| &t.id == dep) else {
                    continue;
                };
                let (dep_start, dep_end, _) = self.displayed(&self.tasks[from_row]);
                let from_rect = self.bar_rect(origin, from_row, dep_start, dep_end);

                let from = Pos2::new(from_rect.right(), from_rect.center().y);
                let to = Pos2::new(to_rect.left(), to_rect.center().y);
                let elbow_x = from.x + 8.0;
                let points = [
                    from,
                    Pos2::new(elbow_x, from.y),
                    Pos2::new(elbow_x, to.y),
                    Pos2::new(to.x.max(elbow_x) - 1.0, to.y),
                ];
                for pair in points.windows(2) {
                    painter.line_segment([pair[0], pair[1]], stroke);
                }
                let tip = Pos2::new(to.x.max(elbow_x), to.y);
                painter.add(egui::Shape::convex_polygon(
                    vec![
                        tip,
                        tip + Vec2::new(-6.0, -4.0),
                        tip + Vec2::new(-6.0, 4.0),
                    ],
                    theme::ARROW_COLOR,
                    Stroke::NONE,
                ));
            }
        }
    }

    /// Draw one bar and handle its interactions. Returns true if the bar
    /// consumed a click.
    #[allow(clippy::too_many_arguments)]
    fn bar(
        &mut self,
        ui: &mut Ui,
        painter: &egui::Painter,
        origin: Pos2,
        row: usize,
        task: &Task,
        is_selected: bool,
        out: &mut ChartOutput,
    ) -> bool {
        let (start, end, progress) = self.displayed(task);
        let bar_rect = self.bar_rect(origin, row, start, end);
        draw_task_bar(painter, bar_rect, task, row, start, end, progress, is_selected);

        let bar_response = ui.interact(
            bar_rect,
            ui.make_persistent_id(("task-bar", &task.id)),
            Sense::click_and_drag(),
        );
        let left_handle_rect = Rect::from_min_max(
            Pos2::new(bar_rect.left() - HANDLE_WIDTH * 0.5, bar_rect.top()),
            Pos2::new(bar_rect.left() + HANDLE_WIDTH * 0.5, bar_rect.bottom()),
        );
        let right_handle_rect = Rect::from_min_max(
            Pos2::new(bar_rect.right() - HANDLE_WIDTH * 0.5, bar_rect.top()),
            Pos2::new(bar_rect.right() + HANDLE_WIDTH * 0.5, bar_rect.bottom()),
        );
        let progress_x = bar_rect.left() + bar_rect.width() * (progress / 100.0);
        let progress_handle_rect = Rect::from_center_size(
            Pos2::new(progress_x, bar_rect.bottom()),
            Vec2::new(10.0, 8.0),
        );

        let left_response = ui.interact(
            left_handle_rect.expand(4.0),
            ui.make_persistent_id(("task-resize-left", &task.id)),
            Sense::drag(),
        );
        let right_response = ui.interact(
            right_handle_rect.expand(4.0),
            ui.make_persistent_id(("task-resize-right", &task.id)),
            Sense::drag(),
        );
        let progress_response = ui.interact(
            progress_handle_rect.expand(2.0),
            ui.make_persistent_id(("task-progress", &task.id)),
            Sense::drag(),
        );

        let mut consumed = false;
        if bar_response.clicked() {
            out.clicked = Some(task.id.clone());
            consumed = true;
        }

        let handles = [
            (&progress_response, DragMode::Progress),
            (&left_response, DragMode::ResizeLeft),
            (&right_response, DragMode::ResizeRight),
            (&bar_response, DragMode::Move),
        ];
        for (response, mode) in handles {
            let pointer_x = response.interact_pointer_pos().map(|p| p.x).unwrap_or(0.0);
            if response.drag_started() && self.preview.is_none() {
                let task_now = Task {
                    start,
                    end,
                    ..task.clone()
                };
                self.preview = Some(DragPreview::begin(&task_now, mode, pointer_x, bar_rect.width()));
                out.clicked = Some(task.id.clone());
                consumed = true;
            }
            let owns_preview = self
                .preview
                .as_ref()
                .is_some_and(|p| p.task_id == task.id && p.mode == mode);
            if !owns_preview {
                continue;
            }
            if response.dragged() {
                ui.ctx().set_cursor_icon(match mode {
                    DragMode::Move => egui::CursorIcon::Grab,
                    _ => egui::CursorIcon::ResizeHorizontal,
                });
                if let Some(preview) = self.preview.as_mut() {
                    preview.update(pointer_x, &self.viewport);
                }
            }
            if response.drag_stopped() {
                if let Some(event) = self.preview.take().and_then(DragPreview::finish) {
                    out.events.push(event);
                }
            }
        }

        // Handle affordances
        let hovered_handle =
            left_response.hovered() || right_response.hovered() || progress_response.hovered();
        if is_selected || hovered_handle {
            if hovered_handle {
                ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
            } else if bar_response.hovered() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            }
            let handle_h = bar_rect.height() * 0.55;
            let handle_y = bar_rect.center().y - handle_h / 2.0;
            let lh = Rect::from_min_size(
                Pos2::new(bar_rect.left() - 1.5, handle_y),
                Vec2::new(4.0, handle_h),
            );
            let rh = Rect::from_min_size(
                Pos2::new(bar_rect.right() - 2.5, handle_y),
                Vec2::new(4.0, handle_h),
            );
            painter.rect_filled(lh, Rounding::same(2.0), theme::HANDLE_COLOR);
            painter.rect_filled(rh, Rounding::same(2.0), theme::HANDLE_COLOR);
            painter.add(egui::Shape::convex_polygon(
                vec![
                    Pos2::new(progress_x, bar_rect.bottom() - 3.0),
                    Pos2::new(progress_x + 4.0, bar_rect.bottom() + 3.0),
                    Pos2::new(progress_x - 4.0, bar_rect.bottom() + 3.0),
                ],
                theme::HANDLE_COLOR,
                Stroke::NONE,
            ));
        }

        // Tooltip on hover
        if bar_response.hovered() || hovered_handle {
            egui::show_tooltip_at_pointer(
                ui.ctx(),
                ui.layer_id(),
                egui::Id::new(("task-tip", &task.id)),
                |ui| {
                    ui.strong(task.display_name());
                    ui.label(format!(
                        "{} → {}",
                        start.format("%Y-%m-%d"),
                        end.format("%Y-%m-%d"),
                    ));
                    ui.label(format!("Progress: {}%", progress.round() as i32));
                },
            );
        }

        consumed
    }
}

impl TimelineRenderer for ChartView {
    fn refresh(&mut self, tasks: &[Task]) {
        self.tasks = tasks.to_vec();
        self.preview = None;
        self.viewport.fit_to(&self.tasks, self.today);
    }

    fn change_view_mode(&mut self, mode: ViewMode) {
        self.viewport.set_mode(mode, &self.tasks, self.today);
    }

    fn serialize_current_view(&self) -> String {
        svg::render(&self.tasks, &self.viewport, self.today)
    }
}

fn draw_timeline_header(
    painter: &egui::Painter,
    origin: Pos2,
    viewport: &TimelineViewport,
    width: f32,
    height: f32,
) {
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(width, HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + HEADER_HEIGHT),
            Pos2::new(origin.x + width, origin.y + HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    // Only the part of the axis inside the clip rect is drawn
    let clip = painter.clip_rect();
    let (first, last) = viewport.visible_range(
        clip.left() - origin.x - viewport.pixels_per_day,
        clip.right() - origin.x + viewport.pixels_per_day,
    );

    let show_lower = viewport.pixels_per_day >= 20.0 || viewport.mode != ViewMode::Day;
    for tick in viewport.ticks_between(first, last) {
        let x = origin.x + viewport.date_to_x(tick.date);
        painter.line_segment(
            [
                Pos2::new(x, origin.y + HEADER_HEIGHT),
                Pos2::new(x, origin.y + height),
            ],
            Stroke::new(0.5, theme::GRID_LINE),
        );
        if show_lower {
            painter.text(
                Pos2::new(x + 3.0, origin.y + 30.0),
                egui::Align2::LEFT_CENTER,
                &tick.label,
                theme::font_sub(),
                theme::TEXT_SECONDARY,
            );
        }
        if let Some(upper) = &tick.upper {
            painter.text(
                Pos2::new(x + 3.0, origin.y + 12.0),
                egui::Align2::LEFT_CENTER,
                upper,
                theme::font_header(),
                theme::TEXT_PRIMARY,
            );
        }
    }

    // Sub-day divisions
    let parts = match viewport.mode {
        ViewMode::QuarterDay => 4,
        ViewMode::HalfDay => 2,
        _ => 1,
    };
    if parts > 1 {
        let mut date = first;
        while date <= last {
            let x0 = origin.x + viewport.date_to_x(date);
            for part in 1..parts {
                let x = x0 + viewport.pixels_per_day * part as f32 / parts as f32;
                painter.line_segment(
                    [
                        Pos2::new(x, origin.y + HEADER_HEIGHT),
                        Pos2::new(x, origin.y + height),
                    ],
                    Stroke::new(0.3, theme::GRID_LINE),
                );
            }
            date += Duration::days(1);
        }
    }
}

fn draw_today_line(
    painter: &egui::Painter,
    origin: Pos2,
    viewport: &TimelineViewport,
    today: NaiveDate,
    height: f32,
) {
    let x = origin.x + viewport.date_to_x(today);

    painter.line_segment(
        [
            Pos2::new(x, origin.y + HEADER_HEIGHT),
            Pos2::new(x, origin.y + height),
        ],
        Stroke::new(1.5, theme::TODAY_LINE),
    );

    let badge_w = 42.0;
    let badge_rect = Rect::from_min_size(
        Pos2::new(x - badge_w / 2.0, origin.y + HEADER_HEIGHT - 1.0),
        Vec2::new(badge_w, 14.0),
    );
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge_rect.center(),
        egui::Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        Color32::WHITE,
    );
}

#[allow(clippy::too_many_arguments)]
fn draw_task_bar(
    painter: &egui::Painter,
    bar_rect: Rect,
    task: &Task,
    row: usize,
    start: NaiveDate,
    end: NaiveDate,
    progress: f32,
    is_selected: bool,
) {
    let rounding = Rounding::same(theme::BAR_ROUNDING);

    if end < start {
        // Inverted range: outline only
        painter.rect_stroke(bar_rect, rounding, Stroke::new(1.0, theme::INVALID_BAR));
    } else {
        let color = theme::task_color(row);

        // Soft shadow
        let shadow_rect = bar_rect.translate(Vec2::new(1.0, 2.0));
        painter.rect_filled(shadow_rect, rounding, Color32::from_black_alpha(35));

        painter.rect_filled(bar_rect, rounding, color);
        let highlight_rect = Rect::from_min_size(
            bar_rect.min,
            Vec2::new(bar_rect.width(), (bar_rect.height() * 0.45).max(4.0)),
        );
        painter.rect_filled(
            highlight_rect,
            Rounding {
                nw: theme::BAR_ROUNDING,
                ne: theme::BAR_ROUNDING,
                sw: 0.0,
                se: 0.0,
            },
            Color32::from_white_alpha(25),
        );

        // Progress fill (darkened overlay)
        if progress > 0.0 {
            let progress_width = bar_rect.width() * (progress / 100.0).clamp(0.0, 1.0);
            let progress_rect =
                Rect::from_min_size(bar_rect.min, Vec2::new(progress_width, bar_rect.height()));
            painter.rect_filled(progress_rect, rounding, theme::PROGRESS_OVERLAY);
        }
    }

    if is_selected {
        painter.rect_stroke(
            bar_rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    // Task name on bar, or next to it when the bar is too short
    let galley = painter.layout_no_wrap(
        task.display_name().to_string(),
        theme::font_bar(),
        theme::TEXT_ON_BAR,
    );
    let text_y = bar_rect.top() + (bar_rect.height() - galley.size().y) / 2.0;
    if galley.size().x + 12.0 <= bar_rect.width() {
        let clipped = painter.with_clip_rect(bar_rect);
        clipped.galley(
            Pos2::new(bar_rect.left() + 6.0, text_y),
            galley,
            Color32::TRANSPARENT,
        );
    } else {
        painter.galley(
            Pos2::new(bar_rect.right() + 6.0, text_y),
            galley,
            theme::TEXT_SECONDARY,
        );
    }
}
