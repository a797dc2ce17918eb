//! Headless timeline renderer producing a self-contained SVG document.

use std::fmt::{self, Write};

use chrono::NaiveDate;
use log::warn;

use crate::model::{Task, TimelineViewport, ViewMode};
use crate::sync::TimelineRenderer;

const HEADER_HEIGHT: f32 = 50.0;
const ROW_HEIGHT: f32 = 38.0;
const BAR_HEIGHT: f32 = 20.0;
const ARROW_CURVE: f32 = 10.0;

/// Embedded so the exported file renders without the application.
pub const STYLESHEET: &str = "\
.grid-background { fill: none; }
.grid-header { fill: #ffffff; stroke: #e0e0e0; stroke-width: 1.4; }
.grid-row { fill: #ffffff; }
.grid-row:nth-child(even) { fill: #f5f5f5; }
.row-line { stroke: #ebeff2; }
.tick { stroke: #e0e0e0; stroke-width: 0.2; }
.tick.thick { stroke-width: 0.4; }
.today-highlight { fill: #fcf8e3; opacity: 0.5; }
.arrow { fill: none; stroke: #666; stroke-width: 1.4; }
.bar { fill: #b8c2cc; stroke: #8d99a6; stroke-width: 0; }
.bar-progress { fill: #a3a3ff; }
.bar-invalid { fill: transparent; stroke: #8d99a6; stroke-width: 1; stroke-dasharray: 5; }
.bar-label { fill: #fff; dominant-baseline: central; text-anchor: middle; font-size: 12px; font-weight: lighter; }
.bar-label.big { fill: #555; text-anchor: start; }
.lower-text, .upper-text { font-size: 12px; text-anchor: middle; }
.upper-text { fill: #555; }
.lower-text { fill: #333; }
text { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; }
";

/// Render `tasks` into an SVG document for the given viewport.
pub fn render(tasks: &[Task], viewport: &TimelineViewport, today: NaiveDate) -> String {
    let mut out = String::new();
    if let Err(err) = write_svg(&mut out, tasks, viewport, today) {
        warn!("svg render stopped early: {err}");
    }
    out
}

fn write_svg(
    out: &mut String,
    tasks: &[Task],
    viewport: &TimelineViewport,
    today: NaiveDate,
) -> fmt::Result {
    let width = viewport.total_width();
    let height = HEADER_HEIGHT + ROW_HEIGHT * tasks.len() as f32 + 10.0;
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" class="gantt">"#
    )?;
    writeln!(out, "<style>\n{STYLESHEET}</style>")?;
    writeln!(
        out,
        r##"<defs><marker id="arrowhead" viewBox="0 0 10 10" refX="9" refY="5" markerWidth="6" markerHeight="6" orient="auto"><path d="M0 0 L10 5 L0 10 z" fill="#666"/></marker></defs>"##
    )?;

    // Grid
    writeln!(out, r#"<g class="grid">"#)?;
    for (i, _) in tasks.iter().enumerate() {
        let y = HEADER_HEIGHT + ROW_HEIGHT * i as f32;
        writeln!(
            out,
            r#"<rect class="grid-row" x="0" y="{y}" width="{width}" height="{ROW_HEIGHT}"/><line class="row-line" x1="0" y1="{y2}" x2="{width}" y2="{y2}"/>"#,
            y2 = y + ROW_HEIGHT
        )?;
    }
    writeln!(
        out,
        r#"<rect class="grid-header" x="0" y="0" width="{width}" height="{HEADER_HEIGHT}"/>"#
    )?;
    for tick in viewport.ticks() {
        let x = viewport.date_to_x(tick.date);
        let thick = if tick.upper.is_some() { " thick" } else { "" };
        writeln!(
            out,
            r#"<line class="tick{thick}" x1="{x}" y1="{HEADER_HEIGHT}" x2="{x}" y2="{height}"/>"#
        )?;
        writeln!(
            out,
            r#"<text class="lower-text" x="{}" y="{}">{}</text>"#,
            x + tick_label_offset(viewport),
            HEADER_HEIGHT - 10.0,
            escape(&tick.label)
        )?;
        if let Some(upper) = &tick.upper {
            writeln!(
                out,
                r#"<text class="upper-text" x="{}" y="18">{}</text>"#,
                x + 30.0,
                escape(upper)
            )?;
        }
    }
    if today >= viewport.start && today <= viewport.end {
        writeln!(
            out,
            r#"<rect class="today-highlight" x="{}" y="{HEADER_HEIGHT}" width="{}" height="{}"/>"#,
            viewport.date_to_x(today),
            viewport.pixels_per_day,
            height - HEADER_HEIGHT
        )?;
    }
    writeln!(out, "</g>")?;

    // Arrows
    writeln!(out, r#"<g class="arrows">"#)?;
    for (row, task) in tasks.iter().enumerate() {
        for dep in &task.dependencies {
            let Some(from_row) = tasks.iter().position(|t| &t.id == dep) else {
                continue;
            };
            let from = &tasks[from_row];
            let x1 = viewport.date_to_x(from.end.max(from.start)) + viewport.pixels_per_day;
            let y1 = bar_center_y(from_row);
            let x2 = viewport.date_to_x(task.start.min(task.end));
            let y2 = bar_center_y(row);
            writeln!(
                out,
                r#"<path class="arrow" data-from="{}" data-to="{}" d="M{x1} {y1} h{ARROW_CURVE} V{y2} H{x2}" marker-end="url(#arrowhead)"/>"#,
                escape(dep.as_str()),
                escape(task.id.as_str()),
            )?;
        }
    }
    writeln!(out, "</g>")?;

    // Bars
    writeln!(out, r#"<g class="bars">"#)?;
    for (row, task) in tasks.iter().enumerate() {
        let invalid = task.end < task.start;
        let x = viewport.date_to_x(task.start.min(task.end));
        let bar_width = (task.duration_days() + 1) as f32 * viewport.pixels_per_day;
        let y = bar_center_y(row) - BAR_HEIGHT / 2.0;
        let class = if invalid { "bar bar-invalid" } else { "bar" };
        writeln!(
            out,
            r#"<g class="bar-wrapper" data-id="{}">"#,
            escape(task.id.as_str())
        )?;
        writeln!(
            out,
            r#"<rect class="{class}" x="{x}" y="{y}" width="{bar_width}" height="{BAR_HEIGHT}" rx="3" ry="3"/>"#
        )?;
        if !invalid && task.progress > 0 {
            writeln!(
                out,
                r#"<rect class="bar-progress" x="{x}" y="{y}" width="{}" height="{BAR_HEIGHT}" rx="3" ry="3"/>"#,
                bar_width * task.progress as f32 / 100.0
            )?;
        }
        let name = escape(task.display_name());
        let label_fits = name.chars().count() as f32 * 7.0 < bar_width;
        if label_fits {
            writeln!(
                out,
                r#"<text class="bar-label" x="{}" y="{}">{name}</text>"#,
                x + bar_width / 2.0,
                bar_center_y(row)
            )?;
        } else {
            writeln!(
                out,
                r#"<text class="bar-label big" x="{}" y="{}">{name}</text>"#,
                x + bar_width + 5.0,
                bar_center_y(row)
            )?;
        }
        writeln!(out, "</g>")?;
    }
    writeln!(out, "</g>")?;
    out.push_str("</svg>\n");
    Ok(())
}

fn bar_center_y(row: usize) -> f32 {
    HEADER_HEIGHT + ROW_HEIGHT * row as f32 + ROW_HEIGHT / 2.0
}

fn tick_label_offset(viewport: &TimelineViewport) -> f32 {
    match viewport.mode {
        ViewMode::Week => viewport.pixels_per_day * 3.5,
        ViewMode::Month => viewport.pixels_per_day * 15.0,
        _ => viewport.pixels_per_day / 2.0,
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// A renderer that keeps its input and draws to SVG on demand.
#[derive(Debug, Clone)]
pub struct SvgTimeline {
    tasks: Vec<Task>,
    viewport: TimelineViewport,
    today: NaiveDate,
}

impl SvgTimeline {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            tasks: Vec::new(),
            viewport: TimelineViewport::fit(&[], ViewMode::default(), today),
            today,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn viewport(&self) -> &TimelineViewport {
        &self.viewport
    }
}

impl TimelineRenderer for SvgTimeline {
    fn refresh(&mut self, tasks: &[Task]) {
        self.tasks = tasks.to_vec();
        self.viewport.fit_to(&self.tasks, self.today);
    }

    fn change_view_mode(&mut self, mode: ViewMode) {
        self.viewport.set_mode(mode, &self.tasks, self.today);
    }

    fn serialize_current_view(&self) -> String {
        render(&self.tasks, &self.viewport, self.today)
    }
}
