use egui::style::WidgetVisuals;
use egui::{Color32, FontId, Rounding, Stroke, Visuals};

// ── Palette ──────────────────────────────────────────────────────────────────

pub const BG_DARK: Color32 = Color32::from_rgb(24, 24, 32);
pub const BG_PANEL: Color32 = Color32::from_rgb(30, 30, 40);
pub const BG_HEADER: Color32 = Color32::from_rgb(34, 37, 48);
pub const BG_FIELD: Color32 = Color32::from_rgb(20, 20, 28);
pub const BG_SELECTED: Color32 = Color32::from_rgba_premultiplied(80, 140, 220, 45);
pub const BG_DROP_TARGET: Color32 = Color32::from_rgba_premultiplied(80, 140, 220, 90);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(50, 52, 64);
pub const BORDER_ACCENT: Color32 = Color32::from_rgb(90, 140, 220);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(230, 232, 240);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(155, 160, 178);
pub const TEXT_DIM: Color32 = Color32::from_rgb(100, 105, 120);
pub const TEXT_ON_BAR: Color32 = Color32::from_rgb(255, 255, 255);
pub const TEXT_DANGER: Color32 = Color32::from_rgb(235, 90, 90);
pub const TEXT_WARNING: Color32 = Color32::from_rgb(240, 180, 60);

pub const ACCENT: Color32 = Color32::from_rgb(80, 140, 220);
pub const TODAY_LINE: Color32 = Color32::from_rgb(240, 75, 75);
pub const GRID_LINE: Color32 = Color32::from_rgb(44, 46, 58);
pub const HANDLE_COLOR: Color32 = Color32::from_rgb(255, 255, 255);
pub const ARROW_COLOR: Color32 = Color32::from_rgb(140, 146, 166);
pub const INVALID_BAR: Color32 = Color32::from_rgb(120, 120, 130);

pub const PROGRESS_OVERLAY: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 55);

// ── Sizes ────────────────────────────────────────────────────────────────────

/// Table rows and chart rows share this height so they line up.
pub const ROW_HEIGHT: f32 = 30.0;
pub const ROW_GAP: f32 = 2.0;
pub const HEADER_HEIGHT: f32 = 44.0;
pub const HANDLE_WIDTH: f32 = 7.0;
pub const BAR_ROUNDING: f32 = 5.0;
pub const BAR_INSET: f32 = 3.0; // vertical inset so bars don't touch row edges
pub const SIDE_PANEL_WIDTH: f32 = 620.0;

// Table column widths
pub const COL_HANDLE: f32 = 32.0;
pub const COL_NAME: f32 = 140.0;
pub const COL_DATES: f32 = 190.0;
pub const COL_PROGRESS: f32 = 48.0;
pub const COL_DEPS: f32 = 170.0;
pub const COL_REMARK: f32 = 160.0;

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_header() -> FontId {
    FontId::proportional(12.0)
}

pub fn font_sub() -> FontId {
    FontId::proportional(10.5)
}

pub fn font_bar() -> FontId {
    FontId::proportional(11.5)
}

pub fn font_small() -> FontId {
    FontId::proportional(9.5)
}

pub fn font_menu() -> FontId {
    FontId::proportional(13.0)
}

// ── Task color palette ───────────────────────────────────────────────────────

pub const TASK_COLORS: &[Color32] = &[
    Color32::from_rgb(66, 133, 244),
    Color32::from_rgb(52, 168, 83),
    Color32::from_rgb(171, 71, 188),
    Color32::from_rgb(251, 140, 0),
    Color32::from_rgb(3, 169, 244),
    Color32::from_rgb(229, 57, 53),
    Color32::from_rgb(0, 188, 212),
    Color32::from_rgb(255, 193, 7),
];

/// Bar color for the task in row `index`.
pub fn task_color(index: usize) -> Color32 {
    TASK_COLORS[index % TASK_COLORS.len()]
}

// ── Apply custom visuals ─────────────────────────────────────────────────────

fn style_widget(w: &mut WidgetVisuals, fill: Color32, outline: Color32, text: Stroke) {
    w.bg_fill = fill;
    w.weak_bg_fill = fill;
    w.bg_stroke = Stroke::new(1.0, outline);
    w.fg_stroke = text;
    w.rounding = Rounding::same(4.0);
}

pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();
    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.extreme_bg_color = BG_FIELD; // text fields and date pickers
    visuals.faint_bg_color = BG_DARK;

    let w = &mut visuals.widgets;
    style_widget(&mut w.noninteractive, BG_PANEL, BORDER_SUBTLE, Stroke::new(1.0, TEXT_SECONDARY));
    style_widget(&mut w.inactive, Color32::from_rgb(42, 44, 56), BORDER_SUBTLE, Stroke::new(1.0, TEXT_PRIMARY));
    style_widget(&mut w.hovered, Color32::from_rgb(52, 54, 68), ACCENT, Stroke::new(1.0, TEXT_PRIMARY));
    style_widget(&mut w.active, Color32::from_rgb(60, 62, 76), ACCENT, Stroke::new(2.0, Color32::WHITE));
    style_widget(&mut w.open, Color32::from_rgb(48, 50, 64), ACCENT, Stroke::new(1.0, TEXT_PRIMARY));

    visuals.selection.bg_fill = BG_SELECTED;
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);
    visuals.window_rounding = Rounding::same(8.0);
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.striped = false;
    ctx.set_visuals(visuals);

    ctx.style_mut(|style| {
        style.spacing.item_spacing = egui::vec2(6.0, 4.0);
        style.spacing.button_padding = egui::vec2(8.0, 3.0);
        style.spacing.interact_size.y = ROW_HEIGHT - 8.0;
    });
}
