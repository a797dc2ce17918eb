use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::task::Task;

/// Time-axis granularity of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[serde(rename = "Quarter Day")]
    QuarterDay,
    #[serde(rename = "Half Day")]
    HalfDay,
    #[default]
    Day,
    Week,
    Month,
}

impl ViewMode {
    pub const ALL: [ViewMode; 5] = [
        ViewMode::QuarterDay,
        ViewMode::HalfDay,
        ViewMode::Day,
        ViewMode::Week,
        ViewMode::Month,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::QuarterDay => "Quarter Day",
            ViewMode::HalfDay => "Half Day",
            ViewMode::Day => "Day",
            ViewMode::Week => "Week",
            ViewMode::Month => "Month",
        }
    }

    /// Default zoom for this mode.
    pub fn pixels_per_day(self) -> f32 {
        match self {
            ViewMode::QuarterDay => 152.0,
            ViewMode::HalfDay => 76.0,
            ViewMode::Day => 38.0,
            ViewMode::Week => 20.0,
            ViewMode::Month => 4.0,
        }
    }

    /// Days of padding kept before the first and after the last bar.
    pub fn padding_days(self) -> i64 {
        match self {
            ViewMode::QuarterDay | ViewMode::HalfDay => 1,
            ViewMode::Day => 7,
            ViewMode::Week => 28,
            ViewMode::Month => 90,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Manages the visible viewport of the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineViewport {
    /// The leftmost visible date.
    pub start: NaiveDate,
    /// The rightmost visible date.
    pub end: NaiveDate,
    /// Current display granularity.
    pub mode: ViewMode,
    /// Pixels per day (controls zoom level).
    pub pixels_per_day: f32,
}

impl TimelineViewport {
    pub fn new(start: NaiveDate, end: NaiveDate, mode: ViewMode) -> Self {
        Self {
            start,
            end,
            mode,
            pixels_per_day: mode.pixels_per_day(),
        }
    }

    /// A viewport covering every task plus the mode's padding, or a window
    /// around `today` when there are no tasks.
    pub fn fit(tasks: &[Task], mode: ViewMode, today: NaiveDate) -> Self {
        let mut viewport = Self::new(today, today, mode);
        viewport.fit_to(tasks, today);
        viewport
    }

    /// Recompute the visible range for `tasks` without changing zoom.
    pub fn fit_to(&mut self, tasks: &[Task], today: NaiveDate) {
        let pad = Duration::days(self.mode.padding_days());
        let min = tasks.iter().map(|t| t.start.min(t.end)).min().unwrap_or(today);
        let max = tasks.iter().map(|t| t.end.max(t.start)).max().unwrap_or(today);
        self.start = min - pad;
        self.end = max + pad;
    }

    /// Switch granularity and reset zoom to that mode's default.
    pub fn set_mode(&mut self, mode: ViewMode, tasks: &[Task], today: NaiveDate) {
        self.mode = mode;
        self.pixels_per_day = mode.pixels_per_day();
        self.fit_to(tasks, today);
    }

    /// Convert a date to an x-pixel offset from the viewport start.
    pub fn date_to_x(&self, date: NaiveDate) -> f32 {
        let days = (date - self.start).num_days() as f32;
        days * self.pixels_per_day
    }

    /// Convert an x-pixel offset back to a date.
    pub fn x_to_date(&self, x: f32) -> NaiveDate {
        let days = (x / self.pixels_per_day).round() as i64;
        self.start + Duration::days(days)
    }

    /// Whole days covered by a horizontal drag of `delta_x` pixels.
    pub fn drag_days(&self, delta_x: f32) -> i64 {
        (delta_x / self.pixels_per_day).round() as i64
    }

    /// Total width in pixels for the visible range, including the last day.
    pub fn total_width(&self) -> f32 {
        self.date_to_x(self.end) + self.pixels_per_day
    }

    /// Grid ticks of the time axis for the current mode.
    pub fn ticks(&self) -> Vec<Tick> {
        self.ticks_between(self.start, self.end)
    }

    /// Dates under the pixel span `[x0, x1]`, clamped to the viewport.
    pub fn visible_range(&self, x0: f32, x1: f32) -> (NaiveDate, NaiveDate) {
        let span = (self.end - self.start).num_days().max(0);
        let day_at = |x: f32| {
            let days = (x / self.pixels_per_day).floor() as i64;
            self.start + Duration::days(days.clamp(0, span))
        };
        (day_at(x0.min(x1)), day_at(x0.max(x1)))
    }

    /// Ticks falling on `from..=to`, clamped to the viewport. The first tick
    /// always carries its coarser label so a scrolled header stays readable.
    pub fn ticks_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<Tick> {
        let mut ticks = Vec::new();
        let first = from.max(self.start);
        let last = to.min(self.end);
        let mut date = first;
        match self.mode {
            ViewMode::QuarterDay | ViewMode::HalfDay | ViewMode::Day => {
                while date <= last {
                    ticks.push(Tick {
                        date,
                        label: date.format("%d").to_string(),
                        upper: (date.day() == 1 || date == first)
                            .then(|| date.format("%b %Y").to_string()),
                    });
                    date += Duration::days(1);
                }
            }
            ViewMode::Week => {
                date -= Duration::days(date.weekday().num_days_from_monday() as i64);
                while date <= last {
                    ticks.push(Tick {
                        date,
                        label: date.format("W%V").to_string(),
                        upper: (date.day() <= 7 || ticks.is_empty())
                            .then(|| date.format("%b %Y").to_string()),
                    });
                    date += Duration::days(7);
                }
            }
            ViewMode::Month => {
                date = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
                while date <= last {
                    ticks.push(Tick {
                        date,
                        label: date.format("%b").to_string(),
                        upper: (date.month() == 1 || ticks.is_empty())
                            .then(|| date.format("%Y").to_string()),
                    });
                    date = first_of_next_month(date);
                }
            }
        }
        ticks
    }

    /// Zoom in (increase pixels per day).
    pub fn zoom_in(&mut self) {
        self.pixels_per_day = (self.pixels_per_day * 1.2).min(240.0);
    }

    /// Zoom out (decrease pixels per day).
    pub fn zoom_out(&mut self) {
        self.pixels_per_day = (self.pixels_per_day / 1.2).max(2.0);
    }
}

/// One labelled grid line of the time axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub date: NaiveDate,
    pub label: String,
    /// Coarser label (month or year) shown above the first tick of a period.
    pub upper: Option<String>,
}

fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(date + Duration::days(30))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_ticks_start_on_monday() {
        // 2024-01-03 is a Wednesday.
        let vp = TimelineViewport::new(date(2024, 1, 3), date(2024, 1, 20), ViewMode::Week);
        let ticks = vp.ticks();
        assert_eq!(ticks[0].date, date(2024, 1, 1));
        assert_eq!(ticks[0].label, "W01");
        assert_eq!(ticks.len(), 3);
    }

    #[test]
    fn month_ticks_cross_year() {
        let vp = TimelineViewport::new(date(2023, 11, 15), date(2024, 2, 1), ViewMode::Month);
        let labels: Vec<_> = vp.ticks().into_iter().map(|t| (t.label, t.upper)).collect();
        assert_eq!(
            labels,
            vec![
                ("Nov".to_string(), Some("2023".to_string())),
                ("Dec".to_string(), None),
                ("Jan".to_string(), Some("2024".to_string())),
                ("Feb".to_string(), None),
            ]
        );
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn x_and_date_round_trip() {
        let vp = TimelineViewport::new(date(2024, 1, 1), date(2024, 2, 1), ViewMode::Day);
        let x = vp.date_to_x(date(2024, 1, 11));
        assert_eq!(x, 380.0);
        assert_eq!(vp.x_to_date(x + 10.0), date(2024, 1, 11));
        assert_eq!(vp.drag_days(-57.0), -2);
    }

    #[test]
    fn fit_pads_task_range() {
        let tasks = vec![
            Task::new("a", date(2024, 1, 10), date(2024, 1, 12)),
            Task::new("b", date(2024, 1, 5), date(2024, 1, 7)),
        ];
        let vp = TimelineViewport::fit(&tasks, ViewMode::Day, date(2030, 1, 1));
        assert_eq!(vp.start, date(2023, 12, 29));
        assert_eq!(vp.end, date(2024, 1, 19));
    }

    #[test]
    fn visible_ticks_stay_bounded_on_a_huge_range() {
        // A mistyped year stretches the fitted range over eighteen centuries
        let tasks = vec![Task::new("typo", date(202, 5, 1), date(2025, 5, 3))];
        let vp = TimelineViewport::fit(&tasks, ViewMode::Day, date(2025, 5, 1));
        assert!(vp.total_width() > 1_000_000.0);

        let x = vp.date_to_x(date(2025, 5, 1));
        let (from, to) = vp.visible_range(x, x + 1200.0);
        let ticks = vp.ticks_between(from, to);
        assert!(ticks.len() <= 33, "{} ticks", ticks.len());
        assert!(ticks[0].upper.is_some());
        assert_eq!(ticks.last().unwrap().date, vp.end);
    }

    #[test]
    fn visible_range_is_clamped_to_the_viewport() {
        let vp = TimelineViewport::new(date(2024, 1, 1), date(2024, 1, 31), ViewMode::Day);
        assert_eq!(
            vp.visible_range(-5000.0, 5000.0),
            (date(2024, 1, 1), date(2024, 1, 31))
        );
        assert_eq!(
            vp.visible_range(76.0, 0.0),
            (date(2024, 1, 1), date(2024, 1, 3))
        );
        assert_eq!(vp.ticks_between(date(2023, 6, 1), date(2024, 1, 2)).len(), 2);
    }

    #[test]
    fn view_mode_labels_round_trip_through_serde() {
        for mode in ViewMode::ALL {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.label()));
            assert_eq!(serde_json::from_str::<ViewMode>(&json).unwrap(), mode);
        }
    }
}
