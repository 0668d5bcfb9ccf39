/*
 *  chart.rs
 *
 *  wxpaper - forecast on paper
 *	(c) 2020-26 Stuart Hunter
 *
 *  Autoscaled line and bar charts over the forecast periods
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use chrono::{Datelike, NaiveDateTime, Timelike};
use embedded_graphics::{
    mono_font::iso_8859_1::{FONT_7X13, FONT_9X15_BOLD},
    pixelcolor::BinaryColor,
    prelude::*,
    text::Alignment,
};
use log::{debug, warn};

use crate::constants::{self, CHART_GRID_DASHES, CHART_GRID_DIVISIONS};
use crate::diagnostics::Diagnostics;
use crate::draw::{self, INK};

/// How samples are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Thick filled line between consecutive samples
    Line,
    /// One filled bar per sample, down to the axis
    Bar,
}

/// Per-call chart description.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec<'a> {
    /// Axis range used as-is without autoscale, and as the fallback when
    /// the series holds no usable samples
    pub value_range: (f32, f32),
    pub autoscale: bool,
    pub mode: RenderMode,
    pub title: &'a str,
}

/// Vertical axis range actually drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub min: f32,
    pub max: f32,
}

impl AxisBounds {
    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// Value at gridline `step` of `divisions`, counted down from the top.
    pub fn gridline_value(&self, step: i32, divisions: i32) -> f32 {
        self.max - self.span() / divisions as f32 * step as f32
    }

    /// Pixel row of `value` in a plot `height` pixels tall starting at `top`,
    /// values outside the bounds are pinned to the edges.
    pub fn to_row(&self, value: f32, top: i32, height: u32) -> i32 {
        let v = value.clamp(self.min, self.max);
        top + ((self.max - v) / self.span() * height as f32) as i32
    }
}

/// Upper bound steps: an observed maximum above the threshold snaps to the
/// bound. Checked highest first.
const UPPER_STEPS: [(f32, f32); 4] = [
    (30.0, 40.0),
    (20.0, 30.0),
    (10.0, 20.0),
    (0.0, 10.0),
];

/// Highest threshold covered by the step table.
const UPPER_STEP_LIMIT: f32 = 40.0;

/// Upper axis bound for an observed maximum.
///
/// Maxima in (0, 40] snap to the next step of 10; anything above 40 or at
/// or below 0 is rounded up to the next whole unit plus one, which keeps the
/// bound strictly above the data.
pub fn upper_bound(max: f32) -> f32 {
    if max > 0.0 && max <= UPPER_STEP_LIMIT {
        if let Some((_, bound)) = UPPER_STEPS.iter().find(|(threshold, _)| max > *threshold) {
            return *bound;
        }
    }
    (max.ceil() + 0.5).ceil()
}

/// Lower axis bound: 0 unless the data goes negative.
pub fn lower_bound(min: f32) -> f32 {
    if min < 0.0 { min.floor() } else { 0.0 }
}

/// Axis bounds derived from `values`. NaN samples are ignored; with no
/// usable sample the `fallback` range is returned unchanged.
pub fn autoscale_bounds(values: &[f32], fallback: (f32, f32)) -> AxisBounds {
    let (min, max) = values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if min > max {
        return AxisBounds { min: fallback.0, max: fallback.1 };
    }
    AxisBounds {
        min: lower_bound(min),
        max: upper_bound(max),
    }
}

fn resolve_bounds(spec: &ChartSpec<'_>, values: &[f32]) -> AxisBounds {
    let bounds = if spec.autoscale {
        autoscale_bounds(values, spec.value_range)
    } else {
        AxisBounds { min: spec.value_range.0, max: spec.value_range.1 }
    };

    if bounds.span() > 0.0 {
        bounds
    } else {
        warn!("{}: empty axis range {}..{}, widening", spec.title, bounds.min, bounds.max);
        AxisBounds { min: bounds.min, max: bounds.min + 1.0 }
    }
}

fn axis_label(value: f32) -> String {
    let rounded = value.round();
    // no "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.0}", rounded)
}

/// Draw one chart with its frame at `origin`, `size` being the plot area.
///
/// `values` and `timestamps` run in parallel, one entry per forecast period;
/// extra entries in the longer slice are ignored. Fewer than two samples
/// leave an empty chart (frame, title and grid only).
pub fn draw_chart<D>(
    target: &mut D,
    origin: Point,
    size: Size,
    spec: &ChartSpec<'_>,
    values: &[f32],
    timestamps: &[NaiveDateTime],
    diagnostics: &mut Diagnostics,
) -> Result<AxisBounds, D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let (x, y) = (origin.x, origin.y);
    let (w, h) = (size.width, size.height);
    let samples = values.len().min(timestamps.len());
    let bounds = resolve_bounds(spec, &values[..samples]);
    debug!("chart {} at {},{} {}x{}: {} samples, axis {}..{}",
        spec.title, x, y, w, h, samples, bounds.min, bounds.max);

    draw::draw_rectangle(target, origin, w + 3, h + 2, None, Some(1), Some(INK))?;
    draw::draw_text(
        target,
        spec.title,
        Point::new(x + w as i32 / 2, y - 15),
        &FONT_9X15_BOLD,
        Alignment::Center,
    )?;

    for step in 0..=CHART_GRID_DIVISIONS {
        let row = y + h as i32 * step / CHART_GRID_DIVISIONS;
        if step < CHART_GRID_DIVISIONS {
            draw::draw_dashed_hline(target, Point::new(x + 3, row), w, CHART_GRID_DASHES, INK)?;
        }
        let label = axis_label(bounds.gridline_value(step, CHART_GRID_DIVISIONS));
        draw::draw_text(target, &label, Point::new(x - 10, row - 6), &FONT_7X13, Alignment::Right)?;
    }

    if samples < 2 {
        warn!("{}: {} sample(s), nothing to plot", spec.title, samples);
        diagnostics.unmatched_periods += 1;
        return Ok(bounds);
    }

    let slots = (samples - 1) as i32;
    let column = |i: usize| x + i as i32 * w as i32 / slots;

    match spec.mode {
        RenderMode::Bar => {
            let bar_width = (w as i32 / samples as i32 - 1).max(1);
            // bars centred on their column, kept inside the frame border
            let (inner_left, inner_right) = (x + 1, x + w as i32 + 1);
            for (i, &v) in values[..samples].iter().enumerate() {
                if v.is_nan() {
                    continue;
                }
                let left = (column(i) - bar_width / 2).clamp(inner_left, inner_right + 1 - bar_width);
                let top = bounds.to_row(v, y, h);
                let height = (y + h as i32 - top + 2).max(0) as u32;
                draw::draw_rectangle(target, Point::new(left, top), bar_width as u32, height, Some(INK), None, None)?;
            }
        }
        RenderMode::Line => {
            let mut last: Option<Point> = None;
            for (i, &v) in values[..samples].iter().enumerate() {
                if v.is_nan() {
                    last = None;
                    continue;
                }
                let here = Point::new(column(i), bounds.to_row(v, y, h));
                if let Some(prev) = last {
                    draw::fill_triangle(target,
                        Point::new(prev.x, prev.y + 2), Point::new(prev.x, prev.y - 2), Point::new(here.x, here.y + 2), INK)?;
                    draw::fill_triangle(target,
                        Point::new(prev.x, prev.y - 2), Point::new(here.x, here.y + 2), Point::new(here.x, here.y - 1), INK)?;
                }
                last = Some(here);
            }
        }
    }

    let bottom = y + h as i32;
    for (i, ts) in timestamps[..samples].iter().enumerate() {
        let tick = column(i);
        if ts.hour() == 0 {
            // day divider
            draw::draw_line(target, Point::new(tick - 1, y), Point::new(tick - 1, bottom + 20), INK, 1)?;
            draw::draw_line(target, Point::new(tick, y), Point::new(tick, bottom + 20), INK, 1)?;
        } else {
            draw::draw_line(target, Point::new(tick, bottom + 1), Point::new(tick, bottom + 6), INK, 1)?;
        }
        if ts.hour() == 12 {
            let day = constants::weekday_name(ts.weekday().num_days_from_sunday());
            draw::draw_text(target, day, Point::new(tick, bottom + 8), &FONT_7X13, Alignment::Center)?;
        }
    }

    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::PAPER;
    use crate::vframebuf::VarFrameBuf;
    use chrono::{Duration, NaiveDate};
    use embedded_graphics::primitives::Rectangle;

    fn hours_from(day: u32, hour: u32, count: usize) -> Vec<NaiveDateTime> {
        let start = NaiveDate::from_ymd_opt(2024, 3, day).unwrap().and_hms_opt(hour, 0, 0).unwrap();
        (0..count).map(|i| start + Duration::hours(3 * i as i64)).collect()
    }

    #[test]
    fn test_upper_bound_steps() {
        assert_eq!(upper_bound(0.01), 10.0);
        assert_eq!(upper_bound(9.99), 10.0);
        assert_eq!(upper_bound(10.0), 10.0);
        assert_eq!(upper_bound(10.01), 20.0);
        assert_eq!(upper_bound(19.9), 20.0);
        assert_eq!(upper_bound(20.0), 20.0);
        assert_eq!(upper_bound(20.5), 30.0);
        assert_eq!(upper_bound(30.0), 30.0);
        assert_eq!(upper_bound(30.01), 40.0);
        assert_eq!(upper_bound(40.0), 40.0);
    }

    #[test]
    fn test_upper_bound_outside_table() {
        assert_eq!(upper_bound(40.2), 42.0);
        assert_eq!(upper_bound(57.0), 58.0);
        assert_eq!(upper_bound(0.0), 1.0);
        assert_eq!(upper_bound(-1.2), 0.0);
        assert_eq!(upper_bound(-3.0), -2.0);
    }

    #[test]
    fn test_mixed_series_scales_to_forty() {
        let bounds = autoscale_bounds(&[5.0, 12.0, 38.0, 9.0], (10.0, 30.0));
        assert_eq!(bounds, AxisBounds { min: 0.0, max: 40.0 });
    }

    #[test]
    fn test_negative_minimum_floors() {
        let bounds = autoscale_bounds(&[-3.2, 4.0, 1.0], (10.0, 30.0));
        assert_eq!(bounds, AxisBounds { min: -4.0, max: 10.0 });

        let bounds = autoscale_bounds(&[-0.5, 0.0], (10.0, 30.0));
        assert_eq!(bounds.min, -1.0);
    }

    #[test]
    fn test_non_positive_series_keeps_positive_span() {
        for series in [vec![-5.5, -1.2], vec![-3.0, -3.0], vec![0.0, 0.0], vec![-0.1]] {
            let bounds = autoscale_bounds(&series, (10.0, 30.0));
            assert!(bounds.span() > 0.0, "{:?} -> {:?}", series, bounds);
            assert!(series.iter().all(|v| *v >= bounds.min && *v < bounds.max));
        }
    }

    #[test]
    fn test_no_usable_samples_keeps_range() {
        assert_eq!(autoscale_bounds(&[], (10.0, 30.0)), AxisBounds { min: 10.0, max: 30.0 });
        assert_eq!(autoscale_bounds(&[f32::NAN], (0.0, 100.0)), AxisBounds { min: 0.0, max: 100.0 });
        assert_eq!(autoscale_bounds(&[f32::NAN, 12.0], (0.0, 100.0)).max, 20.0);
    }

    #[test]
    fn test_axis_labels() {
        let bounds = AxisBounds { min: 0.0, max: 40.0 };
        let labels: Vec<String> = (0..=5).map(|s| axis_label(bounds.gridline_value(s, 5))).collect();
        assert_eq!(labels, ["40", "32", "24", "16", "8", "0"]);
        assert_eq!(axis_label(-0.2), "0");
    }

    #[test]
    fn test_row_mapping_clamps() {
        let bounds = AxisBounds { min: 0.0, max: 100.0 };
        assert_eq!(bounds.to_row(100.0, 10, 200), 10);
        assert_eq!(bounds.to_row(0.0, 10, 200), 210);
        assert_eq!(bounds.to_row(50.0, 10, 200), 110);
        assert_eq!(bounds.to_row(150.0, 10, 200), 10);
        assert_eq!(bounds.to_row(-5.0, 10, 200), 210);
    }

    fn spec(mode: RenderMode, autoscale: bool) -> ChartSpec<'static> {
        ChartSpec { value_range: (0.0, 100.0), autoscale, mode, title: "Test" }
    }

    #[test]
    fn test_single_sample_draws_empty_chart() {
        let mut fb = VarFrameBuf::new(300, 300, PAPER);
        let mut diag = Diagnostics::new();
        let ts = hours_from(4, 12, 1);
        let bounds = draw_chart(&mut fb, Point::new(40, 40), Size::new(200, 200),
            &spec(RenderMode::Bar, false), &[50.0], &ts, &mut diag).unwrap();

        assert_eq!(bounds, AxisBounds { min: 0.0, max: 100.0 });
        assert_eq!(diag.unmatched_periods, 1);
        // title centred over the plot: 36 px wide around x = 140
        let title = Rectangle::new(Point::new(122, 25), Size::new(36, 15));
        assert!(fb.count_in(&title, INK) > 0);
        assert_eq!(fb.count_in(&Rectangle::new(Point::new(95, 25), Size::new(25, 15)), INK), 0);
        assert_eq!(fb.count_in(&Rectangle::new(Point::new(160, 25), Size::new(25, 15)), INK), 0);
        // frame corner present, plot interior below the last gridline untouched
        assert_eq!(fb.pixel(Point::new(40, 40)), Some(INK));
        let interior = Rectangle::new(Point::new(45, 205), Size::new(190, 30));
        assert_eq!(fb.count_in(&interior, INK), 0);
    }

    #[test]
    fn test_bars_fill_to_axis() {
        let mut fb = VarFrameBuf::new(300, 300, PAPER);
        let mut diag = Diagnostics::new();
        let ts = hours_from(4, 3, 4);
        draw_chart(&mut fb, Point::new(40, 40), Size::new(200, 200),
            &spec(RenderMode::Bar, false), &[100.0, 0.0, 50.0, 0.0], &ts, &mut diag).unwrap();

        assert!(diag.is_clean());
        // first bar spans the full height
        assert_eq!(fb.pixel(Point::new(42, 60)), Some(INK));
        assert_eq!(fb.pixel(Point::new(42, 230)), Some(INK));
        // third bar starts halfway down
        let third = 40 + 2 * 200 / 3;
        assert_eq!(fb.pixel(Point::new(third, 130)), Some(PAPER));
        assert_eq!(fb.pixel(Point::new(third, 160)), Some(INK));
    }

    #[test]
    fn test_bars_stay_inside_frame() {
        let mut fb = VarFrameBuf::new(420, 300, PAPER);
        let mut diag = Diagnostics::new();
        let ts = hours_from(4, 3, 40);
        let values = [100.0; 40];
        draw_chart(&mut fb, Point::new(20, 40), Size::new(360, 200),
            &spec(RenderMode::Bar, false), &values, &ts, &mut diag).unwrap();

        // frame border at x = 20 and x = 382
        assert_eq!(fb.pixel(Point::new(382, 150)), Some(INK));
        let outside = Rectangle::new(Point::new(383, 45), Size::new(30, 190));
        assert_eq!(fb.count_in(&outside, INK), 0);
        // last bar reaches the border, first starts just inside it
        assert_eq!(fb.pixel(Point::new(381, 150)), Some(INK));
        assert_eq!(fb.pixel(Point::new(21, 150)), Some(INK));
    }

    #[test]
    fn test_degenerate_fixed_range_widens() {
        let mut fb = VarFrameBuf::new(300, 300, PAPER);
        let mut diag = Diagnostics::new();
        let ts = hours_from(4, 3, 3);
        let flat = ChartSpec { value_range: (5.0, 5.0), autoscale: false, mode: RenderMode::Line, title: "Flat" };
        let bounds = draw_chart(&mut fb, Point::new(40, 40), Size::new(200, 200),
            &flat, &[5.0, 5.5, 6.0], &ts, &mut diag).unwrap();

        assert_eq!(bounds, AxisBounds { min: 5.0, max: 6.0 });
        assert!(diag.is_clean());
    }

    #[test]
    fn test_midnight_divider_and_noon_label() {
        let mut fb = VarFrameBuf::new(400, 300, PAPER);
        let mut diag = Diagnostics::new();
        // 18:00, 21:00, 00:00, 03:00 ... 15:00
        let ts = hours_from(4, 18, 8);
        let values = [12.0, 11.0, 10.0, 9.0, 9.0, 11.0, 14.0, 15.0];
        let bounds = draw_chart(&mut fb, Point::new(40, 40), Size::new(280, 200),
            &spec(RenderMode::Line, true), &values, &ts, &mut diag).unwrap();

        assert_eq!(bounds, AxisBounds { min: 0.0, max: 20.0 });
        let midnight = 40 + 2 * 280 / 7;
        // divider runs below the frame, ordinary ticks do not
        assert_eq!(fb.pixel(Point::new(midnight, 255)), Some(INK));
        assert_eq!(fb.pixel(Point::new(midnight - 1, 255)), Some(INK));
        assert_eq!(fb.pixel(Point::new(40 + 280 / 7, 255)), Some(PAPER));
        // weekday text under the 12:00 sample
        let noon = 40 + 6 * 280 / 7;
        let label = Rectangle::new(Point::new(noon - 12, 248), Size::new(24, 13));
        assert!(fb.count_in(&label, INK) > 0);
    }

    #[test]
    fn test_line_gap_on_nan() {
        let mut fb = VarFrameBuf::new(300, 300, PAPER);
        let mut diag = Diagnostics::new();
        let ts = hours_from(4, 3, 3);
        draw_chart(&mut fb, Point::new(40, 40), Size::new(200, 200),
            &spec(RenderMode::Line, false), &[50.0, f32::NAN, 50.0], &ts, &mut diag).unwrap();
        // nothing drawn between the samples on the value row
        assert_eq!(fb.pixel(Point::new(100, 140)), Some(PAPER));
    }
}
