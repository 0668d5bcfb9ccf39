/*
 *  panel.rs
 *
 *  wxpaper - forecast on paper
 *	(c) 2020-26 Stuart Hunter
 *
 *  Forecast tiles: current conditions and three upcoming periods
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

use std::fmt::Write;

use arrayvec::{ArrayString, ArrayVec};
use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use embedded_graphics::{
    mono_font::iso_8859_1::FONT_10X20,
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::Rectangle,
    text::Alignment,
};
use log::{debug, warn};

use crate::constants::{
    AFTERNOON_FIRST_TILE_X, ASTRONOMY_GAP_X, ICON_HEIGHT, ICON_WIDTH, MORNING_FIRST_TILE_X,
    NOW_TILE_X, TILE_CENTER_Y, TILE_STEP_X,
};
use crate::diagnostics::Diagnostics;
use crate::draw::{self, INK};
use crate::forecast::{ForecastRecord, ForecastSeries};
use crate::weather_glyph::{self, IconStore};

/// Tiles shown after the "now" tile.
pub const PANEL_TILES: usize = 3;

pub type TileLabel = ArrayString<24>;

/// Which set of periods the panel shows, from the hour of the wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPart {
    /// before noon: today 12:00 and 18:00, tomorrow 09:00
    Morning,
    /// tomorrow 09:00, 12:00 and 18:00
    Afternoon,
}

impl DayPart {
    pub fn of(now: NaiveDateTime) -> Self {
        if now.hour() < 12 { DayPart::Morning } else { DayPart::Afternoon }
    }

    /// True when `record` is where this branch starts its tiles.
    fn is_anchor(self, record: &ForecastRecord, now: NaiveDateTime) -> bool {
        match self {
            DayPart::Morning => record.hour() == 12,
            DayPart::Afternoon => {
                let tomorrow = (now.weekday().num_days_from_sunday() + 1) % 7;
                record.hour() == 9 && record.weekday_index() == tomorrow
            }
        }
    }

    /// Offsets from the anchor to each tile's period.
    pub fn tile_offsets(self) -> [Duration; PANEL_TILES] {
        match self {
            DayPart::Morning => [Duration::zero(), Duration::hours(6), Duration::hours(21)],
            DayPart::Afternoon => [Duration::zero(), Duration::hours(3), Duration::hours(9)],
        }
    }

    /// Tile centres; the morning row leaves a gap for the astronomy block.
    pub fn tile_positions(self) -> [i32; PANEL_TILES] {
        match self {
            DayPart::Morning => [
                MORNING_FIRST_TILE_X,
                MORNING_FIRST_TILE_X + TILE_STEP_X,
                MORNING_FIRST_TILE_X + 2 * TILE_STEP_X + ASTRONOMY_GAP_X,
            ],
            DayPart::Afternoon => [
                AFTERNOON_FIRST_TILE_X,
                AFTERNOON_FIRST_TILE_X + TILE_STEP_X,
                AFTERNOON_FIRST_TILE_X + 2 * TILE_STEP_X,
            ],
        }
    }
}

/// A forecast period chosen for one of the panel tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedPeriod {
    /// tile position, 0..PANEL_TILES
    pub slot: usize,
    /// index into the series
    pub index: usize,
    pub center_x: i32,
}

/// Pick the periods for the three forecast tiles.
///
/// The anchor is the first record matching the branch predicate; the other
/// tiles take the record nearest to anchor + offset within `tolerance`.
/// Tiles without a match are left out and counted.
pub fn select_forecast_periods(
    series: &ForecastSeries,
    now: NaiveDateTime,
    tolerance: Duration,
    diagnostics: &mut Diagnostics,
) -> ArrayVec<SelectedPeriod, PANEL_TILES> {
    let part = DayPart::of(now);
    let mut selected = ArrayVec::new();

    let Some((anchor_index, anchor)) = series.first_where(|r| part.is_anchor(r, now)) else {
        warn!("No {:?} anchor period in {} records, forecast tiles skipped", part, series.record_count());
        diagnostics.unmatched_periods += PANEL_TILES;
        return selected;
    };

    let positions = part.tile_positions();
    for (slot, offset) in part.tile_offsets().into_iter().enumerate() {
        let found = if slot == 0 {
            Some(anchor_index)
        } else {
            series.nearest_to(anchor.timestamp + offset, tolerance).map(|(i, _)| i)
        };

        match found {
            Some(index) => selected.push(SelectedPeriod { slot, index, center_x: positions[slot] }),
            None => {
                warn!("No period near {} for tile {}", anchor.timestamp + offset, slot);
                diagnostics.unmatched_periods += 1;
            }
        }
    }

    debug!("{:?} tiles: {:?}", part, selected);
    selected
}

/// "9am Thu" style label for a period.
pub fn period_label(record: &ForecastRecord) -> TileLabel {
    let hour = record.hour();
    let (clock, suffix) = match hour {
        0 => (12, "am"),
        1..=11 => (hour, "am"),
        12 => (12, "pm"),
        _ => (hour - 12, "pm"),
    };
    let mut label = TileLabel::new();
    let _ = write!(label, "{}{} {}", clock, suffix, record.weekday_name());
    label
}

/// "Now (Wed)"
pub fn now_label(record: &ForecastRecord) -> TileLabel {
    let mut label = TileLabel::new();
    let _ = write!(label, "Now ({})", record.weekday_name());
    label
}

/// One tile centred on (`center.x`, `center.y`): icon, frame, title and temperature.
pub fn draw_conditions_tile<D, I>(
    target: &mut D,
    center: Point,
    record: &ForecastRecord,
    title: &str,
    icons: &I,
    diagnostics: &mut Diagnostics,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
    I: IconStore + ?Sized,
{
    let (x, y) = (center.x, center.y);
    let icon = weather_glyph::resolve_icon(record.condition_code, diagnostics);
    let icon_origin = Point::new(x - 80, y - 80);

    match icons.bitmap(icon) {
        Some(raw) => draw::draw_bitmap(target, &raw, icon_origin)?,
        None => {
            debug!("No bitmap for {}, drawing label", icon.slug());
            diagnostics.missing_icons += 1;
            let area = Rectangle::new(icon_origin, Size::new(ICON_WIDTH, ICON_HEIGHT));
            draw::draw_text_region_center(target, icon.label(), area, &FONT_10X20)?;
        }
    }

    draw::draw_rectangle(target, Point::new(x - 86, y - 131), 173, 228, None, Some(1), Some(INK))?;
    draw::draw_text(target, title, Point::new(x, y - 106), &FONT_10X20, Alignment::Center)?;

    let mut temperature = ArrayString::<16>::new();
    let _ = write!(temperature, "{:.1}°C", record.temperature);
    draw::draw_text(target, &temperature, Point::new(x, y + 58), &FONT_10X20, Alignment::Center)?;
    Ok(())
}

/// Tile for the current period, record 0. Nothing is drawn for an empty series.
pub fn draw_now_tile<D, I>(
    target: &mut D,
    series: &ForecastSeries,
    icons: &I,
    diagnostics: &mut Diagnostics,
) -> Result<bool, D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
    I: IconStore + ?Sized,
{
    let Some(current) = series.get(0) else {
        warn!("Empty forecast, no current conditions");
        diagnostics.unmatched_periods += 1;
        return Ok(false);
    };
    let title = now_label(current);
    draw_conditions_tile(target, Point::new(NOW_TILE_X, TILE_CENTER_Y), current, &title, icons, diagnostics)?;
    Ok(true)
}

/// Draw the three forecast tiles for the wake time `now`; returns how many were drawn.
pub fn draw_forecast_panel<D, I>(
    target: &mut D,
    series: &ForecastSeries,
    now: NaiveDateTime,
    tolerance: Duration,
    icons: &I,
    diagnostics: &mut Diagnostics,
) -> Result<usize, D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
    I: IconStore + ?Sized,
{
    let selected = select_forecast_periods(series, now, tolerance, diagnostics);
    for period in &selected {
        if let Some(record) = series.get(period.index) {
            let title = period_label(record);
            draw_conditions_tile(
                target,
                Point::new(period.center_x, TILE_CENTER_Y),
                record,
                &title,
                icons,
                diagnostics,
            )?;
        }
    }
    Ok(selected.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::PAPER;
    use crate::vframebuf::VarFrameBuf;
    use crate::weather_glyph::NoIcons;
    use chrono::NaiveDate;

    // 2024-06-19 is a Wednesday
    fn wed(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 19).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    fn series_from(start: NaiveDateTime, step_hours: i64, count: usize) -> ForecastSeries {
        let mut series = ForecastSeries::with_capacity(count);
        for i in 0..count {
            let ts = start + Duration::hours(step_hours * i as i64);
            series.append(ForecastRecord::new(ts, 10.0 + i as f32, 20.0, 3)).unwrap();
        }
        series
    }

    fn tolerance() -> Duration {
        Duration::minutes(90)
    }

    #[test]
    fn test_morning_selection() {
        let series = series_from(wed(6), 3, 16);
        let mut diag = Diagnostics::new();
        let tiles = select_forecast_periods(&series, wed(7), tolerance(), &mut diag);

        let indices: Vec<usize> = tiles.iter().map(|t| t.index).collect();
        // Wed 12:00, Wed 18:00, Thu 09:00
        assert_eq!(indices, vec![2, 4, 9]);
        let xs: Vec<i32> = tiles.iter().map(|t| t.center_x).collect();
        assert_eq!(xs, vec![258, 430, 711]);
        assert!(diag.is_clean());
        assert_eq!(period_label(series.get(9).unwrap()).as_str(), "9am Thu");
    }

    #[test]
    fn test_afternoon_selection() {
        let series = series_from(wed(15), 3, 16);
        let mut diag = Diagnostics::new();
        let tiles = select_forecast_periods(&series, wed(14), tolerance(), &mut diag);

        let indices: Vec<usize> = tiles.iter().map(|t| t.index).collect();
        // Thu 09:00, 12:00, 18:00
        assert_eq!(indices, vec![6, 7, 9]);
        let xs: Vec<i32> = tiles.iter().map(|t| t.center_x).collect();
        assert_eq!(xs, vec![367, 539, 711]);
        assert!(diag.is_clean());
        assert_eq!(period_label(series.get(7).unwrap()).as_str(), "12pm Thu");
        assert_eq!(period_label(series.get(9).unwrap()).as_str(), "6pm Thu");
    }

    #[test]
    fn test_hourly_feed_still_finds_clock_times() {
        let series = series_from(wed(6), 1, 40);
        let mut diag = Diagnostics::new();
        let tiles = select_forecast_periods(&series, wed(8), tolerance(), &mut diag);
        let hours: Vec<u32> = tiles.iter().map(|t| series.get(t.index).unwrap().hour()).collect();
        assert_eq!(hours, vec![12, 18, 9]);
    }

    #[test]
    fn test_truncated_series_omits_tiles() {
        // last record Thu 12:00
        let series = series_from(wed(15), 3, 8);
        let mut diag = Diagnostics::new();
        let tiles = select_forecast_periods(&series, wed(16), tolerance(), &mut diag);

        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[1].slot, 1);
        assert_eq!(diag.unmatched_periods, 1);
    }

    #[test]
    fn test_missing_anchor_draws_nothing() {
        // 13:00 onwards on a two hour step never lands on noon or 09:00
        let series = series_from(wed(13), 2, 10);
        let mut diag = Diagnostics::new();
        let mut fb = VarFrameBuf::new(800, 480, PAPER);
        let drawn = draw_forecast_panel(&mut fb, &series, wed(9), tolerance(), &NoIcons, &mut diag).unwrap();

        assert_eq!(drawn, 0);
        assert_eq!(fb.count(INK), 0);
        assert_eq!(diag.unmatched_periods, PANEL_TILES);
    }

    #[test]
    fn test_labels() {
        let at = |h| ForecastRecord::new(wed(h), 0.0, 0.0, 1);
        assert_eq!(period_label(&at(0)).as_str(), "12am Wed");
        assert_eq!(period_label(&at(12)).as_str(), "12pm Wed");
        assert_eq!(period_label(&at(15)).as_str(), "3pm Wed");
        assert_eq!(now_label(&at(15)).as_str(), "Now (Wed)");
    }

    #[test]
    fn test_tiles_without_bitmaps_draw_labels() {
        let series = series_from(wed(15), 3, 16);
        let mut diag = Diagnostics::new();
        let mut fb = VarFrameBuf::new(800, 480, PAPER);

        assert!(draw_now_tile(&mut fb, &series, &NoIcons, &mut diag).unwrap());
        let drawn = draw_forecast_panel(&mut fb, &series, wed(14), tolerance(), &NoIcons, &mut diag).unwrap();

        assert_eq!(drawn, 3);
        assert_eq!(diag.missing_icons, 4);
        assert_eq!(diag.unrecognized_codes, 0);
        // frame corners of the first forecast tile
        assert_eq!(fb.pixel(Point::new(367 - 86, 1)), Some(INK));
        assert_eq!(fb.pixel(Point::new(367 - 86, 228)), Some(INK));
        // icon area holds the label text
        let icon_area = Rectangle::new(Point::new(367 - 80, 52), Size::new(160, 128));
        assert!(fb.count_in(&icon_area, INK) > 0);
    }

    #[test]
    fn test_unknown_code_counts_fallback() {
        let mut series = ForecastSeries::new();
        series.append(ForecastRecord::new(wed(15), 20.0, 0.0, 4)).unwrap();
        let mut diag = Diagnostics::new();
        let mut fb = VarFrameBuf::new(800, 480, PAPER);
        draw_now_tile(&mut fb, &series, &NoIcons, &mut diag).unwrap();
        assert_eq!(diag.unrecognized_codes, 1);
    }
}
