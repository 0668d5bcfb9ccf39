//! This module contains global constants used across the renderers and the wake cycle.

/// The total width of the e-paper panel in pixels (landscape).
pub const DISPLAY_WIDTH: u32 = 800;
/// The total height of the e-paper panel in pixels.
pub const DISPLAY_HEIGHT: u32 = 480;

/// Default observer position, Cardiff.
pub const HOME_LATITUDE: f64 = 51.481312;
pub const HOME_LONGITUDE: f64 = -3.180500;

/// 5 days at 3 hourly resolution
pub const MAX_FORECAST_RECORDS: usize = 40;

/// Fixed one hour shift applied to sun times while daylight saving is in effect.
pub const DST_SHIFT_MINUTES: i32 = 60;

/// How far a record may sit from a target clock time and still represent it.
pub const DEFAULT_MATCH_TOLERANCE_MINUTES: i64 = 90;

pub const MINUTES_PER_DAY: i32 = 24 * 60;

// Day of the week, indexed from Sunday
pub const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Short weekday name for a Sunday based index, empty when out of range.
pub fn weekday_name(index: u32) -> &'static str {
    WEEKDAY_NAMES.get(index as usize).copied().unwrap_or("")
}

// Chart placement
pub const CHART_TOP: i32 = 245;
pub const CHART_HEIGHT: u32 = 200;
pub const TEMP_CHART_X: i32 = 30;
pub const TEMP_CHART_WIDTH: u32 = 350;
pub const RAIN_CHART_X: i32 = 420;
pub const RAIN_CHART_WIDTH: u32 = 360;

/// Y-axis division markers per chart.
pub const CHART_GRID_DIVISIONS: i32 = 5;
/// Dashes per horizontal gridline.
pub const CHART_GRID_DASHES: i32 = 20;

// Forecast tiles, positions are the tile centre
pub const TILE_CENTER_Y: i32 = 132;
pub const NOW_TILE_X: i32 = 86;
pub const TILE_STEP_X: i32 = 172;
/// Extra gap left in the morning layout for the astronomy block.
pub const ASTRONOMY_GAP_X: i32 = 109;
pub const MORNING_FIRST_TILE_X: i32 = 367 - ASTRONOMY_GAP_X;
pub const AFTERNOON_FIRST_TILE_X: i32 = 367;

pub const ICON_WIDTH: u32 = 160;
pub const ICON_HEIGHT: u32 = 128;

// Astronomy block
pub const ASTRONOMY_MORNING_OFFSET_X: i32 = 173 * 2;
pub const SUN_TEXT_X: i32 = 187;
pub const SUNRISE_TEXT_Y: i32 = 40;
pub const SUNSET_TEXT_Y: i32 = 70;
pub const MOON_X: i32 = 157;
pub const MOON_Y: i32 = 90;
pub const MOON_DIAMETER: u32 = 70;
/// Horizontal scan rows used to carve the lit part of the moon disk.
pub const MOON_SCAN_LINES: u32 = 90;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_tables() {
        assert_eq!(weekday_name(0), "Sun");
        assert_eq!(weekday_name(6), "Sat");
        assert_eq!(weekday_name(7), "");
    }
}
