/*
 *  astral.rs
 *
 *  wxpaper - forecast on paper
 *	(c) 2020-26 Stuart Hunter
 *
 *  Sunrise, sunset and moon phase for the astronomy block
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

use arrayvec::ArrayString;
use chrono::{DateTime, NaiveDate, Utc};
use embedded_graphics::{
    mono_font::iso_8859_1::FONT_10X20,
    pixelcolor::BinaryColor,
    prelude::*,
    text::Alignment,
};
use log::{debug, info, warn};

use crate::constants::{
    DST_SHIFT_MINUTES, MINUTES_PER_DAY, MOON_DIAMETER, MOON_X, MOON_Y, SUNRISE_TEXT_Y, SUNSET_TEXT_Y, SUN_TEXT_X,
};
use crate::diagnostics::Diagnostics;
use crate::draw;
use crate::glyphs::{GLYPH_SUNRISE, GLYPH_SUNSET};
use crate::location::Location;
use crate::moon::{self, MoonReading};
use crate::sun::{self, SunMinutes};

/// Source of solar and lunar positions.
pub trait Ephemeris {
    /// Sunrise and sunset for a civil date, minutes after local standard midnight.
    fn sun_times(&self, latitude: f64, longitude: f64, elevation: f64, date: NaiveDate) -> SunMinutes;

    /// Lunar phase at `instant`, counted from `epoch`.
    fn moon_phase(&self, epoch: DateTime<Utc>, instant: DateTime<Utc>) -> MoonReading;
}

/// NOAA sunrise equation plus mean lunar age, reported in a fixed standard
/// time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEphemeris {
    /// local standard time minus UTC
    pub standard_offset_minutes: i32,
}

impl StandardEphemeris {
    pub fn new(standard_offset_minutes: i32) -> Self {
        Self { standard_offset_minutes }
    }
}

impl Ephemeris for StandardEphemeris {
    fn sun_times(&self, latitude: f64, longitude: f64, elevation: f64, date: NaiveDate) -> SunMinutes {
        sun::sun_minutes_utc(latitude, longitude, elevation, date).shifted(self.standard_offset_minutes)
    }

    fn moon_phase(&self, epoch: DateTime<Utc>, instant: DateTime<Utc>) -> MoonReading {
        moon::moon_reading(epoch, instant)
    }
}

/// Astronomical data for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AstronomyResult {
    /// minutes after local midnight, None if the sun does not rise
    pub sunrise_minutes: Option<i32>,
    pub sunset_minutes: Option<i32>,
    /// 0 and 1 full, 0.5 new
    pub moon_phase_fraction: f64,
    pub moon_illuminated: f64,
    /// daylight saving shift applied to the sun times
    pub dst: bool,
}

impl AstronomyResult {
    pub fn sunrise_text(&self) -> ArrayString<5> {
        format_hhmm(self.sunrise_minutes)
    }

    pub fn sunset_text(&self) -> ArrayString<5> {
        format_hhmm(self.sunset_minutes)
    }
}

/// `HH:MM` for a minute of the day, `--:--` when there is none.
pub fn format_hhmm(minutes: Option<i32>) -> ArrayString<5> {
    let mut out = ArrayString::<5>::new();
    match minutes {
        Some(m) if (0..MINUTES_PER_DAY).contains(&m) => {
            let _ = write!(out, "{:02}:{:02}", m / 60, m % 60);
        }
        _ => out.push_str("--:--"),
    }
    out
}

/// Sun and moon for the wake instant.
///
/// `date` is the local civil date. With `dst` set, both sun times move
/// forward one hour.
pub fn compute_astronomy<E>(
    ephemeris: &E,
    location: &Location,
    date: NaiveDate,
    instant: DateTime<Utc>,
    dst: bool,
) -> AstronomyResult
where
    E: Ephemeris + ?Sized,
{
    let mut times = ephemeris.sun_times(location.latitude, location.longitude, location.elevation, date);
    if dst {
        times = times.shifted(DST_SHIFT_MINUTES);
    }

    let reading = ephemeris.moon_phase(DateTime::<Utc>::UNIX_EPOCH, instant);
    let result = AstronomyResult {
        sunrise_minutes: times.sunrise,
        sunset_minutes: times.sunset,
        moon_phase_fraction: moon::phase_fraction(reading.angle),
        moon_illuminated: reading.illuminated,
        dst,
    };
    info!("Sunrise {} sunset {} (dst {}), moon angle {:.1} lit {:.0}%",
        result.sunrise_text(), result.sunset_text(), dst, reading.angle, reading.illuminated * 100.0);
    result
}

/// Draw the sun times and moon disk, shifted right by `x_offset`.
pub fn draw_astronomy<D>(
    target: &mut D,
    astronomy: &AstronomyResult,
    x_offset: i32,
    diagnostics: &mut Diagnostics,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    debug!("astronomy block at offset {}", x_offset);
    let text_x = SUN_TEXT_X + x_offset;

    for (minutes, glyph, y, what) in [
        (astronomy.sunrise_minutes, &GLYPH_SUNRISE, SUNRISE_TEXT_Y, "rise"),
        (astronomy.sunset_minutes, &GLYPH_SUNSET, SUNSET_TEXT_Y, "set"),
    ] {
        if minutes.is_none() {
            warn!("Sun does not {} today", what);
            diagnostics.unmatched_periods += 1;
        }
        draw::draw_glyph(target, glyph, Point::new(text_x - 14, y + 6))?;
        draw::draw_text(target, &format_hhmm(minutes), Point::new(text_x, y), &FONT_10X20, Alignment::Left)?;
    }

    moon::draw_moon(
        target,
        Point::new(MOON_X + x_offset, MOON_Y),
        MOON_DIAMETER,
        astronomy.moon_phase_fraction,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{INK, PAPER};
    use crate::vframebuf::VarFrameBuf;
    use chrono::TimeZone;
    use embedded_graphics::primitives::Rectangle;

    /// Fixed answers, for checking the shifts.
    struct FixedEphemeris;

    impl Ephemeris for FixedEphemeris {
        fn sun_times(&self, _: f64, _: f64, _: f64, _: NaiveDate) -> SunMinutes {
            SunMinutes { sunrise: Some(6 * 60 + 5), sunset: Some(23 * 60 + 30) }
        }

        fn moon_phase(&self, _: DateTime<Utc>, _: DateTime<Utc>) -> MoonReading {
            MoonReading { angle: 90.0, illuminated: 0.5 }
        }
    }

    fn noon(y: i32, m: u32, d: u32) -> (NaiveDate, DateTime<Utc>) {
        (NaiveDate::from_ymd_opt(y, m, d).unwrap(), Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_format() {
        assert_eq!(format_hhmm(Some(235)).as_str(), "03:55");
        assert_eq!(format_hhmm(Some(0)).as_str(), "00:00");
        assert_eq!(format_hhmm(Some(1439)).as_str(), "23:59");
        assert_eq!(format_hhmm(None).as_str(), "--:--");
    }

    #[test]
    fn test_dst_shift_wraps() {
        let (date, instant) = noon(2024, 6, 21);
        let summer = compute_astronomy(&FixedEphemeris, &Location::default(), date, instant, true);
        assert_eq!(summer.sunrise_minutes, Some(7 * 60 + 5));
        assert_eq!(summer.sunset_minutes, Some(30));
        assert!(summer.dst);
        assert_eq!(summer.moon_phase_fraction, 0.75);

        let winter = compute_astronomy(&FixedEphemeris, &Location::default(), date, instant, false);
        assert_eq!(winter.sunrise_text().as_str(), "06:05");
    }

    #[test]
    fn test_cardiff_midsummer_local() {
        let (date, instant) = noon(2024, 6, 21);
        let eph = StandardEphemeris::new(0);
        let bst = compute_astronomy(&eph, &Location::default(), date, instant, true);
        // 03:55 and 20:34 UTC, plus one hour
        let rise = bst.sunrise_minutes.unwrap();
        let set = bst.sunset_minutes.unwrap();
        assert!((rise - (4 * 60 + 55)).abs() <= 10, "{}", rise);
        assert!((set - (21 * 60 + 34)).abs() <= 10, "{}", set);
        assert!((0.0..1.0).contains(&bst.moon_phase_fraction));
    }

    #[test]
    fn test_standard_offset() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let utc = StandardEphemeris::new(0).sun_times(51.48, -3.18, 0.0, date);
        let cet = StandardEphemeris::new(60).sun_times(51.48, -3.18, 0.0, date);
        assert_eq!(cet.sunrise.unwrap() - utc.sunrise.unwrap(), 60);
    }

    #[test]
    fn test_polar_night_renders_dashes() {
        let result = AstronomyResult {
            sunrise_minutes: None,
            sunset_minutes: None,
            moon_phase_fraction: 0.5,
            moon_illuminated: 0.0,
            dst: false,
        };
        let mut fb = VarFrameBuf::new(800, 480, PAPER);
        let mut diag = Diagnostics::new();
        draw_astronomy(&mut fb, &result, 0, &mut diag).unwrap();
        assert_eq!(diag.unmatched_periods, 2);
        // new moon disk is solid around its centre
        assert_eq!(fb.pixel(Point::new(MOON_X + 69, MOON_Y + 70)), Some(INK));
    }

    #[test]
    fn test_offset_moves_block() {
        let (date, instant) = noon(2024, 3, 20);
        let result = compute_astronomy(&StandardEphemeris::default(), &Location::default(), date, instant, false);
        let mut fb = VarFrameBuf::new(800, 480, PAPER);
        let mut diag = Diagnostics::new();
        draw_astronomy(&mut fb, &result, 346, &mut diag).unwrap();
        assert!(diag.is_clean());

        let home = Rectangle::new(Point::new(150, 30), Size::new(120, 180));
        let shifted = Rectangle::new(Point::new(496, 30), Size::new(120, 180));
        assert_eq!(fb.count_in(&home, INK), 0);
        assert!(fb.count_in(&shifted, INK) > 0);
    }
}
