/*
 *  moon.rs
 *
 *  wxpaper - forecast on paper
 *	(c) 2020-26 Stuart Hunter
 *
 *  Lunar phase and the moon disk
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
//! Mean lunar age from the synodic month, and the scanline phase render.

use chrono::{DateTime, Utc};
use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::PrimitiveStyle,
};

use crate::constants::MOON_SCAN_LINES;
use crate::draw::{self, INK, PAPER};

/// Mean synodic month, days
pub const SYNODIC_MONTH_DAYS: f64 = 29.530588853;
/// Julian day of 1970-01-01T00:00Z
const UNIX_EPOCH_JULIAN_DAY: f64 = 2440587.5;
/// Julian day of the new moon of 2000-01-06 18:14 UTC
const REFERENCE_NEW_MOON_JD: f64 = 2451550.1;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Lunar phase at an instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonReading {
    /// 0 = new, 180 = full, degrees in [0, 360)
    pub angle: f64,
    /// lit share of the disk, 0..=1
    pub illuminated: f64,
}

pub fn julian_day(instant: DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / MILLIS_PER_DAY + UNIX_EPOCH_JULIAN_DAY
}

/// Phase at `instant`, counted in days from `epoch`.
pub fn moon_reading(epoch: DateTime<Utc>, instant: DateTime<Utc>) -> MoonReading {
    let elapsed = (instant - epoch).num_milliseconds() as f64 / MILLIS_PER_DAY;
    let jd = julian_day(epoch) + elapsed;
    let age = ((jd - REFERENCE_NEW_MOON_JD) / SYNODIC_MONTH_DAYS).rem_euclid(1.0);
    let angle = age * 360.0;
    MoonReading {
        angle,
        illuminated: (1.0 - angle.to_radians().cos()) / 2.0,
    }
}

/// Phase angle to the render fraction: 0 full, 0.5 new, wrapped into [0, 1).
pub fn phase_fraction(angle: f64) -> f64 {
    let fraction = ((angle + 180.0) / 360.0).rem_euclid(1.0);
    if fraction >= 1.0 { 0.0 } else { fraction }
}

/// Draw the moon for `phase` (0 and 1 full, 0.5 new).
///
/// The disk of `diameter` is centred on (x + diameter - 1, y + diameter).
/// It is filled dark, then each scan row erases the lit chord between the
/// terminator and the limb, and the outline is drawn last.
pub fn draw_moon<D>(
    target: &mut D,
    origin: Point,
    diameter: u32,
    phase: f64,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let center = Point::new(origin.x + diameter as i32 - 1, origin.y + diameter as i32);
    let radius = diameter / 2;
    draw::draw_circle_from_center(target, center, radius + 1, PrimitiveStyle::with_fill(INK))?;

    let r = radius as f64;
    let half_rows = MOON_SCAN_LINES / 2;
    for row in 0..=half_rows {
        let yk = row as f64 / half_rows as f64;
        let xk = (1.0 - yk * yk).max(0.0).sqrt();
        let chord = 2.0 * xk;
        let (x1, x2) = if phase < 0.5 {
            (-xk, chord - 2.0 * phase * chord - xk)
        } else {
            (xk, xk - 2.0 * phase * chord + chord)
        };

        let px1 = center.x + (x1 * r).round() as i32;
        let px2 = center.x + (x2 * r).round() as i32;
        let dy = (yk * r).round() as i32;
        for py in [center.y - dy, center.y + dy] {
            draw::draw_line(target, Point::new(px1, py), Point::new(px2, py), PAPER, 1)?;
        }
    }

    draw::draw_circle_from_center(target, center, radius, PrimitiveStyle::with_stroke(INK, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vframebuf::VarFrameBuf;
    use chrono::TimeZone;
    use embedded_graphics::primitives::Rectangle;

    fn utc(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, hh, mm, 0).unwrap()
    }

    fn render(phase: f64) -> VarFrameBuf<BinaryColor> {
        let mut fb = VarFrameBuf::new(180, 180, PAPER);
        draw_moon(&mut fb, Point::new(10, 10), 70, phase).unwrap();
        fb
    }

    #[test]
    fn test_known_new_and_full_moons() {
        let epoch = DateTime::<Utc>::UNIX_EPOCH;

        let new = moon_reading(epoch, utc(2000, 1, 6, 18, 14));
        assert!(new.illuminated < 0.01);
        assert!((phase_fraction(new.angle) - 0.5).abs() < 0.02);

        let full = moon_reading(epoch, utc(2000, 1, 21, 4, 40));
        assert!(full.illuminated > 0.99);
        let f = phase_fraction(full.angle);
        assert!(f < 0.04 || f > 0.96, "{}", f);

        let full = moon_reading(epoch, utc(2024, 6, 22, 1, 8));
        let f = phase_fraction(full.angle);
        assert!(f < 0.04 || f > 0.96, "{}", f);
    }

    #[test]
    fn test_epoch_choice_does_not_matter() {
        let instant = utc(2024, 7, 5, 22, 57);
        let a = moon_reading(DateTime::<Utc>::UNIX_EPOCH, instant);
        let b = moon_reading(utc(2010, 1, 1, 0, 0), instant);
        assert!((a.angle - b.angle).abs() < 1e-6);
    }

    #[test]
    fn test_fraction_range() {
        assert_eq!(phase_fraction(0.0), 0.5);
        assert_eq!(phase_fraction(180.0), 0.0);
        for step in 0..720 {
            let f = phase_fraction(step as f64 * 0.5);
            assert!((0.0..1.0).contains(&f));
        }
    }

    #[test]
    fn test_new_moon_is_dark() {
        let new = render(0.5);
        let full = render(0.0);
        let disk = std::f64::consts::PI * 36.0 * 36.0;
        assert!(new.count(INK) as f64 > disk * 0.9);
        assert!((full.count(INK) as f64) < disk * 0.25);
    }

    #[test]
    fn test_full_moon_symmetry() {
        let zero = render(0.0).count(INK) as i64;
        let one = render(1.0).count(INK) as i64;
        assert!((zero - one).abs() <= 40, "{} vs {}", zero, one);
    }

    #[test]
    fn test_quarters_mirror() {
        // centre at (79, 80)
        let left = Rectangle::new(Point::new(40, 40), Size::new(36, 80));
        let right = Rectangle::new(Point::new(83, 40), Size::new(36, 80));

        let waxing = render(0.25);
        assert!(waxing.count_in(&left, INK) * 2 < waxing.count_in(&right, INK));

        let waning = render(0.75);
        assert!(waning.count_in(&right, INK) * 2 < waning.count_in(&left, INK));

        let (a, b) = (waxing.count(INK) as i64, waning.count(INK) as i64);
        assert!((a - b).abs() <= 60, "{} vs {}", a, b);
    }
}
