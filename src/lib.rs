/*
 *  lib.rs
 *
 *  wxpaper - forecast on paper
 *	(c) 2020-26 Stuart Hunter
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

pub mod constants;
pub mod diagnostics;
pub mod forecast;
pub mod feed;
pub mod glyphs;
pub mod weather_glyph;
pub mod vframebuf;
pub mod draw;
pub mod display;
pub mod chart;
pub mod location;
pub mod sun;
pub mod moon;
pub mod astral;
pub mod panel;
pub mod frame;
pub mod config;

pub use diagnostics::Diagnostics;
pub use forecast::{ForecastRecord, ForecastSeries};
pub use frame::{FrameComposer, FrameReport, WakeTime};
