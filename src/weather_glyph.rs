/*
 *  weather_glyph.rs
 *
 *  wxpaper - forecast on paper
 *	(c) 2020-26 Stuart Hunter
 *
 *  Condition code to icon resolution and the icon bitmap strip
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

use std::fs;
use std::path::Path;

use embedded_graphics::image::ImageRaw;
use embedded_graphics::pixelcolor::BinaryColor;
use log::{info, warn};

use crate::constants::{ICON_HEIGHT, ICON_WIDTH};
use crate::diagnostics::Diagnostics;
use crate::glyphs;

/// Forecast icons, in strip order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherIcon {
    ClearNight = 0,
    SunnyDay = 1,
    PartlyCloudyNight = 2,
    PartlyCloudyDay = 3,
    Mist = 4,
    Fog = 5,
    Cloudy = 6,
    LightRainShowerNight = 7,
    LightRainShowerDay = 8,
    Drizzle = 9,
    LightRain = 10,
    HeavyRainShowerNight = 11,
    HeavyRainShowerDay = 12,
    HeavyRain = 13,
    SleetShowerNight = 14,
    SleetShowerDay = 15,
    Sleet = 16,
    HailShowerNight = 17,
    HailShowerDay = 18,
    Hail = 19,
    LightSnowShowerNight = 20,
    LightSnowShowerDay = 21,
    LightSnow = 22,
    HeavySnowShowerNight = 23,
    HeavySnowShowerDay = 24,
    HeavySnow = 25,
    ThunderShowerNight = 26,
    ThunderShowerDay = 27,
    Thunder = 28,
}

/// Icon used for any code without a dedicated bitmap.
pub const DEFAULT_ICON: WeatherIcon = WeatherIcon::Thunder;

pub const ICON_COUNT: usize = 29;

impl WeatherIcon {
    pub const ALL: [WeatherIcon; ICON_COUNT] = [
        WeatherIcon::ClearNight,
        WeatherIcon::SunnyDay,
        WeatherIcon::PartlyCloudyNight,
        WeatherIcon::PartlyCloudyDay,
        WeatherIcon::Mist,
        WeatherIcon::Fog,
        WeatherIcon::Cloudy,
        WeatherIcon::LightRainShowerNight,
        WeatherIcon::LightRainShowerDay,
        WeatherIcon::Drizzle,
        WeatherIcon::LightRain,
        WeatherIcon::HeavyRainShowerNight,
        WeatherIcon::HeavyRainShowerDay,
        WeatherIcon::HeavyRain,
        WeatherIcon::SleetShowerNight,
        WeatherIcon::SleetShowerDay,
        WeatherIcon::Sleet,
        WeatherIcon::HailShowerNight,
        WeatherIcon::HailShowerDay,
        WeatherIcon::Hail,
        WeatherIcon::LightSnowShowerNight,
        WeatherIcon::LightSnowShowerDay,
        WeatherIcon::LightSnow,
        WeatherIcon::HeavySnowShowerNight,
        WeatherIcon::HeavySnowShowerDay,
        WeatherIcon::HeavySnow,
        WeatherIcon::ThunderShowerNight,
        WeatherIcon::ThunderShowerDay,
        WeatherIcon::Thunder,
    ];

    /// Icon for a Met Office significant weather code.
    ///
    /// Code 4 is reserved and anything outside 0-31 is unknown; both give None.
    /// Code 31 means "not available" and is drawn as thunder.
    pub fn from_code(code: i32) -> Option<Self> {
        let icon = match code {
            0 => WeatherIcon::ClearNight,
            1 => WeatherIcon::SunnyDay,
            2 => WeatherIcon::PartlyCloudyNight,
            3 => WeatherIcon::PartlyCloudyDay,
            5 => WeatherIcon::Mist,
            6 => WeatherIcon::Fog,
            7 | 8 => WeatherIcon::Cloudy, // overcast shares cloudy
            9 => WeatherIcon::LightRainShowerNight,
            10 => WeatherIcon::LightRainShowerDay,
            11 => WeatherIcon::Drizzle,
            12 => WeatherIcon::LightRain,
            13 => WeatherIcon::HeavyRainShowerNight,
            14 => WeatherIcon::HeavyRainShowerDay,
            15 => WeatherIcon::HeavyRain,
            16 => WeatherIcon::SleetShowerNight,
            17 => WeatherIcon::SleetShowerDay,
            18 => WeatherIcon::Sleet,
            19 => WeatherIcon::HailShowerNight,
            20 => WeatherIcon::HailShowerDay,
            21 => WeatherIcon::Hail,
            22 => WeatherIcon::LightSnowShowerNight,
            23 => WeatherIcon::LightSnowShowerDay,
            24 => WeatherIcon::LightSnow,
            25 => WeatherIcon::HeavySnowShowerNight,
            26 => WeatherIcon::HeavySnowShowerDay,
            27 => WeatherIcon::HeavySnow,
            28 => WeatherIcon::ThunderShowerNight,
            29 => WeatherIcon::ThunderShowerDay,
            30 | 31 => WeatherIcon::Thunder,
            _ => return None,
        };
        Some(icon)
    }

    /// Position of this icon in the bitmap strip.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn slug(self) -> &'static str {
        match self {
            WeatherIcon::ClearNight => "clear_night",
            WeatherIcon::SunnyDay => "sunny_day",
            WeatherIcon::PartlyCloudyNight => "partly_cloudy_night",
            WeatherIcon::PartlyCloudyDay => "partly_cloudy_day",
            WeatherIcon::Mist => "mist",
            WeatherIcon::Fog => "fog",
            WeatherIcon::Cloudy => "cloudy",
            WeatherIcon::LightRainShowerNight => "light_rain_shower_night",
            WeatherIcon::LightRainShowerDay => "light_rain_shower_day",
            WeatherIcon::Drizzle => "drizzle",
            WeatherIcon::LightRain => "light_rain",
            WeatherIcon::HeavyRainShowerNight => "heavy_rain_shower_night",
            WeatherIcon::HeavyRainShowerDay => "heavy_rain_shower_day",
            WeatherIcon::HeavyRain => "heavy_rain",
            WeatherIcon::SleetShowerNight => "sleet_shower_night",
            WeatherIcon::SleetShowerDay => "sleet_shower_day",
            WeatherIcon::Sleet => "sleet",
            WeatherIcon::HailShowerNight => "hail_shower_night",
            WeatherIcon::HailShowerDay => "hail_shower_day",
            WeatherIcon::Hail => "hail",
            WeatherIcon::LightSnowShowerNight => "light_snow_shower_night",
            WeatherIcon::LightSnowShowerDay => "light_snow_shower_day",
            WeatherIcon::LightSnow => "light_snow",
            WeatherIcon::HeavySnowShowerNight => "heavy_snow_shower_night",
            WeatherIcon::HeavySnowShowerDay => "heavy_snow_shower_day",
            WeatherIcon::HeavySnow => "heavy_snow",
            WeatherIcon::ThunderShowerNight => "thunder_shower_night",
            WeatherIcon::ThunderShowerDay => "thunder_shower_day",
            WeatherIcon::Thunder => "thunder",
        }
    }

    /// Text drawn in place of the bitmap when none is loaded.
    pub fn label(self) -> &'static str {
        match self {
            WeatherIcon::ClearNight => "Clear",
            WeatherIcon::SunnyDay => "Sunny",
            WeatherIcon::PartlyCloudyNight | WeatherIcon::PartlyCloudyDay => "Partly cloudy",
            WeatherIcon::Mist => "Mist",
            WeatherIcon::Fog => "Fog",
            WeatherIcon::Cloudy => "Cloudy",
            WeatherIcon::LightRainShowerNight | WeatherIcon::LightRainShowerDay => "Light showers",
            WeatherIcon::Drizzle => "Drizzle",
            WeatherIcon::LightRain => "Light rain",
            WeatherIcon::HeavyRainShowerNight | WeatherIcon::HeavyRainShowerDay => "Heavy showers",
            WeatherIcon::HeavyRain => "Heavy rain",
            WeatherIcon::SleetShowerNight | WeatherIcon::SleetShowerDay => "Sleet showers",
            WeatherIcon::Sleet => "Sleet",
            WeatherIcon::HailShowerNight | WeatherIcon::HailShowerDay => "Hail showers",
            WeatherIcon::Hail => "Hail",
            WeatherIcon::LightSnowShowerNight | WeatherIcon::LightSnowShowerDay => "Light snow showers",
            WeatherIcon::LightSnow => "Light snow",
            WeatherIcon::HeavySnowShowerNight | WeatherIcon::HeavySnowShowerDay => "Heavy snow showers",
            WeatherIcon::HeavySnow => "Heavy snow",
            WeatherIcon::ThunderShowerNight | WeatherIcon::ThunderShowerDay => "Thundery showers",
            WeatherIcon::Thunder => "Thunder",
        }
    }
}

/// Total mapping from condition code to icon, unknown codes give [`DEFAULT_ICON`].
pub fn condition_code_to_icon(code: i32) -> WeatherIcon {
    WeatherIcon::from_code(code).unwrap_or(DEFAULT_ICON)
}

/// As [`condition_code_to_icon`], recording the fallback.
pub fn resolve_icon(code: i32, diagnostics: &mut Diagnostics) -> WeatherIcon {
    match WeatherIcon::from_code(code) {
        Some(icon) => icon,
        None => {
            warn!("Unrecognized condition code {}, using {}", code, DEFAULT_ICON.slug());
            diagnostics.unrecognized_codes += 1;
            DEFAULT_ICON
        }
    }
}

/// Source of icon bitmaps.
pub trait IconStore {
    /// 1-bpp bitmap for `icon`, [`ICON_WIDTH`] pixels wide, or None if unavailable.
    fn bitmap(&self, icon: WeatherIcon) -> Option<ImageRaw<'_, BinaryColor>>;
}

/// Store with no bitmaps, every icon renders as its label.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIcons;

impl IconStore for NoIcons {
    fn bitmap(&self, _icon: WeatherIcon) -> Option<ImageRaw<'_, BinaryColor>> {
        None
    }
}

/// Strip of 160x128 glyphs in [`WeatherIcon`] order, MSB first, 1 = ink.
#[derive(Debug, Default, Clone)]
pub struct IconStrip {
    raw: Vec<u8>,
}

impl IconStrip {
    pub fn from_bytes(raw: Vec<u8>) -> Self {
        let available = glyphs::glyph_count(&raw, ICON_WIDTH, ICON_HEIGHT);
        if available < ICON_COUNT {
            warn!("Icon strip holds {} of {} icons", available, ICON_COUNT);
        }
        Self { raw }
    }

    /// Load the strip from disk. A missing or unreadable file gives an empty strip.
    pub fn load(path: &Path) -> Self {
        match fs::read(path) {
            Ok(raw) => {
                let strip = Self::from_bytes(raw);
                info!("Loaded icon strip {} ({} icons)", path.display(), strip.icon_count());
                strip
            }
            Err(e) => {
                warn!("Icon strip {} unavailable: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn icon_count(&self) -> usize {
        glyphs::glyph_count(&self.raw, ICON_WIDTH, ICON_HEIGHT).min(ICON_COUNT)
    }
}

impl IconStore for IconStrip {
    fn bitmap(&self, icon: WeatherIcon) -> Option<ImageRaw<'_, BinaryColor>> {
        glyphs::get_glyph_slice(&self.raw, icon.index(), ICON_WIDTH, ICON_HEIGHT)
            .map(|data| ImageRaw::<BinaryColor>::new(data, ICON_WIDTH))
    }
}
