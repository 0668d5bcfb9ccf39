/*
 *  frame.rs
 *
 *  wxpaper - forecast on paper
 *	(c) 2020-26 Stuart Hunter
 *
 *  Full-screen layout: charts, forecast tiles and astronomy in one commit
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

use std::fmt::Debug;

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Timelike, Utc};
use embedded_graphics::prelude::*;
use log::{debug, info};

use crate::astral::{self, AstronomyResult, Ephemeris};
use crate::chart::{self, AxisBounds, ChartSpec, RenderMode};
use crate::constants::{
    ASTRONOMY_MORNING_OFFSET_X, CHART_HEIGHT, CHART_TOP, DEFAULT_MATCH_TOLERANCE_MINUTES,
    RAIN_CHART_WIDTH, RAIN_CHART_X, TEMP_CHART_WIDTH, TEMP_CHART_X,
};
use crate::diagnostics::Diagnostics;
use crate::display::{DisplayError, DisplaySurface};
use crate::draw::PAPER;
use crate::forecast::ForecastSeries;
use crate::location::Location;
use crate::panel;
use crate::weather_glyph::IconStore;

const TEMPERATURE_CHART: ChartSpec<'static> = ChartSpec {
    value_range: (10.0, 30.0),
    autoscale: true,
    mode: RenderMode::Line,
    title: "Temperature °C",
};

const PRECIPITATION_CHART: ChartSpec<'static> = ChartSpec {
    value_range: (0.0, 100.0),
    autoscale: false,
    mode: RenderMode::Bar,
    title: "Rain %",
};

/// The instant the device woke, in the forms the layout needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeTime {
    /// wall clock time, compared against the feed's timestamps
    pub local: NaiveDateTime,
    pub utc: DateTime<Utc>,
    /// daylight saving in effect
    pub dst: bool,
}

impl WakeTime {
    /// From an instant with its UTC offset; DST is in effect when that
    /// offset is ahead of the zone's standard offset.
    pub fn from_offset(instant: DateTime<FixedOffset>, standard_offset_minutes: i32) -> Self {
        let offset_minutes = instant.offset().local_minus_utc() / 60;
        Self {
            local: instant.naive_local(),
            utc: instant.with_timezone(&Utc),
            dst: offset_minutes > standard_offset_minutes,
        }
    }

    pub fn hour(&self) -> u32 {
        self.local.hour()
    }

    pub fn is_morning(&self) -> bool {
        self.hour() < 12
    }
}

/// What went into one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub temperature_axis: AxisBounds,
    pub precipitation_axis: AxisBounds,
    /// forecast tiles drawn, not counting the current conditions tile
    pub tiles_drawn: usize,
    pub astronomy: AstronomyResult,
    pub diagnostics: Diagnostics,
}

/// Lays out and commits one frame per wake.
pub struct FrameComposer<'a, E: ?Sized, I: ?Sized> {
    ephemeris: &'a E,
    icons: &'a I,
    location: Location,
    match_tolerance: Duration,
}

impl<'a, E, I> FrameComposer<'a, E, I>
where
    E: Ephemeris + ?Sized,
    I: IconStore + ?Sized,
{
    pub fn new(ephemeris: &'a E, icons: &'a I, location: Location) -> Self {
        Self {
            ephemeris,
            icons,
            location,
            match_tolerance: Duration::minutes(DEFAULT_MATCH_TOLERANCE_MINUTES),
        }
    }

    pub fn with_match_tolerance(mut self, tolerance: Duration) -> Self {
        self.match_tolerance = tolerance;
        self
    }

    /// Draw the whole frame onto `surface` and commit it with a full refresh.
    ///
    /// Missing data only drops the affected element; `diagnostics` carries
    /// any counts from ingestion and comes back in the report with the
    /// rendering counts added.
    pub fn compose<S>(
        &self,
        surface: &mut S,
        series: &ForecastSeries,
        wake: &WakeTime,
        mut diagnostics: Diagnostics,
    ) -> Result<FrameReport, DisplayError>
    where
        S: DisplaySurface,
        S::Error: Debug,
    {
        let caps = surface.capabilities();
        info!("Composing {}x{} frame for {} ({} periods)",
            caps.width, caps.height, wake.local, series.record_count());
        surface.clear(PAPER).map_err(DisplayError::drawing)?;

        let timestamps: Vec<NaiveDateTime> = series.records().iter().map(|r| r.timestamp).collect();
        let temperature_axis = chart::draw_chart(
            surface,
            Point::new(TEMP_CHART_X, CHART_TOP),
            Size::new(TEMP_CHART_WIDTH, CHART_HEIGHT),
            &TEMPERATURE_CHART,
            &series.temperatures(),
            &timestamps,
            &mut diagnostics,
        )
        .map_err(DisplayError::drawing)?;

        let precipitation_axis = chart::draw_chart(
            surface,
            Point::new(RAIN_CHART_X, CHART_TOP),
            Size::new(RAIN_CHART_WIDTH, CHART_HEIGHT),
            &PRECIPITATION_CHART,
            &series.precipitation(),
            &timestamps,
            &mut diagnostics,
        )
        .map_err(DisplayError::drawing)?;

        panel::draw_now_tile(surface, series, self.icons, &mut diagnostics)
            .map_err(DisplayError::drawing)?;
        let tiles_drawn = panel::draw_forecast_panel(
            surface,
            series,
            wake.local,
            self.match_tolerance,
            self.icons,
            &mut diagnostics,
        )
        .map_err(DisplayError::drawing)?;

        let astronomy = astral::compute_astronomy(
            self.ephemeris,
            &self.location,
            wake.local.date(),
            wake.utc,
            wake.dst,
        );
        // astronomy takes whichever half the forecast tiles leave free
        let offset = if wake.is_morning() { ASTRONOMY_MORNING_OFFSET_X } else { 0 };
        astral::draw_astronomy(surface, &astronomy, offset, &mut diagnostics)
            .map_err(DisplayError::drawing)?;

        surface.commit(true)?;
        debug!("Frame committed, {}", diagnostics);

        Ok(FrameReport {
            temperature_axis,
            precipitation_axis,
            tiles_drawn,
            astronomy,
            diagnostics,
        })
    }
}
