/*
 *  main.rs
 *
 *  wxpaper - forecast on paper
 *	(c) 2020-26 Stuart Hunter
 *
 *	One wake cycle: read the cached forecast, compose the frame, write it
 *	out for the panel and exit.
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

use std::fs::File;
use std::io::BufWriter;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local};
use clap::Parser;
use env_logger::Env;
use log::{info, warn};

use wxpaper::astral::StandardEphemeris;
use wxpaper::config::{self, Cli};
use wxpaper::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use wxpaper::display::MemorySurface;
use wxpaper::feed;
use wxpaper::weather_glyph::{IconStore, IconStrip, NoIcons};
use wxpaper::{Diagnostics, FrameComposer, WakeTime};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli)?;

    if cli.dump_config {
        print!("{}", config::dump(&cfg)?);
        return Ok(());
    }

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level()))
        .format_timestamp_secs()
        .init();
    info!("wxpaper v.{} built {} ({})", env!("CARGO_PKG_VERSION"), BUILD_DATE, BUILD_PROFILE);

    let now = match &cli.now {
        Some(text) => DateTime::parse_from_rfc3339(text)
            .with_context(|| format!("--now {:?} is not an RFC 3339 time", text))?,
        None => Local::now().fixed_offset(),
    };
    let wake = WakeTime::from_offset(now, cfg.standard_offset_minutes());
    info!("Woke at {} (dst {})", wake.local, wake.dst);

    let feed_path = cfg.feed.clone().ok_or_else(|| anyhow!("no forecast feed configured, use --feed"))?;
    let mut diagnostics = Diagnostics::new();
    let series = feed::load_series(&feed_path, cfg.capacity(), &mut diagnostics)
        .with_context(|| format!("loading forecast {}", feed_path.display()))?;

    let strip;
    let icons: &dyn IconStore = match &cfg.icons {
        Some(path) => {
            strip = IconStrip::load(path);
            &strip
        }
        None => {
            warn!("No icon strip configured, icons render as labels");
            &NoIcons
        }
    };

    let ephemeris = StandardEphemeris::new(cfg.standard_offset_minutes());
    let composer = FrameComposer::new(&ephemeris, icons, cfg.location())
        .with_match_tolerance(cfg.match_tolerance());

    let mut surface = MemorySurface::new(DISPLAY_WIDTH, DISPLAY_HEIGHT);
    let report = composer.compose(&mut surface, &series, &wake, diagnostics)?;

    let output = cfg.output_path();
    let file = File::create(&output).with_context(|| format!("creating {}", output.display()))?;
    surface.write_pbm(&mut BufWriter::new(file), cfg.invert())?;

    info!(
        "Frame written to {}: {} forecast tiles, sunrise {} sunset {}",
        output.display(),
        report.tiles_drawn,
        report.astronomy.sunrise_text(),
        report.astronomy.sunset_text()
    );
    if report.diagnostics.is_clean() {
        info!("All elements rendered from forecast data");
    } else {
        warn!("Degraded frame: {}", report.diagnostics);
    }
    Ok(())
}
