/*
 *  feed.rs
 *
 *  wxpaper - forecast on paper
 *	(c) 2020-26 Stuart Hunter
 *
 *  Met Office DataPoint 3-hourly site forecast ingestion
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
use std::io::{self, Read};
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use flate2::read::GzDecoder;
use log::{debug, info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::constants::MINUTES_PER_DAY;
use crate::diagnostics::Diagnostics;
use crate::forecast::{ForecastError, ForecastRecord, ForecastSeries};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const MAX_REP_MINUTES: i32 = 2 * MINUTES_PER_DAY;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("cannot read feed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed feed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bad period date {0:?}")]
    InvalidDate(String),
    #[error("bad {field} value {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

// DataPoint wraps single children as objects rather than one-element arrays.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

// Numbers arrive quoted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    fn value(&self, field: &'static str) -> Result<f64, FeedError> {
        match self {
            NumberOrString::Number(n) => Ok(*n),
            NumberOrString::Text(s) => s.trim().parse::<f64>().map_err(|_| FeedError::InvalidNumber {
                field,
                value: s.clone(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(rename = "SiteRep")]
    site_rep: SiteRep,
}

#[derive(Debug, Deserialize)]
struct SiteRep {
    #[serde(rename = "DV")]
    dv: DataValues,
}

#[derive(Debug, Deserialize)]
struct DataValues {
    #[serde(rename = "Location")]
    location: SiteLocation,
}

#[derive(Debug, Deserialize)]
struct SiteLocation {
    #[serde(rename = "Period", default)]
    periods: OneOrMany<Period>,
}

#[derive(Debug, Deserialize)]
struct Period {
    /// "2024-06-19Z"
    value: String,
    #[serde(rename = "Rep", default)]
    reps: OneOrMany<Rep>,
}

#[derive(Debug, Deserialize)]
struct Rep {
    /// minutes after midnight
    #[serde(rename = "$")]
    minutes: NumberOrString,
    #[serde(rename = "T")]
    temperature: NumberOrString,
    #[serde(rename = "Pp")]
    precipitation: NumberOrString,
    #[serde(rename = "W")]
    code: NumberOrString,
}

fn parse_day(value: &str) -> Result<NaiveDate, FeedError> {
    let day = value.trim().trim_end_matches('Z');
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| FeedError::InvalidDate(value.to_string()))
}

/// Timestamp of a Rep, `$` minutes after the period's midnight.
fn period_time(midnight: NaiveDateTime, minutes: &NumberOrString) -> Result<NaiveDateTime, FeedError> {
    let raw = minutes.value("$")?;
    let invalid = || FeedError::InvalidNumber {
        field: "$",
        value: raw.to_string(),
    };
    // one day of reps, with slack for a period that runs past midnight
    if !raw.is_finite() || !(0.0..=f64::from(MAX_REP_MINUTES)).contains(&raw) {
        return Err(invalid());
    }
    Duration::try_minutes(raw as i64)
        .and_then(|offset| midnight.checked_add_signed(offset))
        .ok_or_else(invalid)
}

/// Forecast records in feed order from DataPoint JSON.
pub fn parse_feed(json: &str) -> Result<Vec<ForecastRecord>, FeedError> {
    let document: Document = serde_json::from_str(json)?;
    let mut records = Vec::new();

    for period in document.site_rep.dv.location.periods.into_vec() {
        let day = parse_day(&period.value)?;
        let midnight = day.and_time(NaiveTime::MIN);
        debug!("Period {}", period.value);

        for rep in period.reps.into_vec() {
            records.push(ForecastRecord::new(
                period_time(midnight, &rep.minutes)?,
                rep.temperature.value("T")? as f32,
                rep.precipitation.value("Pp")? as f32,
                rep.code.value("W")? as i32,
            ));
        }
    }
    Ok(records)
}

/// Feed bytes as text, inflating gzip when the magic bytes say so.
pub fn decode_bytes(raw: &[u8]) -> Result<String, FeedError> {
    if raw.starts_with(&GZIP_MAGIC) {
        let mut decoder = GzDecoder::new(raw);
        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded)?;
        debug!("Inflated feed {} -> {} bytes", raw.len(), decoded.len());
        Ok(decoded)
    } else {
        String::from_utf8(raw.to_vec())
            .map_err(|e| FeedError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}

pub fn read_feed(path: &Path) -> Result<Vec<ForecastRecord>, FeedError> {
    let raw = fs::read(path)?;
    let text = decode_bytes(&raw)?;
    parse_feed(&text)
}

/// Append `records` to `series` in order.
///
/// Once the store is full the remaining records are dropped; a record that
/// breaks the ordering is skipped on its own. Returns the number stored.
pub fn ingest<I>(records: I, series: &mut ForecastSeries, diagnostics: &mut Diagnostics) -> usize
where
    I: IntoIterator<Item = ForecastRecord>,
{
    let mut stored = 0;
    let mut records = records.into_iter();

    while let Some(record) = records.next() {
        match series.append(record) {
            Ok(()) => stored += 1,
            Err(ForecastError::CapacityExceeded(capacity)) => {
                let dropped = 1 + records.by_ref().count();
                warn!("Forecast store full at {} records, dropping {} more", capacity, dropped);
                diagnostics.dropped_records += dropped;
                break;
            }
            Err(e @ ForecastError::OutOfOrder { .. }) => {
                warn!("Skipping feed entry: {}", e);
                diagnostics.rejected_records += 1;
            }
        }
    }
    stored
}

/// Read a feed file into a fresh store of `capacity` records.
pub fn load_series(path: &Path, capacity: usize, diagnostics: &mut Diagnostics) -> Result<ForecastSeries, FeedError> {
    let records = read_feed(path)?;
    let received = records.len();
    let mut series = ForecastSeries::with_capacity(capacity);
    let stored = ingest(records, &mut series, diagnostics);
    info!("Loaded {} of {} forecast periods from {} (capacity {})",
        stored, received, path.display(), series.capacity());
    Ok(series)
}
