/*
 *  forecast.rs
 *
 *  wxpaper - forecast on paper
 *	(c) 2020-26 Stuart Hunter
 *
 *  Fixed capacity, chronologically ordered store of forecast periods
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

use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use thiserror::Error;

use crate::constants::{self, MAX_FORECAST_RECORDS};

/// Errors raised while populating a [`ForecastSeries`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    #[error("forecast store full ({0} records)")]
    CapacityExceeded(usize),
    #[error("record at {new} is not after the last stored period {last}")]
    OutOfOrder { last: NaiveDateTime, new: NaiveDateTime },
}

/// One time-stamped forecast period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRecord {
    pub timestamp: NaiveDateTime,
    /// degrees C
    pub temperature: f32,
    /// 0..=100
    pub precipitation_chance: f32,
    /// Met Office significant weather code, 0..=31 when valid
    pub condition_code: i32,
}

impl ForecastRecord {
    pub fn new(timestamp: NaiveDateTime, temperature: f32, precipitation_chance: f32, condition_code: i32) -> Self {
        Self {
            timestamp,
            temperature,
            precipitation_chance: precipitation_chance.clamp(0.0, 100.0),
            condition_code,
        }
    }

    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    /// Weekday counted from Sunday = 0.
    pub fn weekday_index(&self) -> u32 {
        self.timestamp.weekday().num_days_from_sunday()
    }

    pub fn weekday_name(&self) -> &'static str {
        constants::weekday_name(self.weekday_index())
    }
}

/// Ordered forecast periods for one wake cycle, index 0 is the current period.
#[derive(Debug, Clone)]
pub struct ForecastSeries {
    records: Vec<ForecastRecord>,
    capacity: usize,
}

impl Default for ForecastSeries {
    fn default() -> Self {
        Self::with_capacity(MAX_FORECAST_RECORDS)
    }
}

impl ForecastSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Store the next period.
    ///
    /// Fails once the capacity is reached; records already stored are kept.
    /// Timestamps must be strictly increasing.
    pub fn append(&mut self, record: ForecastRecord) -> Result<(), ForecastError> {
        if self.is_full() {
            return Err(ForecastError::CapacityExceeded(self.capacity));
        }
        if let Some(last) = self.records.last() {
            if record.timestamp <= last.timestamp {
                return Err(ForecastError::OutOfOrder {
                    last: last.timestamp,
                    new: record.timestamp,
                });
            }
        }
        self.records.push(record);
        Ok(())
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    pub fn get(&self, index: usize) -> Option<&ForecastRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[ForecastRecord] {
        &self.records
    }

    pub fn temperatures(&self) -> Vec<f32> {
        self.records.iter().map(|r| r.temperature).collect()
    }

    pub fn precipitation(&self) -> Vec<f32> {
        self.records.iter().map(|r| r.precipitation_chance).collect()
    }

    /// First record (scanning forward from the current period) matching `pred`.
    pub fn first_where<P>(&self, pred: P) -> Option<(usize, &ForecastRecord)>
    where
        P: Fn(&ForecastRecord) -> bool,
    {
        self.records.iter().enumerate().find(|(_, r)| pred(r))
    }

    /// Record closest to `target`, provided it lies within `tolerance`.
    /// Ties go to the earlier period.
    pub fn nearest_to(&self, target: NaiveDateTime, tolerance: Duration) -> Option<(usize, &ForecastRecord)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| (i, r, (r.timestamp - target).abs()))
            .filter(|(_, _, skew)| *skew <= tolerance)
            .min_by_key(|(i, _, skew)| (*skew, *i))
            .map(|(i, r, _)| (i, r))
    }
}
