/*
 *  diagnostics.rs
 *
 *  wxpaper - forecast on paper
 *	(c) 2020-26 Stuart Hunter
 *
 *  Counters for every degraded element of a frame
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

use std::fmt;

/// Tally of fail-open events during one wake cycle.
///
/// Nothing here aborts a frame; each counter records a single visual
/// element that was dropped or substituted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostics {
    /// Feed entries discarded once the record store was full
    pub dropped_records: usize,
    /// Feed entries rejected because they broke chronological order
    pub rejected_records: usize,
    /// Condition codes that fell back to the default icon
    pub unrecognized_codes: usize,
    /// Panel, chart or astronomy lookups that found no qualifying data
    pub unmatched_periods: usize,
    /// Icons drawn as a text label because no bitmap was available
    pub missing_icons: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when every element of the frame rendered from real data.
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dropped={} rejected={} unknown_codes={} unmatched={} missing_icons={}",
            self.dropped_records,
            self.rejected_records,
            self.unrecognized_codes,
            self.unmatched_periods,
            self.missing_icons
        )
    }
}
