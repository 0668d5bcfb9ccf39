/*
 *  display/traits.rs
 *
 *  wxpaper - forecast on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for the display surface abstraction
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use crate::display::error::DisplayError;

/// Display capabilities and metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Whether the panel can refresh a region without a full update
    pub supports_partial_refresh: bool,
}

/// Drawing surface the frame is composed on.
///
/// Primitive drawing (lines, rectangles, triangles, circles, bitmaps and
/// text) comes from embedded-graphics through `DrawTarget`; the surface adds
/// the commit that pushes the finished frame to the panel.
pub trait DisplaySurface: DrawTarget<Color = BinaryColor> {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Push the drawn frame to the panel.
    ///
    /// `full_refresh` requests a complete panel update rather than a
    /// partial one; surfaces without partial refresh ignore it.
    fn commit(&mut self, full_refresh: bool) -> Result<(), DisplayError>;
}
