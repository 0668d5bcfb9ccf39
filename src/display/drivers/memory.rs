/*
 *  display/drivers/memory.rs
 *
 *  wxpaper - forecast on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  In-memory panel for desktop runs and tests
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

use std::io::Write;

use embedded_graphics::prelude::*;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::geometry::Size;
use log::debug;

use crate::display::error::DisplayError;
use crate::display::traits::{DisplayCapabilities, DisplaySurface};
use crate::vframebuf::VarFrameBuf;

/// Display surface backed by memory.
///
/// Drawing lands in a working buffer; `commit` snapshots it as the panel
/// contents, which can then be inspected or exported as a PBM image.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    /// Framebuffer for drawing operations
    framebuffer: VarFrameBuf<BinaryColor>,

    /// What the panel shows after the last commit
    committed: Option<VarFrameBuf<BinaryColor>>,

    /// Display capabilities
    capabilities: DisplayCapabilities,

    /// Number of times commit() succeeded
    pub commit_count: usize,

    /// Refresh mode of the last commit
    pub last_full_refresh: Option<bool>,

    /// Simulate failures (for error testing)
    pub simulate_commit_failure: bool,
}

impl MemorySurface {
    pub fn new(width: u32, height: u32) -> Self {
        let capabilities = DisplayCapabilities {
            width,
            height,
            supports_partial_refresh: false,
        };

        Self {
            framebuffer: VarFrameBuf::new(width, height, BinaryColor::Off),
            committed: None,
            capabilities,
            commit_count: 0,
            last_full_refresh: None,
            simulate_commit_failure: false,
        }
    }

    /// Panel contents as of the last commit
    pub fn committed(&self) -> Option<&VarFrameBuf<BinaryColor>> {
        self.committed.as_ref()
    }

    /// Count number of ink pixels
    pub fn count_ink_pixels(&self) -> usize {
        self.framebuffer.count(BinaryColor::On)
    }

    /// Write the committed frame as binary PBM (P4), 1 = black.
    ///
    /// With `invert` the ink/paper sense is swapped for panels wired the
    /// other way round.
    pub fn write_pbm<W: Write>(&self, out: &mut W, invert: bool) -> Result<(), DisplayError> {
        let frame = self.committed.as_ref().ok_or_else(|| {
            DisplayError::CommitFailed("no frame has been committed".to_string())
        })?;

        write!(out, "P4\n{} {}\n", frame.width(), frame.height())?;
        out.write_all(&frame.to_packed_rows(invert))?;
        out.flush()?;
        Ok(())
    }
}

impl DisplaySurface for MemorySurface {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn commit(&mut self, full_refresh: bool) -> Result<(), DisplayError> {
        if self.simulate_commit_failure {
            return Err(DisplayError::CommitFailed("Simulated commit failure".to_string()));
        }

        self.committed = Some(self.framebuffer.clone());
        self.commit_count += 1;
        self.last_full_refresh = Some(full_refresh);
        debug!("Committed frame #{} (full refresh: {})", self.commit_count, full_refresh);
        Ok(())
    }
}

impl DrawTarget for MemorySurface {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.framebuffer.draw_iter(pixels)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.framebuffer.clear(color)
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        self.framebuffer.fill_contiguous(area, colors)
    }
}

impl OriginDimensions for MemorySurface {
    fn size(&self) -> Size {
        Size::new(self.capabilities.width, self.capabilities.height)
    }
}
