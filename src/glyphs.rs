/*
 *  glyphs.rs
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

/// Bytes occupied by one 1-bpp glyph, rows padded to whole bytes.
pub const fn glyph_byte_size(w: u32, h: u32) -> usize {
    ((w as usize + 7) / 8) * h as usize
}

/// Helper function to get a slice for a specific glyph from a binary set.
/// Returns None when the set is too short to hold glyph `index`.
pub fn get_glyph_slice(raw_glyph: &[u8], index: usize, w: u32, h: u32) -> Option<&[u8]> {
    let byte_size = glyph_byte_size(w, h);
    let start_idx = index * byte_size;
    let end_idx = start_idx + byte_size;
    raw_glyph.get(start_idx..end_idx)
}

/// Number of complete glyphs held in a binary set.
pub fn glyph_count(raw_glyph: &[u8], w: u32, h: u32) -> usize {
    raw_glyph.len() / glyph_byte_size(w, h)
}

pub const GLYPH_SUNRISE: [u8; 8] = [0x18, 0x3c, 0x7e, 0x18, 0x18, 0x00, 0xff, 0x00,];
pub const GLYPH_SUNSET: [u8; 8] = [0x18, 0x18, 0x7e, 0x3c, 0x18, 0x00, 0xff, 0x00,];
