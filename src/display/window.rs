/*
 *  display/window.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Controller addressing window (CASET/RASET)
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

use std::fmt;

use crate::display::error::DisplayError;

/// Requested window corners; any `None` falls back to the full frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub x0: Option<u16>,
    pub y0: Option<u16>,
    pub x1: Option<u16>,
    pub y1: Option<u16>,
}

impl Bounds {
    /// Whole frame, `(0, 0)` to `(width - 1, height - 1)`
    pub fn full() -> Self {
        Self::default()
    }

    pub fn new(x0: u16, y0: u16, x1: u16, y1: u16) -> Self {
        Self {
            x0: Some(x0),
            y0: Some(y0),
            x1: Some(x1),
            y1: Some(y1),
        }
    }

    /// Fill in defaults and check against a `width`x`height` frame
    pub fn resolve<E: fmt::Debug>(self, width: u16, height: u16) -> Result<Window, DisplayError<E>> {
        let x0 = self.x0.unwrap_or(0);
        let y0 = self.y0.unwrap_or(0);
        let x1 = self.x1.unwrap_or(width.saturating_sub(1));
        let y1 = self.y1.unwrap_or(height.saturating_sub(1));

        if x0 > x1 || y0 > y1 || x1 >= width || y1 >= height {
            return Err(DisplayError::WindowOutOfBounds { x0, y0, x1, y1, width, height });
        }
        Ok(Window { x0, y0, x1, y1 })
    }
}

/// Inclusive pixel bounds in controller coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
}

impl Window {
    /// Shift by the panel's offsets within the controller RAM
    ///
    /// Fails if the shifted window no longer fits the 16 bit address space.
    pub fn offset<E: fmt::Debug>(self, left: u16, top: u16) -> Result<Self, DisplayError<E>> {
        let shifted = (|| {
            Some(Self {
                x0: self.x0.checked_add(left)?,
                y0: self.y0.checked_add(top)?,
                x1: self.x1.checked_add(left)?,
                y1: self.y1.checked_add(top)?,
            })
        })();
        shifted.ok_or(DisplayError::WindowOutOfBounds {
            x0: self.x0,
            y0: self.y0,
            x1: self.x1,
            y1: self.y1,
            width: u16::MAX,
            height: u16::MAX,
        })
    }

    /// CASET parameters: x0 hi, x0 lo, x1 hi, x1 lo
    pub fn column_params(&self) -> [u8; 4] {
        span(self.x0, self.x1)
    }

    /// RASET parameters: y0 hi, y0 lo, y1 hi, y1 lo
    pub fn row_params(&self) -> [u8; 4] {
        span(self.y0, self.y1)
    }

    pub fn pixel_count(&self) -> usize {
        (self.x1 - self.x0 + 1) as usize * (self.y1 - self.y0 + 1) as usize
    }
}

fn span(start: u16, end: u16) -> [u8; 4] {
    let [s_hi, s_lo] = start.to_be_bytes();
    let [e_hi, e_lo] = end.to_be_bytes();
    [s_hi, s_lo, e_hi, e_lo]
}
