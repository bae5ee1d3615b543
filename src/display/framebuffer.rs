/*
 *  display/framebuffer.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Runtime-sized RGB888 frame for embedded-graphics
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

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::display::pixel::RGB_BYTES;

/// An RGB888 raster, three bytes per pixel, row-major.
///
/// This is what [`Gc9a01::display`](crate::display::drivers::gc9a01::Gc9a01::display)
/// takes. It can be filled from decoded image bytes or drawn on directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbFrame {
    buf: Vec<u8>,
    w: usize,
    h: usize,
}

impl RgbFrame {
    pub fn new(width: u32, height: u32, fill: Rgb888) -> Self {
        let (w, h) = (width as usize, height as usize);
        let mut frame = Self { buf: vec![0; w * h * RGB_BYTES], w, h };
        frame.clear_color(fill);
        frame
    }

    /// Wrap existing RGB bytes; `None` if the length doesn't match
    pub fn from_rgb_bytes(width: u32, height: u32, bytes: Vec<u8>) -> Option<Self> {
        let (w, h) = (width as usize, height as usize);
        (bytes.len() == w * h * RGB_BYTES).then_some(Self { buf: bytes, w, h })
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Raw RGB bytes
    pub fn as_bytes(&self) -> &[u8] { &self.buf }

    /// Mutable raw access
    pub fn as_mut_bytes(&mut self) -> &mut [u8] { &mut self.buf }

    /// Clear to a color
    pub fn clear_color(&mut self, color: Rgb888) {
        let px = [color.r(), color.g(), color.b()];
        for dst in self.buf.chunks_exact_mut(RGB_BYTES) {
            dst.copy_from_slice(&px);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb888> {
        if x >= self.w || y >= self.h {
            return None;
        }
        let i = (y * self.w + x) * RGB_BYTES;
        Some(Rgb888::new(self.buf[i], self.buf[i + 1], self.buf[i + 2]))
    }

    /// Map (x,y) to byte offset; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some((y * self.w + x) * RGB_BYTES);
            }
        }
        None
    }

    #[inline]
    fn put(&mut self, i: usize, c: Rgb888) {
        self.buf[i..i + RGB_BYTES].copy_from_slice(&[c.r(), c.g(), c.b()]);
    }
}

impl OriginDimensions for RgbFrame {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl DrawTarget for RgbFrame {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.put(i, c);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clear_color(color);
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // walk the full area so the color iterator stays in step, skip what's off-frame
        let Size { width, height } = area.size;
        let mut it = colors.into_iter();
        for dy in 0..height as i32 {
            for dx in 0..width as i32 {
                let Some(c) = it.next() else { return Ok(()) };
                if let Some(i) = self.idx(area.top_left + Point::new(dx, dy)) {
                    self.put(i, c);
                }
            }
        }
        Ok(())
    }
}
