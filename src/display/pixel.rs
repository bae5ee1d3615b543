/*
 *  display/pixel.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  RGB888 to packed RGB565 wire format, with quarter-turn rotation
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

//! The transcoder runs once per displayed frame, so everything here works on
//! whole buffers through `chunks_exact` iterators that the compiler can
//! vectorise, rather than indexing pixel by pixel.
//!
//! Packing is a per-pixel truncation, so it commutes with rotation: frames are
//! packed first and the two-byte pixels are rotated afterwards, which moves
//! a third less memory than rotating the RGB raster.

use crate::display::panel::Rotation;

/// Bytes per input pixel (R, G, B)
pub const RGB_BYTES: usize = 3;

/// Bytes per wire pixel
pub const WIRE_BYTES: usize = 2;

/// Pack one pixel: top 5 bits red, top 6 green, top 5 blue, big endian
#[inline]
pub fn pack_rgb565(r: u8, g: u8, b: u8) -> [u8; 2] {
    [(r & 0xF8) | (g >> 5), ((g << 3) & 0xE0) | (b >> 3)]
}

/// Expand a wire pixel back to RGB888, low bits zero
#[inline]
pub fn unpack_rgb565(px: [u8; 2]) -> [u8; 3] {
    [
        px[0] & 0xF8,
        ((px[0] & 0x07) << 5) | ((px[1] & 0xE0) >> 3),
        (px[1] & 0x1F) << 3,
    ]
}

/// Pack a whole RGB888 raster into `out`, which must hold 2 bytes per pixel
pub(crate) fn pack_into(rgb: &[u8], out: &mut [u8]) {
    debug_assert_eq!(rgb.len() / RGB_BYTES * WIRE_BYTES, out.len());
    for (src, dst) in rgb.chunks_exact(RGB_BYTES).zip(out.chunks_exact_mut(WIRE_BYTES)) {
        dst.copy_from_slice(&pack_rgb565(src[0], src[1], src[2]));
    }
}

/// Rotate a row-major raster of `width`x`height` pixels, `BPP` bytes each,
/// counter-clockwise by `rotation`. Returns the raster and its new width.
pub(crate) fn rotate<const BPP: usize>(
    src: &[u8],
    width: usize,
    height: usize,
    rotation: Rotation,
) -> (Vec<u8>, usize) {
    debug_assert_eq!(src.len(), width * height * BPP);
    let mut out = vec![0u8; src.len()];

    match rotation {
        Rotation::Deg0 => {
            out.copy_from_slice(src);
            (out, width)
        }
        Rotation::Deg180 => {
            for (dst, px) in out.chunks_exact_mut(BPP).zip(src.chunks_exact(BPP).rev()) {
                dst.copy_from_slice(px);
            }
            (out, width)
        }
        Rotation::Deg90 | Rotation::Deg270 => {
            // output row i is a source column read top-down (90) or bottom-up (270)
            let ccw = rotation == Rotation::Deg90;
            for (i, out_row) in out.chunks_exact_mut(height * BPP).enumerate() {
                let col = if ccw { width - 1 - i } else { i };
                for (j, dst) in out_row.chunks_exact_mut(BPP).enumerate() {
                    let row = if ccw { j } else { height - 1 - j };
                    let s = (row * width + col) * BPP;
                    dst.copy_from_slice(&src[s..s + BPP]);
                }
            }
            (out, height)
        }
    }
}

/// Turn an RGB888 raster into the controller's wire format
///
/// `rgb` is `width`x`height` pixels as seen by the caller; the result is
/// rotated back to the controller's native orientation and is always
/// `2 * width * height` bytes. Callers check `rgb` holds `width * height`
/// pixels; the driver does so before every frame.
pub(crate) fn transcode(rgb: &[u8], width: usize, height: usize, rotation: Rotation) -> Vec<u8> {
    let mut packed = vec![0u8; width * height * WIRE_BYTES];
    pack_into(rgb, &mut packed);
    match rotation {
        Rotation::Deg0 => packed,
        _ => rotate::<WIRE_BYTES>(&packed, width, height, rotation).0,
    }
}
