/*
 *  display/panel.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Panel geometry: native size, rotation, offsets
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

pub const DEFAULT_WIDTH: u16 = 240;
pub const DEFAULT_HEIGHT: u16 = 240;

/// Software rotation applied to every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    Deg0,
    #[default]
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        self.quarter_turns() as u16 * 90
    }

    /// Counter-clockwise quarter turns, 0..=3
    pub fn quarter_turns(self) -> u8 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    /// Width and height trade places at 90 and 270
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl TryFrom<u16> for Rotation {
    type Error = u16;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(other),
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Validated construction parameters for a panel
///
/// `width`/`height` are the controller's native (pre-rotation) size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelConfig {
    width: u16,
    height: u16,
    rotation: Rotation,
    invert: bool,
    offset_left: u16,
    offset_top: u16,
}

impl PanelConfig {
    pub fn new<E: fmt::Debug>(
        width: u16,
        height: u16,
        rotation_deg: u16,
    ) -> Result<Self, DisplayError<E>> {
        if width == 0 || height == 0 {
            return Err(DisplayError::InvalidDimensions { width, height });
        }
        let rotation = Rotation::try_from(rotation_deg).map_err(DisplayError::InvalidRotation)?;
        Ok(Self {
            width,
            height,
            rotation,
            ..Self::default()
        })
    }

    /// Accepted for compatibility; inversion is always enabled by the init sequence
    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Place the panel inside the controller RAM; the far edge must stay addressable
    pub fn with_offsets<E: fmt::Debug>(mut self, left: u16, top: u16) -> Result<Self, DisplayError<E>> {
        let fits = |offset: u16, size: u16| offset as u32 + size as u32 <= u16::MAX as u32 + 1;
        if !fits(left, self.width) || !fits(top, self.height) {
            return Err(DisplayError::InvalidConfiguration(format!(
                "offset ({}, {}) pushes a {}x{} panel past the controller address space",
                left, top, self.width, self.height
            )));
        }
        self.offset_left = left;
        self.offset_top = top;
        Ok(self)
    }

    pub fn native_width(&self) -> u16 { self.width }
    pub fn native_height(&self) -> u16 { self.height }
    pub fn rotation(&self) -> Rotation { self.rotation }
    pub fn invert(&self) -> bool { self.invert }
    pub fn offset_left(&self) -> u16 { self.offset_left }
    pub fn offset_top(&self) -> u16 { self.offset_top }

    /// Width as seen by callers after rotation
    pub fn width(&self) -> u16 {
        if self.rotation.swaps_axes() { self.height } else { self.width }
    }

    /// Height as seen by callers after rotation
    pub fn height(&self) -> u16 {
        if self.rotation.swaps_axes() { self.width } else { self.height }
    }

    /// Size of one wire frame, two bytes per pixel
    pub fn frame_bytes(&self) -> usize {
        2 * self.width as usize * self.height as usize
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            rotation: Rotation::default(),
            invert: true,
            offset_left: 0,
            offset_top: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Result<T> = std::result::Result<T, DisplayError<()>>;

    #[test]
    fn test_effective_dimensions() {
        for deg in [0u16, 90, 180, 270] {
            let cfg: PanelConfig = PanelConfig::new::<()>(240, 320, deg).unwrap();
            if deg == 90 || deg == 270 {
                assert_eq!((cfg.width(), cfg.height()), (320, 240), "{}", deg);
            } else {
                assert_eq!((cfg.width(), cfg.height()), (240, 320), "{}", deg);
            }
            assert_eq!(cfg.rotation().degrees(), deg);
        }
    }

    #[test]
    fn test_invalid_rotation() {
        let res: Result<PanelConfig> = PanelConfig::new(240, 240, 45);
        assert!(matches!(res, Err(DisplayError::InvalidRotation(45))));
    }

    #[test]
    fn test_offsets_must_stay_addressable() {
        let cfg = PanelConfig::new::<()>(240, 240, 0).unwrap();
        let ok: Result<PanelConfig> = cfg.with_offsets(65296, 65296);
        assert_eq!(ok.unwrap().offset_left(), 65296);

        let res: Result<PanelConfig> = cfg.with_offsets(65297, 0);
        assert!(matches!(res, Err(DisplayError::InvalidConfiguration(_))));
        let res: Result<PanelConfig> = cfg.with_offsets(0, u16::MAX);
        assert!(res.is_err());
    }

    #[test]
    fn test_zero_dimensions() {
        let res: Result<PanelConfig> = PanelConfig::new(0, 240, 0);
        assert!(matches!(res, Err(DisplayError::InvalidDimensions { width: 0, height: 240 })));
    }

    #[test]
    fn test_defaults_match_stock_panel() {
        let cfg = PanelConfig::default();
        assert_eq!((cfg.native_width(), cfg.native_height()), (240, 240));
        assert_eq!(cfg.rotation(), Rotation::Deg90);
        assert!(cfg.invert());
        assert_eq!((cfg.offset_left(), cfg.offset_top()), (0, 0));
        assert_eq!(cfg.frame_bytes(), 115_200);
    }
}
