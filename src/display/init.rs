/*
 *  display/init.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  GC9A01 power-on, reset and register bring-up sequence
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

use embedded_hal::digital::PinState;
use log::debug;

use crate::display::framer::Framer;
use crate::display::transport::{Line, Transport};

/// Documented opcodes (GC9A01, shared with ST7789)
pub mod cmd {
    pub const SLEEP_OUT: u8 = 0x11;
    pub const DISPLAY_INVERSION_ON: u8 = 0x21;
    pub const DISPLAY_ON: u8 = 0x29;
    pub const CASET: u8 = 0x2A;
    pub const RASET: u8 = 0x2B;
    pub const RAMWR: u8 = 0x2C;
    pub const RAMRD: u8 = 0x2E;
    pub const TEARING_EFFECT_LINE_ON: u8 = 0x35;
    pub const MEMORY_ACCESS_CONTROL: u8 = 0x36;
    pub const PIXEL_FORMAT_SET: u8 = 0x3A;
}

/// COLMOD parameter for 16 bit 565 pixels
pub const PIXEL_FORMAT_RGB565: u8 = 0x05;

/// MADCTL values indexed by scan orientation
pub const MEMORY_ACCESS_TABLE: [u8; 4] = [0x18, 0x28, 0x48, 0x88];

/// Only the normal scan direction is used; rotation happens in software
pub const SCAN_ORIENTATION: usize = 0;

pub const RESET_PULSE_MS: u32 = 500;
pub const BACKLIGHT_SETTLE_MS: u32 = 100;
pub const SLEEP_OUT_SETTLE_MS: u32 = 120;
pub const DISPLAY_ON_SETTLE_MS: u32 = 20;

/// One entry of the bring-up table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStep {
    /// Command byte followed by zero or more parameter bytes
    Write { cmd: u8, params: &'static [u8] },
    /// MADCTL with the value picked from [`MEMORY_ACCESS_TABLE`]
    MemoryAccess,
    /// Settle time after the previous command
    Delay(u32),
}

const fn write(cmd: u8, params: &'static [u8]) -> InitStep {
    InitStep::Write { cmd, params }
}

/// Vendor bring-up sequence. The undocumented registers come from the panel
/// vendor's reference code and must stay byte-for-byte and in this order.
pub static INIT_SEQUENCE: &[InitStep] = &[
    write(0xEF, &[]),
    write(0xEB, &[0x14]),
    write(0xFE, &[]),
    write(0xEF, &[]),
    write(0xEB, &[0x14]),
    write(0x84, &[0x40]),
    write(0x85, &[0xFF]),
    write(0x86, &[0xFF]),
    write(0x87, &[0xFF]),
    write(0x88, &[0x0A]),
    write(0x89, &[0x21]),
    write(0x8A, &[0x00]),
    write(0x8B, &[0x80]),
    write(0x8C, &[0x01]),
    write(0x8D, &[0x01]),
    write(0x8E, &[0xFF]),
    write(0x8F, &[0xFF]),
    write(0xB6, &[0x00, 0x00]),
    InitStep::MemoryAccess,
    write(cmd::PIXEL_FORMAT_SET, &[PIXEL_FORMAT_RGB565]),
    write(0x90, &[0x08, 0x08, 0x08, 0x08]),
    write(0xBD, &[0x06]),
    write(0xBC, &[0x00]),
    write(0xFF, &[0x60, 0x01, 0x04]),
    write(0xC3, &[0x13]),
    write(0xC4, &[0x13]),
    write(0xC9, &[0x22]),
    write(0xBE, &[0x11]),
    write(0xE1, &[0x10, 0x0E]),
    write(0xDF, &[0x21, 0x0C, 0x02]),
    write(0xF0, &[0x45, 0x09, 0x08, 0x08, 0x26, 0x2A]),
    write(0xF1, &[0x43, 0x70, 0x72, 0x36, 0x37, 0x6F]),
    write(0xF2, &[0x45, 0x09, 0x08, 0x08, 0x26, 0x2A]),
    write(0xF3, &[0x43, 0x70, 0x72, 0x36, 0x37, 0x6F]),
    write(0xED, &[0x1B, 0x0B]),
    write(0xAE, &[0x77]),
    write(0xCD, &[0x63]),
    write(0x70, &[0x07, 0x07, 0x04, 0x0E, 0x0F, 0x09, 0x07, 0x08, 0x03]),
    write(0xE8, &[0x34]),
    write(0x62, &[0x18, 0x0D, 0x71, 0xED, 0x70, 0x70, 0x18, 0x0F, 0x71, 0xEF, 0x70, 0x70]),
    write(0x63, &[0x18, 0x11, 0x71, 0xF1, 0x70, 0x70, 0x18, 0x13, 0x71, 0xF3, 0x70, 0x70]),
    write(0x64, &[0x28, 0x29, 0xF1, 0x01, 0xF1, 0x00, 0x07]),
    write(0x66, &[0x3C, 0x00, 0xCD, 0x67, 0x45, 0x45, 0x10, 0x00, 0x00, 0x00]),
    write(0x67, &[0x00, 0x3C, 0x00, 0x00, 0x00, 0x01, 0x54, 0x10, 0x32, 0x98]),
    write(0x74, &[0x10, 0x85, 0x80, 0x00, 0x00, 0x4E, 0x00]),
    write(0x98, &[0x3E, 0x07]),
    write(cmd::TEARING_EFFECT_LINE_ON, &[]),
    write(cmd::DISPLAY_INVERSION_ON, &[]),
    write(cmd::SLEEP_OUT, &[]),
    InitStep::Delay(SLEEP_OUT_SETTLE_MS),
    write(cmd::DISPLAY_ON, &[]),
    InitStep::Delay(DISPLAY_ON_SETTLE_MS),
];

/// Backlight off, wait, on. Avoids a visible flash while the panel powers up.
pub fn power_on_backlight<T: Transport>(transport: &mut T) -> Result<(), T::Error> {
    if !transport.has_line(Line::Backlight) {
        return Ok(());
    }
    transport.set_line(Line::Backlight, PinState::Low)?;
    transport.delay_ms(BACKLIGHT_SETTLE_MS);
    transport.set_line(Line::Backlight, PinState::High)
}

/// Hardware reset: high, low, high with a full pulse wait after each edge
pub fn hardware_reset<T: Transport>(transport: &mut T) -> Result<(), T::Error> {
    if !transport.has_line(Line::Reset) {
        debug!("no reset line, skipping hardware reset");
        return Ok(());
    }
    for level in [PinState::High, PinState::Low, PinState::High] {
        transport.set_line(Line::Reset, level)?;
        transport.delay_ms(RESET_PULSE_MS);
    }
    Ok(())
}

/// Replay [`INIT_SEQUENCE`] through the framer
pub fn run_sequence<T: Transport>(framer: &mut Framer<T>) -> Result<(), T::Error> {
    for step in INIT_SEQUENCE {
        match *step {
            InitStep::Write { cmd, params } => {
                framer.command(&cmd)?;
                if !params.is_empty() {
                    framer.data(params)?;
                }
            }
            InitStep::MemoryAccess => {
                framer.command(&cmd::MEMORY_ACCESS_CONTROL)?;
                framer.data(&MEMORY_ACCESS_TABLE[SCAN_ORIENTATION])?;
            }
            InitStep::Delay(ms) => framer.transport_mut().delay_ms(ms),
        }
    }
    debug!("init sequence sent ({} steps)", INIT_SEQUENCE.len());
    Ok(())
}
