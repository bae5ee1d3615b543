/*
 *  display/mod.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - GC9A01 round TFT over SPI
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

// Wire level
pub mod transport;
pub mod framer;
pub mod init;
pub mod window;

// Pixels and geometry
pub mod pixel;
pub mod panel;
pub mod framebuffer;

pub mod error;
pub mod drivers;

// Recording transport for tests and dry runs
pub mod mock;

#[cfg(feature = "linux-hal")]
pub mod linux;

pub use drivers::gc9a01::{DriverState, Gc9a01};
pub use error::{BusError, DisplayError};
pub use framebuffer::RgbFrame;
pub use framer::{Framer, CHUNK_SIZE};
pub use mock::{MockEvent, MockTransport};
pub use panel::{PanelConfig, Rotation};
pub use transport::{HalTransport, Line, Transport};
pub use window::{Bounds, Window};
