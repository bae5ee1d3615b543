/*
 *  display/drivers/gc9a01.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  GC9A01 240x240 round TFT driver
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
use log::{debug, info, warn};

use crate::display::error::DisplayError;
use crate::display::framebuffer::RgbFrame;
use crate::display::framer::{Framer, CHUNK_SIZE};
use crate::display::init::{self, cmd};
use crate::display::panel::PanelConfig;
use crate::display::pixel;
use crate::display::transport::{Line, Transport};
use crate::display::window::Bounds;

/// Driver lifecycle
///
/// Only `Ready` accepts window and frame writes. A transport failure during
/// bring-up leaves the driver in the phase where it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Uninitialized,
    Resetting,
    Initializing,
    Ready,
}

/// GC9A01 panel on an SPI transport
///
/// Owns the transport exclusively. Calls block until the bus is done; share
/// between threads behind a `Mutex` held for the whole `display()` call.
pub struct Gc9a01<T: Transport> {
    framer: Framer<T>,
    config: PanelConfig,
    state: DriverState,
}

type Result<T, E> = std::result::Result<T, DisplayError<E>>;

impl<T: Transport> Gc9a01<T> {
    /// Create and fully bring up the panel: backlight, reset, init sequence
    pub fn new(transport: T, config: PanelConfig) -> Result<Self, T::Error> {
        let mut driver = Self::new_uninit(transport, config);
        driver.init()?;
        Ok(driver)
    }

    /// Create without touching the hardware; call [`init`](Self::init) before use
    pub fn new_uninit(transport: T, config: PanelConfig) -> Self {
        Self {
            framer: Framer::new(transport),
            config,
            state: DriverState::Uninitialized,
        }
    }

    /// Run the power-on sequence. Valid from any state but `Ready`, so a
    /// bring-up interrupted by a bus error can be retried.
    pub fn init(&mut self) -> Result<(), T::Error> {
        if self.state == DriverState::Ready {
            return Err(DisplayError::NotReady { operation: "init", state: self.state });
        }

        info!(
            "Initializing GC9A01 {}x{} rotation {} offset ({}, {})",
            self.config.native_width(),
            self.config.native_height(),
            self.config.rotation(),
            self.config.offset_left(),
            self.config.offset_top()
        );
        if !self.config.invert() {
            warn!("invert=false ignored, GC9A01 init always enables display inversion");
        }

        self.state = DriverState::Resetting;
        let transport = self.framer.transport_mut();
        init::power_on_backlight(transport).map_err(DisplayError::Transport)?;
        init::hardware_reset(transport).map_err(DisplayError::Transport)?;

        self.state = DriverState::Initializing;
        init::run_sequence(&mut self.framer).map_err(DisplayError::Transport)?;

        self.state = DriverState::Ready;
        info!("GC9A01 ready");
        Ok(())
    }

    fn ensure_ready(&self, operation: &'static str) -> Result<(), T::Error> {
        match self.state {
            DriverState::Ready => Ok(()),
            state => Err(DisplayError::NotReady { operation, state }),
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Width after rotation
    pub fn width(&self) -> u16 {
        self.config.width()
    }

    /// Height after rotation
    pub fn height(&self) -> u16 {
        self.config.height()
    }

    /// Switch the backlight; does nothing when no backlight line is wired
    pub fn set_backlight(&mut self, on: bool) -> Result<(), T::Error> {
        self.framer
            .transport_mut()
            .set_line(Line::Backlight, PinState::from(on))
            .map_err(DisplayError::Transport)
    }

    /// Program the controller's write region and open RAM write
    ///
    /// Bounds are in controller coordinates; missing corners default to the
    /// full native frame. The panel offsets are added before sending.
    pub fn set_window(&mut self, bounds: Bounds) -> Result<(), T::Error> {
        self.ensure_ready("set_window")?;
        let window = bounds
            .resolve(self.config.native_width(), self.config.native_height())?
            .offset::<T::Error>(self.config.offset_left(), self.config.offset_top())?;
        debug!("window {:?}", window);

        self.framer.command(&cmd::CASET).map_err(DisplayError::Transport)?;
        self.framer.data(&window.column_params()).map_err(DisplayError::Transport)?;
        self.framer.command(&cmd::RASET).map_err(DisplayError::Transport)?;
        self.framer.data(&window.row_params()).map_err(DisplayError::Transport)?;
        self.framer.command(&cmd::RAMWR).map_err(DisplayError::Transport)?;
        Ok(())
    }

    /// Transcode `frame` at the configured rotation and write it full-screen
    ///
    /// `frame` must be `width()` x `height()`. If the bus fails part way the
    /// frame is abandoned; call again to redraw.
    pub fn display(&mut self, frame: &RgbFrame) -> Result<(), T::Error> {
        self.ensure_ready("display")?;
        let (w, h) = (self.width() as usize, self.height() as usize);
        if frame.width() != w || frame.height() != h {
            return Err(DisplayError::BufferSizeMismatch {
                expected: w * h * pixel::RGB_BYTES,
                actual: frame.as_bytes().len(),
            });
        }

        let wire = pixel::transcode(frame.as_bytes(), w, h, self.config.rotation());
        self.display_raw(&wire)
    }

    /// Write an already packed RGB565 frame in controller order
    pub fn display_raw(&mut self, wire: &[u8]) -> Result<(), T::Error> {
        self.ensure_ready("display")?;
        let expected = self.config.frame_bytes();
        if wire.len() != expected {
            return Err(DisplayError::BufferSizeMismatch { expected, actual: wire.len() });
        }

        self.set_window(Bounds::full())?;
        debug!("streaming {} bytes", wire.len());
        for chunk in wire.chunks(CHUNK_SIZE) {
            self.framer.data(chunk).map_err(DisplayError::Transport)?;
        }
        Ok(())
    }

    /// Stream raw pixel bytes into the current window without reprogramming it
    pub fn write_pixels(&mut self, wire: &[u8]) -> Result<(), T::Error> {
        self.ensure_ready("write_pixels")?;
        self.framer.data(wire).map_err(DisplayError::Transport)
    }

    /// Give back the transport
    pub fn release(self) -> T {
        self.framer.into_inner()
    }
}
