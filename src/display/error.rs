/*
 *  display/error.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Unified error types for the GC9A01 display subsystem
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
use thiserror::Error;

use crate::display::drivers::gc9a01::DriverState;

/// Unified error type for all display operations
///
/// `E` is the error type of the transport the driver was built on; transport
/// failures are handed back untouched in [`DisplayError::Transport`].
#[derive(Debug, Error)]
pub enum DisplayError<E: fmt::Debug> {
    /// Invalid rotation angle
    #[error("Invalid rotation angle: {0} (must be 0, 90, 180, or 270)")]
    InvalidRotation(u16),

    /// Zero width or height
    #[error("Invalid panel dimensions: {width}x{height} (both must be > 0)")]
    InvalidDimensions { width: u16, height: u16 },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Frame or wire buffer does not match the panel
    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Addressing window outside the controller frame
    #[error("Window ({x0},{y0})-({x1},{y1}) outside {width}x{height} frame")]
    WindowOutOfBounds {
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
        width: u16,
        height: u16,
    },

    /// Operation invoked before the controller finished bring-up
    #[error("{operation} called while driver is {state:?}")]
    NotReady {
        operation: &'static str,
        state: DriverState,
    },

    /// SPI or GPIO failure, propagated as-is
    #[error("Transport error: {0:?}")]
    Transport(E),
}

impl<E: fmt::Debug> DisplayError<E> {
    /// True for the sequencing class of errors (programming contract violations)
    pub fn is_sequencing(&self) -> bool {
        matches!(self, DisplayError::NotReady { .. })
    }

    /// True for errors raised while validating construction parameters
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DisplayError::InvalidRotation(_)
                | DisplayError::InvalidDimensions { .. }
                | DisplayError::InvalidConfiguration(_)
        )
    }
}

/// Errors raised while opening the host SPI device and GPIO lines
#[derive(Debug, Error)]
pub enum BusError {
    /// No bus section in the configuration
    #[error("No bus configuration specified")]
    NoBusConfiguration,

    /// spidev could not be opened or configured
    #[error("Failed to open SPI device {path}: {message}")]
    Spi { path: String, message: String },

    /// GPIO chip or line could not be requested
    #[error("Failed to claim GPIO line {line} on {chip}: {message}")]
    Gpio { chip: String, line: u32, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        let err: DisplayError<()> = DisplayError::InvalidRotation(45);
        assert!(err.is_configuration());
        assert!(!err.is_sequencing());

        let err: DisplayError<()> = DisplayError::NotReady {
            operation: "display",
            state: DriverState::Uninitialized,
        };
        assert!(err.is_sequencing());
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_error_messages() {
        let err: DisplayError<()> = DisplayError::InvalidRotation(45);
        assert_eq!(
            err.to_string(),
            "Invalid rotation angle: 45 (must be 0, 90, 180, or 270)"
        );

        let err: DisplayError<&str> = DisplayError::Transport("bus fault");
        assert_eq!(err.to_string(), "Transport error: \"bus fault\"");
    }
}
