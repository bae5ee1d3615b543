/*
 *  display/transport.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  SPI/GPIO capability consumed by the panel driver
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

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal::spi::SpiDevice;
use thiserror::Error;

/// Control lines the driver toggles besides the SPI bus itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
    /// Data/Command select, low = command, high = data
    DataCommand,
    /// Active-low hardware reset
    Reset,
    /// Backlight enable
    Backlight,
}

/// Minimal hardware capability the driver needs
///
/// Implementations own the bus and the lines exclusively. Lines are already
/// configured as outputs by the time the transport is handed to the driver.
/// Every call blocks until the hardware has finished.
pub trait Transport {
    type Error: fmt::Debug;

    /// Write `bytes` as a single SPI transaction
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Drive a control line
    fn set_line(&mut self, line: Line, state: PinState) -> Result<(), Self::Error>;

    /// Whether the optional `line` is wired up
    fn has_line(&self, line: Line) -> bool;

    /// Block for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        T::write(self, bytes)
    }

    fn set_line(&mut self, line: Line, state: PinState) -> Result<(), Self::Error> {
        T::set_line(self, line, state)
    }

    fn has_line(&self, line: Line) -> bool {
        T::has_line(self, line)
    }

    fn delay_ms(&mut self, ms: u32) {
        T::delay_ms(self, ms)
    }
}

/// Error from an embedded-hal backed transport
#[derive(Debug, Error)]
pub enum HalError<SpiE: fmt::Debug, PinE: fmt::Debug> {
    #[error("SPI error: {0:?}")]
    Spi(SpiE),
    #[error("GPIO error: {0:?}")]
    Pin(PinE),
}

/// [`Transport`] over embedded-hal 1.0 SPI device, output pins and delay
pub struct HalTransport<SPI, P, D> {
    spi: SPI,
    dc: P,
    rst: Option<P>,
    backlight: Option<P>,
    delay: D,
}

impl<SPI, P, D> HalTransport<SPI, P, D>
where
    SPI: SpiDevice,
    P: OutputPin,
    D: DelayNs,
{
    pub fn new(spi: SPI, dc: P, rst: Option<P>, backlight: Option<P>, delay: D) -> Self {
        Self { spi, dc, rst, backlight, delay }
    }

    /// Give back the owned peripherals
    pub fn release(self) -> (SPI, P, Option<P>, Option<P>, D) {
        (self.spi, self.dc, self.rst, self.backlight, self.delay)
    }

    fn pin(&mut self, line: Line) -> Option<&mut P> {
        match line {
            Line::DataCommand => Some(&mut self.dc),
            Line::Reset => self.rst.as_mut(),
            Line::Backlight => self.backlight.as_mut(),
        }
    }
}

impl<SPI, P, D> Transport for HalTransport<SPI, P, D>
where
    SPI: SpiDevice,
    P: OutputPin,
    D: DelayNs,
{
    type Error = HalError<SPI::Error, P::Error>;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.spi.write(bytes).map_err(HalError::Spi)
    }

    fn set_line(&mut self, line: Line, state: PinState) -> Result<(), Self::Error> {
        match self.pin(line) {
            Some(pin) => pin.set_state(state).map_err(HalError::Pin),
            None => Ok(()),
        }
    }

    fn has_line(&self, line: Line) -> bool {
        match line {
            Line::DataCommand => true,
            Line::Reset => self.rst.is_some(),
            Line::Backlight => self.backlight.is_some(),
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct FakeSpi {
        log: Log,
        fail: bool,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct FakeSpiError;

    impl embedded_hal::spi::Error for FakeSpiError {
        fn kind(&self) -> embedded_hal::spi::ErrorKind {
            embedded_hal::spi::ErrorKind::Other
        }
    }

    impl embedded_hal::spi::ErrorType for FakeSpi {
        type Error = FakeSpiError;
    }

    impl SpiDevice for FakeSpi {
        fn transaction(
            &mut self,
            operations: &mut [embedded_hal::spi::Operation<'_, u8>],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err(FakeSpiError);
            }
            for op in operations.iter() {
                if let embedded_hal::spi::Operation::Write(bytes) = op {
                    self.log.borrow_mut().push(format!("spi {:02X?}", bytes));
                }
            }
            Ok(())
        }
    }

    struct FakePin {
        name: &'static str,
        log: Log,
    }

    impl embedded_hal::digital::ErrorType for FakePin {
        type Error = core::convert::Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.log.borrow_mut().push(format!("{} low", self.name));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.log.borrow_mut().push(format!("{} high", self.name));
            Ok(())
        }
    }

    struct FakeDelay {
        log: Log,
    }

    impl DelayNs for FakeDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.log.borrow_mut().push(format!("delay {}ns", ns));
        }

        fn delay_ms(&mut self, ms: u32) {
            self.log.borrow_mut().push(format!("delay {}ms", ms));
        }
    }

    fn transport(log: &Log, with_optional: bool, fail: bool) -> HalTransport<FakeSpi, FakePin, FakeDelay> {
        let pin = |name| FakePin { name, log: Rc::clone(log) };
        HalTransport::new(
            FakeSpi { log: Rc::clone(log), fail },
            pin("dc"),
            with_optional.then(|| pin("rst")),
            with_optional.then(|| pin("bl")),
            FakeDelay { log: Rc::clone(log) },
        )
    }

    #[test]
    fn test_hal_transport_routes_lines() {
        let log: Log = Rc::default();
        let mut t = transport(&log, true, false);

        t.set_line(Line::DataCommand, PinState::Low).unwrap();
        t.set_line(Line::Reset, PinState::High).unwrap();
        t.set_line(Line::Backlight, PinState::Low).unwrap();
        t.write(&[0x2A, 0x00]).unwrap();
        t.delay_ms(120);

        assert_eq!(
            *log.borrow(),
            vec!["dc low", "rst high", "bl low", "spi [2A, 00]", "delay 120ms"]
        );
    }

    #[test]
    fn test_hal_transport_missing_optional_lines() {
        let log: Log = Rc::default();
        let mut t = transport(&log, false, false);

        assert!(t.has_line(Line::DataCommand));
        assert!(!t.has_line(Line::Reset));
        assert!(!t.has_line(Line::Backlight));

        // unwired lines are silently skipped
        t.set_line(Line::Backlight, PinState::High).unwrap();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_hal_transport_spi_error_verbatim() {
        let log: Log = Rc::default();
        let mut t = transport(&log, false, true);

        match t.write(&[0x00]) {
            Err(HalError::Spi(FakeSpiError)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_hal_error_messages() {
        let err: HalError<FakeSpiError, core::convert::Infallible> = HalError::Spi(FakeSpiError);
        assert_eq!(err.to_string(), "SPI error: FakeSpiError");

        let err: HalError<FakeSpiError, &str> = HalError::Pin("line busy");
        assert_eq!(err.to_string(), "GPIO error: \"line busy\"");

        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }
}
