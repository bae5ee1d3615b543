/*
 *  display/framer.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Command/data framing over SPI with bounded transactions
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
use log::trace;

use crate::display::transport::{Line, Transport};

/// Largest single SPI transaction, matches the default spidev `bufsiz`
pub const CHUNK_SIZE: usize = 4096;

/// Anything that can go out on the wire as one payload
///
/// A lone `u8` is sent as a one byte sequence.
pub trait WireBytes {
    fn wire_bytes(&self) -> &[u8];
}

impl WireBytes for u8 {
    fn wire_bytes(&self) -> &[u8] {
        std::slice::from_ref(self)
    }
}

impl WireBytes for [u8] {
    fn wire_bytes(&self) -> &[u8] {
        self
    }
}

impl<const N: usize> WireBytes for [u8; N] {
    fn wire_bytes(&self) -> &[u8] {
        self
    }
}

impl WireBytes for Vec<u8> {
    fn wire_bytes(&self) -> &[u8] {
        self
    }
}

impl<T: WireBytes + ?Sized> WireBytes for &T {
    fn wire_bytes(&self) -> &[u8] {
        (**self).wire_bytes()
    }
}

/// Drives the D/C line and splits payloads into SPI transactions
pub struct Framer<T> {
    transport: T,
}

impl<T: Transport> Framer<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Set D/C (low = command, high = data) and write `bytes` in order,
    /// at most [`CHUNK_SIZE`] bytes per transaction.
    pub fn send<B: WireBytes + ?Sized>(&mut self, bytes: &B, is_data: bool) -> Result<(), T::Error> {
        self.transport
            .set_line(Line::DataCommand, PinState::from(is_data))?;
        for chunk in bytes.wire_bytes().chunks(CHUNK_SIZE) {
            trace!("spi {} {} bytes", if is_data { "data" } else { "cmd" }, chunk.len());
            self.transport.write(chunk)?;
        }
        Ok(())
    }

    pub fn command<B: WireBytes + ?Sized>(&mut self, bytes: &B) -> Result<(), T::Error> {
        self.send(bytes, false)
    }

    pub fn data<B: WireBytes + ?Sized>(&mut self, bytes: &B) -> Result<(), T::Error> {
        self.send(bytes, true)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::mock::{MockEvent, MockTransport};

    fn write_sizes(mock: &MockTransport) -> Vec<usize> {
        mock.events()
            .iter()
            .filter_map(|e| match e {
                MockEvent::Write(bytes) => Some(bytes.len()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_chunk_counts() {
        for n in [0usize, 1, 4095, 4096, 4097, 1_000_000] {
            let mock = MockTransport::new();
            let mut framer = Framer::new(mock.clone());
            let payload: Vec<u8> = (0..n).map(|i| (i % 251) as u8).collect();

            framer.data(&payload).unwrap();

            let sizes = write_sizes(&mock);
            assert_eq!(sizes.len(), n.div_ceil(CHUNK_SIZE), "n = {}", n);
            assert!(sizes.iter().all(|&s| s <= CHUNK_SIZE));
            assert_eq!(mock.written_bytes(), payload, "n = {}", n);
        }
    }

    #[test]
    fn test_scalar_is_single_byte() {
        let mock = MockTransport::new();
        let mut framer = Framer::new(mock.clone());

        framer.command(&0x2Cu8).unwrap();

        assert_eq!(
            mock.events(),
            vec![
                MockEvent::Line(Line::DataCommand, PinState::Low),
                MockEvent::Write(vec![0x2C]),
            ]
        );
    }

    #[test]
    fn test_dc_level_follows_kind() {
        let mock = MockTransport::new();
        let mut framer = Framer::new(mock.clone());

        framer.command(&0x2Au8).unwrap();
        framer.data(&[0x00u8, 0xEF]).unwrap();

        assert_eq!(
            mock.events(),
            vec![
                MockEvent::Line(Line::DataCommand, PinState::Low),
                MockEvent::Write(vec![0x2A]),
                MockEvent::Line(Line::DataCommand, PinState::High),
                MockEvent::Write(vec![0x00, 0xEF]),
            ]
        );
    }

    #[test]
    fn test_transport_failure_stops_stream() {
        let mock = MockTransport::new();
        mock.fail_after_writes(1);
        let mut framer = Framer::new(mock.clone());

        let payload = vec![0xAAu8; CHUNK_SIZE * 3];
        assert!(framer.data(&payload).is_err());

        // first chunk went out, nothing after the failing one
        assert_eq!(mock.written_bytes().len(), CHUNK_SIZE);
    }
}
