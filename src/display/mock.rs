/*
 *  display/mock.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Recording transport for testing without hardware
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

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use embedded_hal::digital::PinState;

use crate::display::transport::{Line, Transport};

/// One observed transport operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    Write(Vec<u8>),
    Line(Line, PinState),
    Delay(u32),
}

/// Error returned when a failure is simulated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockFailure {
    /// Index of the write that failed
    pub write_index: usize,
}

/// Mock transport for testing
///
/// Nothing touches hardware: every write, line change and delay is appended
/// to a shared log. Clones share the same log, so a test can hand one clone
/// to the driver and inspect the other.
///
/// - Unit tests
/// - Integration tests
/// - `--dry-run` on hosts without the panel attached
#[derive(Debug, Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockTransportState>>,
}

/// Internal state for the mock transport (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockTransportState {
    /// Everything that happened, in order
    pub events: Vec<MockEvent>,

    /// Lines that are wired up
    pub lines: HashSet<Line>,

    /// Number of successful writes
    pub write_count: usize,

    /// Fail the write after this many successful ones
    pub fail_after_writes: Option<usize>,
}

impl MockTransport {
    /// Mock with D/C, reset and backlight all wired
    pub fn new() -> Self {
        Self::with_lines(&[Line::DataCommand, Line::Reset, Line::Backlight])
    }

    /// Mock with only the given optional lines wired (D/C is always present)
    pub fn with_lines(lines: &[Line]) -> Self {
        let mut state = MockTransportState::default();
        state.lines.insert(Line::DataCommand);
        state.lines.extend(lines.iter().copied());
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockTransportState> {
        // a test that panicked while holding the lock still leaves a readable log
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> Vec<MockEvent> {
        self.lock().events.clone()
    }

    /// Concatenation of every byte written so far
    pub fn written_bytes(&self) -> Vec<u8> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match e {
                MockEvent::Write(bytes) => Some(bytes.as_slice()),
                _ => None,
            })
            .flatten()
            .copied()
            .collect()
    }

    /// Delays in the order they were requested
    pub fn delays(&self) -> Vec<u32> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match e {
                MockEvent::Delay(ms) => Some(*ms),
                _ => None,
            })
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.lock().write_count
    }

    /// Make the write following `n` successful writes fail
    pub fn fail_after_writes(&self, n: usize) {
        self.lock().fail_after_writes = Some(n);
    }

    /// Stop simulating failures
    pub fn heal(&self) {
        self.lock().fail_after_writes = None;
    }

    /// Reset the log (useful between phases of a test)
    pub fn clear(&self) {
        let mut state = self.lock();
        state.events.clear();
        state.write_count = 0;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    type Error = MockFailure;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut state = self.lock();
        if state.fail_after_writes.is_some_and(|n| state.write_count >= n) {
            return Err(MockFailure {
                write_index: state.write_count,
            });
        }
        state.write_count += 1;
        state.events.push(MockEvent::Write(bytes.to_vec()));
        Ok(())
    }

    fn set_line(&mut self, line: Line, pin_state: PinState) -> Result<(), Self::Error> {
        let mut state = self.lock();
        if state.lines.contains(&line) {
            state.events.push(MockEvent::Line(line, pin_state));
        }
        Ok(())
    }

    fn has_line(&self, line: Line) -> bool {
        self.lock().lines.contains(&line)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.lock().events.push(MockEvent::Delay(ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_in_order() {
        let mock = MockTransport::new();
        let mut t = mock.clone();

        t.set_line(Line::Reset, PinState::Low).unwrap();
        t.delay_ms(5);
        t.write(&[1, 2, 3]).unwrap();

        assert_eq!(
            mock.events(),
            vec![
                MockEvent::Line(Line::Reset, PinState::Low),
                MockEvent::Delay(5),
                MockEvent::Write(vec![1, 2, 3]),
            ]
        );
        assert_eq!(mock.write_count(), 1);
        assert_eq!(mock.delays(), vec![5]);
    }

    #[test]
    fn test_mock_unwired_lines() {
        let mock = MockTransport::with_lines(&[]);
        let mut t = mock.clone();

        assert!(t.has_line(Line::DataCommand));
        assert!(!t.has_line(Line::Reset));

        t.set_line(Line::Backlight, PinState::High).unwrap();
        assert!(mock.events().is_empty());
    }

    #[test]
    fn test_mock_simulated_failure() {
        let mock = MockTransport::new();
        let mut t = mock.clone();
        mock.fail_after_writes(2);

        assert!(t.write(&[0]).is_ok());
        assert!(t.write(&[1]).is_ok());
        assert_eq!(t.write(&[2]), Err(MockFailure { write_index: 2 }));

        mock.heal();
        assert!(t.write(&[3]).is_ok());
        assert_eq!(mock.written_bytes(), vec![0, 1, 3]);
    }
}
