/*
 *  tests/display_integration.rs
 *
 *  Integration tests for the GC9A01 driver through its public API
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 */

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_hal::digital::PinState;

use lymons_gc9a01::config;
use lymons_gc9a01::display::init::{cmd, InitStep, INIT_SEQUENCE};
use lymons_gc9a01::display::{
    pixel, Bounds, DriverState, Gc9a01, Line, MockEvent, MockTransport, PanelConfig, RgbFrame,
    CHUNK_SIZE,
};

fn panel(width: u16, height: u16, rotation: u16) -> PanelConfig {
    PanelConfig::new::<()>(width, height, rotation).unwrap()
}

/// Split the recorded writes into (is_data, bytes) using the D/C level before each
fn framed(events: &[MockEvent]) -> Vec<(bool, Vec<u8>)> {
    let mut dc = false;
    let mut out = Vec::new();
    for event in events {
        match event {
            MockEvent::Line(Line::DataCommand, level) => dc = *level == PinState::High,
            MockEvent::Write(bytes) => out.push((dc, bytes.clone())),
            _ => {}
        }
    }
    out
}

#[test]
fn test_bring_up_then_red_frame() {
    let mock = MockTransport::new();
    let mut lcd = Gc9a01::new(mock.clone(), PanelConfig::default()).unwrap();
    assert_eq!(lcd.state(), DriverState::Ready);
    assert!(mock.delays().starts_with(&[100, 500, 500, 500]));

    mock.clear();
    let frame = RgbFrame::new(240, 240, Rgb888::new(255, 0, 0));
    lcd.display(&frame).unwrap();

    let writes = framed(&mock.events());
    assert_eq!(writes[0], (false, vec![cmd::CASET]));
    assert_eq!(writes[1], (true, vec![0x00, 0x00, 0x00, 0xEF]));
    assert_eq!(writes[2], (false, vec![cmd::RASET]));
    assert_eq!(writes[3], (true, vec![0x00, 0x00, 0x00, 0xEF]));
    assert_eq!(writes[4], (false, vec![cmd::RAMWR]));

    assert!(writes[5..].iter().all(|(dc, _)| *dc));
    let pixels: Vec<u8> = writes[5..].iter().flat_map(|(_, b)| b.clone()).collect();
    assert_eq!(pixels.len(), 240 * 240 * 2);
    assert!(pixels.chunks_exact(2).all(|px| px == [0xF8, 0x00]));
    assert_eq!(writes.len() - 5, (240 * 240 * 2usize).div_ceil(CHUNK_SIZE));
    assert!(writes[5..].iter().all(|(_, b)| b.len() <= CHUNK_SIZE));
}

#[test]
fn test_init_stream_matches_table() {
    let mock = MockTransport::new();
    Gc9a01::new(mock.clone(), PanelConfig::default()).unwrap();

    let writes = framed(&mock.events());
    let commands: Vec<u8> = writes.iter().filter(|(dc, _)| !dc).map(|(_, b)| b[0]).collect();
    let steps = INIT_SEQUENCE.iter().filter(|s| !matches!(s, InitStep::Delay(_))).count();
    assert_eq!(commands.len(), steps);
    assert_eq!(commands.first(), Some(&0xEF));
    assert_eq!(&commands[commands.len() - 3..], &[cmd::DISPLAY_INVERSION_ON, cmd::SLEEP_OUT, cmd::DISPLAY_ON]);
    assert!(writes.contains(&(true, vec![0x18])));
}

#[test]
fn test_every_rotation_streams_native_frame() {
    for deg in [0, 90, 180, 270] {
        let mock = MockTransport::new();
        let mut lcd = Gc9a01::new(mock.clone(), panel(240, 240, deg)).unwrap();
        mock.clear();

        let mut frame = RgbFrame::new(240, 240, Rgb888::BLACK);
        Rectangle::new(Point::zero(), Size::new(1, 1))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::WHITE))
            .draw(&mut frame)
            .unwrap();
        lcd.display(&frame).unwrap();

        let bytes = mock.written_bytes();
        let pixels = &bytes[bytes.len() - 240 * 240 * 2..];
        let white: Vec<usize> = pixels
            .chunks_exact(2)
            .enumerate()
            .filter(|(_, px)| *px == [0xFF, 0xFF])
            .map(|(i, _)| i)
            .collect();
        assert_eq!(white.len(), 1, "rotation {}", deg);

        // top-left source pixel lands on a controller corner
        let (x, y) = (white[0] % 240, white[0] / 240);
        let expected = match deg {
            0 => (0, 0),
            90 => (0, 239),
            180 => (239, 239),
            _ => (239, 0),
        };
        assert_eq!((x, y), expected, "rotation {}", deg);
    }
}

#[test]
fn test_non_square_panel() {
    let mock = MockTransport::new();
    let mut lcd = Gc9a01::new(mock.clone(), panel(240, 320, 90)).unwrap();
    assert_eq!((lcd.width(), lcd.height()), (320, 240));

    let wrong = RgbFrame::new(240, 320, Rgb888::BLACK);
    assert!(lcd.display(&wrong).is_err());

    mock.clear();
    lcd.display(&RgbFrame::new(320, 240, Rgb888::BLUE)).unwrap();
    let writes = framed(&mock.events());
    assert_eq!(writes[1].1, vec![0x00, 0x00, 0x00, 0xEF]);
    assert_eq!(writes[3].1, vec![0x00, 0x00, 0x01, 0x3F]);
}

#[test]
fn test_partial_window_then_pixels() {
    let mock = MockTransport::new();
    let mut lcd = Gc9a01::new(mock.clone(), PanelConfig::default()).unwrap();
    mock.clear();

    lcd.set_window(Bounds::new(10, 20, 19, 29)).unwrap();
    let block = vec![0x07u8; 10 * 10 * pixel::WIRE_BYTES];
    lcd.write_pixels(&block).unwrap();

    let writes = framed(&mock.events());
    assert_eq!(writes[1].1, vec![0x00, 10, 0x00, 19]);
    assert_eq!(writes[3].1, vec![0x00, 20, 0x00, 29]);
    assert_eq!(writes[5], (true, block));
}

#[test]
fn test_recovery_after_bus_failure() {
    let mock = MockTransport::new();
    mock.fail_after_writes(3);

    let mut lcd = Gc9a01::new_uninit(mock.clone(), PanelConfig::default());
    assert!(lcd.init().is_err());
    assert_ne!(lcd.state(), DriverState::Ready);

    let frame = RgbFrame::new(240, 240, Rgb888::BLACK);
    let err = lcd.display(&frame).unwrap_err();
    assert!(err.is_sequencing());

    mock.heal();
    lcd.init().unwrap();
    lcd.display(&frame).unwrap();
}

#[test]
fn test_panel_from_yaml() {
    let cfg = config::parse_yaml(
        "display:\n  width: 240\n  height: 240\n  rotate_deg: 270\n  offset_left: 0\n  offset_top: 0\n",
    )
    .unwrap();
    let panel = cfg.display.unwrap().panel_config().unwrap();

    let mock = MockTransport::with_lines(&[Line::DataCommand]);
    let mut lcd = Gc9a01::new(mock.clone(), panel).unwrap();
    assert!(!mock.events().iter().any(|e| matches!(e, MockEvent::Line(Line::Reset, _))));
    lcd.set_backlight(false).unwrap();
    lcd.display(&RgbFrame::new(240, 240, Rgb888::GREEN)).unwrap();
}

#[test]
fn test_unaddressable_offset_rejected_before_bring_up() {
    let cfg = config::parse_yaml("display: {width: 240, height: 240, rotate_deg: 0, offset_left: 65400}")
        .unwrap();
    assert!(cfg.display.unwrap().panel_config().is_err());

    let res = PanelConfig::new::<()>(240, 240, 0).and_then(|c| c.with_offsets(0, 65400));
    assert!(res.is_err());
}
