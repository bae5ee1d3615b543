/*
 *  display/linux.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  spidev + gpio-cdev transport for Linux SBCs
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

use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::{CdevPin, Delay, SpidevDevice};
use log::{debug, info};

use crate::config::BusConfig;
use crate::display::error::BusError;
use crate::display::transport::HalTransport;

/// Hardware transport: spidev for pixels, character-device GPIO for control lines
pub type LinuxTransport = HalTransport<SpidevDevice, CdevPin, Delay>;

const CONSUMER: &str = "lymons-gc9a01";

/// Open `/dev/spidev<port>.<cs>` (mode 0, MSB first, 8 bit words) and claim
/// the D/C, reset and backlight lines as outputs, initially low.
pub fn open(bus: &BusConfig) -> Result<LinuxTransport, BusError> {
    let BusConfig::Spi { dc_pin, rst_pin, backlight_pin, .. } = bus;

    let path = bus.spidev_path();
    let speed = bus.speed_hz();
    info!("Opening SPI {} @ {} Hz", path, speed);

    let mut spi = SpidevDevice::open(&path)
        .map_err(|e| BusError::Spi { path: path.clone(), message: format!("{:?}", e) })?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(speed)
        .mode(SpiModeFlags::SPI_MODE_0)
        .lsb_first(false)
        .build();
    spi.configure(&options)
        .map_err(|e| BusError::Spi { path: path.clone(), message: e.to_string() })?;

    let chip_path = bus.gpio_chip();
    let mut chip = Chip::new(chip_path).map_err(|e| BusError::Gpio {
        chip: chip_path.to_string(),
        line: *dc_pin,
        message: e.to_string(),
    })?;

    let dc = output_pin(&mut chip, chip_path, *dc_pin)?;
    let rst = rst_pin.map(|n| output_pin(&mut chip, chip_path, n)).transpose()?;
    let backlight = backlight_pin.map(|n| output_pin(&mut chip, chip_path, n)).transpose()?;
    debug!(
        "GPIO {}: dc={} rst={:?} backlight={:?}",
        chip_path, dc_pin, rst_pin, backlight_pin
    );

    Ok(HalTransport::new(spi, dc, rst, backlight, Delay))
}

fn output_pin(chip: &mut Chip, chip_path: &str, line: u32) -> Result<CdevPin, BusError> {
    let gpio_err = |message: String| BusError::Gpio { chip: chip_path.to_string(), line, message };

    let handle = chip
        .get_line(line)
        .and_then(|l| l.request(LineRequestFlags::OUTPUT, 0, CONSUMER))
        .map_err(|e| gpio_err(e.to_string()))?;
    CdevPin::new(handle).map_err(|e| gpio_err(e.to_string()))
}
