/*
 *  config.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  YAML configuration with command line overrides
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

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::display::panel::{PanelConfig, DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Chip select of the rear Breakout Garden slot
pub const BG_SPI_CS_BACK: u8 = 0;
/// Chip select of the front Breakout Garden slot
pub const BG_SPI_CS_FRONT: u8 = 1;

pub const DEFAULT_SPI_SPEED_HZ: u32 = 4_000_000;
pub const DEFAULT_GPIO_CHIP: &str = "/dev/gpiochip0";

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub display: Option<DisplayConfig>,
    pub slideshow: Option<SlideshowConfig>,
}

/// Panel geometry & wiring
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DisplayConfig {
    pub width: Option<u16>,
    pub height: Option<u16>,
    pub rotate_deg: Option<u16>,
    pub invert: Option<bool>,
    pub offset_left: Option<u16>,
    pub offset_top: Option<u16>,
    pub bus: Option<BusConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BusConfig {
    Spi {
        #[serde(default)]
        port: u8,           // /dev/spidev<port>.<cs>
        #[serde(default)]
        cs: u8,
        speed_hz: Option<u32>,
        dc_pin: u32,        // line offset on gpio_chip (BCM numbering on a Pi)
        rst_pin: Option<u32>,
        backlight_pin: Option<u32>,
        gpio_chip: Option<String>,
    },
}

impl BusConfig {
    pub fn spidev_path(&self) -> String {
        match self {
            BusConfig::Spi { port, cs, .. } => format!("/dev/spidev{}.{}", port, cs),
        }
    }

    pub fn speed_hz(&self) -> u32 {
        match self {
            BusConfig::Spi { speed_hz, .. } => speed_hz.unwrap_or(DEFAULT_SPI_SPEED_HZ),
        }
    }

    pub fn gpio_chip(&self) -> &str {
        match self {
            BusConfig::Spi { gpio_chip, .. } => gpio_chip.as_deref().unwrap_or(DEFAULT_GPIO_CHIP),
        }
    }
}

/// Image folder playback
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SlideshowConfig {
    pub folder: Option<PathBuf>,
    pub delay_secs: Option<f32>,
    pub repeat: Option<bool>,
}

impl DisplayConfig {
    /// Validated panel parameters, defaults filled in
    pub fn panel_config(&self) -> Result<PanelConfig, ConfigError> {
        let panel = PanelConfig::new::<()>(
            self.width.unwrap_or(DEFAULT_WIDTH),
            self.height.unwrap_or(DEFAULT_HEIGHT),
            self.rotate_deg.unwrap_or(90),
        )
        .map_err(|e| ConfigError::Validation(e.to_string()))?;
        panel
            .with_invert(self.invert.unwrap_or(true))
            .with_offsets::<()>(self.offset_left.unwrap_or(0), self.offset_top.unwrap_or(0))
            .map_err(|e| ConfigError::Validation(e.to_string()))
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "lymons-gc9a01", about = "Show images on a GC9A01 round display", version)]
pub struct Cli {
    /// Folder containing .png images
    #[arg(value_hint = ValueHint::DirPath)]
    pub folder: Option<PathBuf>,
    /// Seconds to wait between images
    pub delay: Option<f32>,
    /// Loop forever (yes|true|1)
    pub repeat: Option<String>,

    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Enable debug log level
    #[arg(short = 'v', long = "debug", alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub display_width: Option<u16>,
    #[arg(long)]
    pub display_height: Option<u16>,
    #[arg(long)]
    pub display_rotate_deg: Option<u16>,
    #[arg(long, action = ArgAction::Set)]
    pub display_invert: Option<bool>,
    #[arg(long)]
    pub spi_port: Option<u8>,
    #[arg(long)]
    pub spi_cs: Option<u8>,
    #[arg(long)]
    pub spi_speed_hz: Option<u32>,
    #[arg(long)]
    pub dc_pin: Option<u32>,
    #[arg(long)]
    pub rst_pin: Option<u32>,
    #[arg(long)]
    pub backlight_pin: Option<u32>,
    /// Draw the built-in test card instead of images
    #[arg(long, action = ArgAction::SetTrue)]
    pub pattern: bool,
    /// Drive a recording transport instead of the hardware
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: read YAML, merge CLI, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli)?;

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Pretty YAML of effective config
pub fn dump(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/lymons/gc9a01.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/lymons/gc9a01.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/gc9a01.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["gc9a01.yaml", "config/gc9a01.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some() { dst.log_level = src.log_level; }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    match (&mut dst.slideshow, src.slideshow) {
        (None, Some(c)) => dst.slideshow = Some(c),
        (Some(d), Some(s)) => {
            if s.folder.is_some()     { d.folder = s.folder; }
            if s.delay_secs.is_some() { d.delay_secs = s.delay_secs; }
            if s.repeat.is_some()     { d.repeat = s.repeat; }
        }
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.width.is_some()       { dst.width = src.width; }
    if src.height.is_some()      { dst.height = src.height; }
    if src.rotate_deg.is_some()  { dst.rotate_deg = src.rotate_deg; }
    if src.invert.is_some()      { dst.invert = src.invert; }
    if src.offset_left.is_some() { dst.offset_left = src.offset_left; }
    if src.offset_top.is_some()  { dst.offset_top = src.offset_top; }
    if src.bus.is_some()         { dst.bus = src.bus; }
}

/// "yes", "true", "True" and "1" switch looping on, anything else off
pub fn parse_flag(s: &str) -> bool {
    matches!(s, "yes" | "true" | "True" | "1")
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) -> Result<(), ConfigError> {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }

    if cli.folder.is_some() || cli.delay.is_some() || cli.repeat.is_some() {
        let show = cfg.slideshow.get_or_insert_with(SlideshowConfig::default);
        if cli.folder.is_some() { show.folder = cli.folder.clone(); }
        if cli.delay.is_some()  { show.delay_secs = cli.delay; }
        if let Some(r) = cli.repeat.as_deref() { show.repeat = Some(parse_flag(r)); }
    }

    let any_display = cli.display_width.is_some()
        || cli.display_height.is_some()
        || cli.display_rotate_deg.is_some()
        || cli.display_invert.is_some();
    let any_bus = cli.spi_port.is_some()
        || cli.spi_cs.is_some()
        || cli.spi_speed_hz.is_some()
        || cli.dc_pin.is_some()
        || cli.rst_pin.is_some()
        || cli.backlight_pin.is_some();

    if (any_display || any_bus) && cfg.display.is_none() {
        cfg.display = Some(DisplayConfig::default());
    }
    let Some(display) = cfg.display.as_mut() else { return Ok(()) };

    if cli.display_width.is_some()      { display.width = cli.display_width; }
    if cli.display_height.is_some()     { display.height = cli.display_height; }
    if cli.display_rotate_deg.is_some() { display.rotate_deg = cli.display_rotate_deg; }
    if cli.display_invert.is_some()     { display.invert = cli.display_invert; }

    if any_bus {
        if display.bus.is_none() {
            let dc = cli.dc_pin.ok_or_else(|| {
                ConfigError::Validation("--dc-pin is required when no bus is configured".into())
            })?;
            display.bus = Some(BusConfig::Spi {
                port: 0,
                cs: BG_SPI_CS_BACK,
                speed_hz: None,
                dc_pin: dc,
                rst_pin: None,
                backlight_pin: None,
                gpio_chip: None,
            });
        }
        if let Some(BusConfig::Spi { port, cs, speed_hz, dc_pin, rst_pin, backlight_pin, .. }) =
            display.bus.as_mut()
        {
            if let Some(v) = cli.spi_port      { *port = v; }
            if let Some(v) = cli.spi_cs        { *cs = v; }
            if cli.spi_speed_hz.is_some()      { *speed_hz = cli.spi_speed_hz; }
            if let Some(v) = cli.dc_pin        { *dc_pin = v; }
            if cli.rst_pin.is_some()           { *rst_pin = cli.rst_pin; }
            if cli.backlight_pin.is_some()     { *backlight_pin = cli.backlight_pin; }
        }
    }
    Ok(())
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(display) = cfg.display.as_ref() {
        display.panel_config()?;
        if let Some(BusConfig::Spi { speed_hz: Some(0), .. }) = display.bus {
            return Err(ConfigError::Validation("bus speed_hz must be > 0".into()));
        }
    }
    if let Some(delay) = cfg.slideshow.as_ref().and_then(|s| s.delay_secs) {
        if !(delay >= 0.0 && delay.is_finite()) {
            return Err(ConfigError::Validation("slideshow delay must be a non-negative number".into()));
        }
    }
    Ok(())
}
