/*
 *  main.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Slideshow for a GC9A01 round display: cycle the PNGs in a folder
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

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use embedded_graphics::{
    mono_font::{ascii::FONT_10X20, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Circle, PrimitiveStyle, Rectangle},
    text::{Alignment, Text},
};
use env_logger::Env;
use image::imageops::FilterType;
use log::{debug, info, warn};
use std::{
    fs,
    path::{Path, PathBuf},
    thread::sleep,
    time::Duration,
};

use lymons_gc9a01::config::{self, Cli, Config};
use lymons_gc9a01::display::{linux, BusError, Gc9a01, MockTransport, RgbFrame, Transport};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

enum Source {
    Pattern,
    Folder(PathBuf),
}

struct Slideshow {
    source: Source,
    delay: Duration,
    repeat: bool,
}

impl Slideshow {
    fn from_config(cfg: &Config, cli: &Cli) -> Result<Self> {
        let show = cfg.slideshow.clone().unwrap_or_default();
        let source = match (cli.pattern, show.folder) {
            (true, _) => Source::Pattern,
            (false, Some(folder)) => Source::Folder(folder),
            (false, None) => bail!("no image folder given (pass a folder or --pattern)"),
        };
        Ok(Self {
            source,
            delay: Duration::from_secs_f32(show.delay_secs.unwrap_or(1.0)),
            repeat: show.repeat.unwrap_or(false),
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli).context("loading configuration")?;

    if cli.dump_config {
        print!("{}", config::dump(&cfg)?);
        return Ok(());
    }

    let level = if cli.debug {
        "debug".to_string()
    } else {
        cfg.log_level.clone().unwrap_or_else(|| "info".to_string())
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    info!("lymons-gc9a01 v{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let display_cfg = cfg.display.clone().unwrap_or_default();
    let panel = display_cfg.panel_config()?;
    let show = Slideshow::from_config(&cfg, &cli)?;

    if cli.dry_run {
        info!("Dry run, frames go to a recording transport");
        let transport = MockTransport::new();
        let lcd = Gc9a01::new(transport.clone(), panel).map_err(|e| anyhow!("{}", e))?;
        run(lcd, &show, Some(&transport))
    } else {
        let bus = display_cfg.bus.as_ref().ok_or(BusError::NoBusConfiguration)?;
        let transport = linux::open(bus)?;
        let lcd = Gc9a01::new(transport, panel).map_err(|e| anyhow!("{}", e))?;
        run(lcd, &show, None)
    }
}

fn run<T: Transport>(mut lcd: Gc9a01<T>, show: &Slideshow, recorder: Option<&MockTransport>) -> Result<()> {
    let frames = load_frames(&show.source, lcd.width() as u32, lcd.height() as u32)?;
    info!("{} frame(s) ready", frames.len());

    loop {
        for frame in &frames {
            lcd.display(frame).map_err(|e| anyhow!("{}", e))?;
            if let Some(rec) = recorder {
                info!("frame sent: {} bytes in {} writes", rec.written_bytes().len(), rec.write_count());
                rec.clear();
            }
            sleep(show.delay);
        }

        if !show.repeat {
            break;
        }
    }
    Ok(())
}

/// Decode and resize everything up front so looping only streams
fn load_frames(source: &Source, w: u32, h: u32) -> Result<Vec<RgbFrame>> {
    let frames: Vec<RgbFrame> = match source {
        Source::Pattern => vec![test_card(w, h)],
        Source::Folder(dir) => list_images(dir)?
            .iter()
            .filter_map(|path| match load_png(path, w, h) {
                Ok(frame) => Some(frame),
                Err(e) => {
                    warn!("skipping image: {:#}", e);
                    None
                }
            })
            .collect(),
    };
    if frames.is_empty() {
        bail!("nothing to show");
    }
    Ok(frames)
}

/// PNGs in `dir`, by name, hidden files skipped
fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            let name = p.file_name().and_then(|n| n.to_str()).unwrap_or(".");
            !name.starts_with('.')
                && p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
        })
        .collect();
    files.sort();
    debug!("{} images in {}", files.len(), dir.display());
    Ok(files)
}

fn load_png(path: &Path, w: u32, h: u32) -> Result<RgbFrame> {
    info!("Loading {}", path.display());
    let img = image::open(path).with_context(|| format!("decoding {}", path.display()))?;
    let rgb = img.resize_exact(w, h, FilterType::Triangle).to_rgb8();
    RgbFrame::from_rgb_bytes(w, h, rgb.into_raw())
        .ok_or_else(|| anyhow!("{} decoded to an unexpected size", path.display()))
}

/// Color bars behind a ring, with an arrow marking "up"
fn test_card(w: u32, h: u32) -> RgbFrame {
    let mut frame = RgbFrame::new(w, h, Rgb888::BLACK);
    let bars = [
        Rgb888::WHITE,
        Rgb888::YELLOW,
        Rgb888::CYAN,
        Rgb888::GREEN,
        Rgb888::MAGENTA,
        Rgb888::RED,
        Rgb888::BLUE,
    ];
    let bar_w = w / bars.len() as u32;
    for (i, color) in bars.iter().enumerate() {
        let _ = Rectangle::new(Point::new((i as u32 * bar_w) as i32, 0), Size::new(bar_w, h))
            .into_styled(PrimitiveStyle::with_fill(*color))
            .draw(&mut frame);
    }

    let diameter = w.min(h).saturating_sub(8);
    let _ = Circle::with_center(Point::new(w as i32 / 2, h as i32 / 2), diameter)
        .into_styled(PrimitiveStyle::with_stroke(Rgb888::BLACK, 6))
        .draw(&mut frame);

    let style = MonoTextStyle::new(&FONT_10X20, Rgb888::BLACK);
    let _ = Text::with_alignment("^ UP ^", Point::new(w as i32 / 2, 40), style, Alignment::Center)
        .draw(&mut frame);
    let _ = Text::with_alignment("GC9A01", Point::new(w as i32 / 2, h as i32 / 2), style, Alignment::Center)
        .draw(&mut frame);
    frame
}
