//! Headless overlay renderer: loads one forecast timestep, runs the
//! particle simulation for a number of frames and writes the composited
//! overlay to a PNG.
//!
//! Usage: cargo run --release --bin render_frame -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>      JSON config file (default: built-in defaults)
//!   --assets <DIR>       Timestep directory (default: config asset_dir)
//!   --timestep <STEM>    Asset stem to start from (default: first playback step)
//!   --synthetic          Use a generated test field instead of assets
//!   --play               Advance through the timesteps while simulating
//!   --width <PX>         Surface width (default: 1024)
//!   --height <PX>        Surface height (default: 512)
//!   --bounds <N,S,E,W>   Visible bounds in degrees (default: whole world)
//!   --ticks <N>          Particle frames to simulate (default: 120)
//!   --seed <SEED>        Particle RNG seed
//!   --out <PATH>         Output PNG (default: wind_frame.png)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::RgbaImage;

use windmap::config::WindMapConfig;
use windmap::core::{Error, Result};
use windmap::field::{WindBounds, WindRaster};
use windmap::overlay::{StaticHostMap, WindOverlay, WindTimeline};
use windmap::projection::ViewportBounds;
use windmap::streaming::TimestepId;

fn main() {
    windmap::core::logging::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => WindMapConfig::from_json_file(path)?,
        None => WindMapConfig::default(),
    };
    if let Some(dir) = parse_str_arg(&args, "--assets") {
        config.asset_dir = PathBuf::from(dir);
    }
    if let Some(seed) = parse_u64_arg(&args, "--seed") {
        config.particles.seed = Some(seed);
    }
    let width = parse_u32_arg(&args, "--width").unwrap_or(1024);
    let height = parse_u32_arg(&args, "--height").unwrap_or(512);
    let ticks = parse_usize_arg(&args, "--ticks").unwrap_or(120);
    let out = parse_str_arg(&args, "--out").unwrap_or_else(|| "wind_frame.png".to_string());
    let bounds = match parse_str_arg(&args, "--bounds") {
        Some(s) => parse_bounds(&s)?,
        None => ViewportBounds::world(),
    };

    println!("=== Windmap Frame Renderer ===");
    println!("Surface: {}x{}", width, height);
    println!(
        "Bounds:  N {:.3} S {:.3} E {:.3} W {:.3}",
        bounds.north, bounds.south, bounds.east, bounds.west
    );
    println!();

    let host = StaticHostMap::new(bounds, width, height);
    let mut overlay = WindOverlay::from_config(&config, width, height)?;
    overlay.on_viewport_changed(&host)?;

    let mut timeline = if has_flag(&args, "--synthetic") {
        overlay.set_wind(Arc::new(synthetic_field(360, 180)?));
        None
    } else {
        let mut start_index = 0;
        if let Some(stem) = parse_str_arg(&args, "--timestep") {
            match config.playback.timesteps.iter().position(|t| t.stem == stem) {
                Some(i) => start_index = i,
                None => config.playback.timesteps = vec![TimestepId::new(0, stem)],
            }
        }
        let mut timeline = WindTimeline::from_config(&config)?;
        timeline.seek(start_index);
        println!("Loading {} from {}", timeline.playback().current(), config.asset_dir.display());
        if timeline.wait_loaded(Duration::from_secs(30), &mut overlay)?.is_none() {
            return Err(Error::asset(&timeline.playback().current().stem, "timed out"));
        }
        Some(timeline)
    };

    let start = Instant::now();
    overlay.start_particles();
    if has_flag(&args, "--play") {
        if let Some(timeline) = &mut timeline {
            timeline.play(start);
        }
    }
    let frame_step = Duration::from_secs_f64(1.0 / 60.0);
    let mut ticked = 0;
    for i in 0..ticks {
        let now = start + frame_step * i as u32;
        let stats = match &mut timeline {
            Some(timeline) => {
                let frame = timeline.frame(now, &mut overlay);
                if let Some(id) = frame.loaded {
                    println!("Timestep {} bound at frame {}", id, i);
                }
                frame.particles
            }
            None => overlay.frame(now),
        };
        if stats.is_some() {
            ticked += 1;
        }
    }
    let stats = overlay.draw();
    println!("Field:     {} of {} points drawn", stats.points_drawn, stats.points_total);
    println!("Particles: {} ticks in {:.2?}", ticked, start.elapsed());

    let center = bounds.center;
    if let Some(readout) = overlay.readout(center.lat, center.lon) {
        println!("Center:    {}", readout);
    }
    if let Some(max) = overlay.max_wind_speed() {
        println!("Legend (max {:.1} m/s):", max);
        for entry in overlay.legend() {
            println!("  {:>4.0}%  {}  {}", entry.stop * 100.0, entry.color.to_hex(), entry.label());
        }
    }

    overlay.composite().save_png(&out)?;
    println!();
    println!("Output: {}", out);
    Ok(())
}

/// Zonal jets plus a cyclone, encoded over +-20 m/s.
fn synthetic_field(width: u32, height: u32) -> Result<WindRaster> {
    let bounds = WindBounds::new(-20.0, 20.0, -20.0, 20.0);
    let encode = |v: f32| (((v + 20.0) / 40.0).clamp(0.0, 1.0) * 255.0).round() as u8;
    let image = RgbaImage::from_fn(width, height, |x, y| {
        let lon = -180.0 + 360.0 * (x as f32 + 0.5) / width as f32;
        let lat = 90.0 - 180.0 * (y as f32 + 0.5) / height as f32;
        let mut u = 15.0 * (lat.to_radians() * 3.0).sin();
        let mut v = 0.0;
        let (dx, dy) = (lon - 150.0, lat - 20.0);
        let r2 = dx * dx + dy * dy;
        let swirl = 18.0 * (-r2 / 200.0).exp();
        if r2 > 0.0 {
            let r = r2.sqrt();
            u += -dy / r * swirl;
            v += dx / r * swirl;
        }
        image::Rgba([encode(u), encode(v), 0, 255])
    });
    WindRaster::new(image, bounds)
}

fn parse_bounds(s: &str) -> Result<ViewportBounds> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| Error::config(format!("invalid --bounds '{}': {}", s, e)))?;
    match parts.as_slice() {
        &[n, s, e, w] => Ok(ViewportBounds::new(n, s, e, w)),
        _ => Err(Error::config(format!("--bounds needs N,S,E,W, got '{}'", s))),
    }
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u64_arg(args: &[String], flag: &str) -> Option<u64> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
