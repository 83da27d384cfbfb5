//! Headless entry point for the Loam simulation.
//!
//! Builds the starting world from `loam-config.yaml`, then drives the
//! tick loop: each tick the weather cycle updates the grid's rain and
//! light globals before `run_tick` sweeps the grid. The world is printed
//! to the terminal at a fixed interval so a run is observable without
//! any renderer attached.
//!
//! # Environment
//!
//! - `LOAM_CONFIG` -- path to the YAML configuration
//!   (default `loam-config.yaml`; missing file means all defaults).
//! - `LOAM_TICKS` -- number of ticks to run (default 10000).
//! - `RUST_LOG` -- tracing filter (default `info`).

mod render;

use std::path::Path;

use anyhow::Context;
use loam_core::{SimConfig, run_tick};
use loam_types::PlantDna;
use loam_world::{WeatherCycle, create_starting_world};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Ticks between terminal frames.
const FRAME_INTERVAL: u64 = 500;

/// Application entry point.
///
/// Initializes logging, loads configuration, builds the starting world,
/// and runs the tick loop for the requested number of ticks.
fn main() -> anyhow::Result<()> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("loam-runner starting");

    let config_path =
        std::env::var("LOAM_CONFIG").unwrap_or_else(|_| String::from("loam-config.yaml"));
    let config = if Path::new(&config_path).exists() {
        SimConfig::from_file(Path::new(&config_path))
            .with_context(|| format!("loading {config_path}"))?
    } else {
        SimConfig::default()
    };
    let ticks: u64 = std::env::var("LOAM_TICKS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10_000);
    info!(
        width = config.world.width,
        height = config.world.height,
        seed = config.world.seed,
        ticks,
        "configuration loaded"
    );

    let mut grid = create_starting_world(config.world.width, config.world.height, PlantDna::default())
        .context("building starting world")?;
    let mut weather = WeatherCycle::new(config.world.seed);
    let mut rng = SmallRng::seed_from_u64(config.world.seed);

    for _ in 0..ticks {
        let tick = grid.tick().saturating_add(1);
        grid.is_raining = weather.generate(tick);
        grid.light_level = WeatherCycle::light_level(tick);

        let summary = run_tick(&mut grid, &config, &mut rng)?;

        if summary.tick.checked_rem(FRAME_INTERVAL) == Some(0) {
            info!(
                tick = summary.tick,
                is_raining = summary.is_raining,
                light = summary.light_level,
                moves = summary.moves,
                "frame"
            );
            println!("{}", render::render(&grid.snapshot()));
        }
    }

    info!(tick = grid.tick(), "run complete");
    println!("{}", render::render(&grid.snapshot()));
    Ok(())
}
