//! Tick cycle: the per-tick sweep that drives the Loam simulation.
//!
//! Each tick runs through these phases:
//!
//! 1. **Wake** -- advance the tick counter and restore every particle's
//!    per-tick movement permissions and transfer flags.
//!
//! 2. **Rain** -- while it is raining, credit water to the topmost
//!    organic cell of each column.
//!
//! 3. **Sweep** -- visit every cell exactly once, bottom row up, and run
//!    the occupant's kind-specific update: motion primitives, organic
//!    diffusion, and lifecycle machines. The grid mutates in place
//!    during the sweep; exactly-once processing is guaranteed by the
//!    per-particle tick stamp, and at-most-one-move by the per-tick
//!    permission flags.
//!
//! 4. **Census** -- count particles per kind for the tick summary.
//!
//! The cycle is deterministic given the same initial grid, configuration,
//! and random seed.

use std::collections::BTreeMap;

use loam_types::{ParticleKind, Position};
use loam_world::{Grid, Particle};
use rand::Rng;
use tracing::{debug, trace};

use crate::config::SimConfig;
use crate::diffusion::{self, CARDINAL_OFFSETS};
use crate::growth;
use crate::lifecycle;
use crate::motion;

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A grid operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying grid error.
        #[from]
        source: loam_world::WorldError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Whether rain fell during this tick.
    pub is_raining: bool,
    /// Ambient light during this tick.
    pub light_level: u8,
    /// Successful particle moves during this tick.
    pub moves: u64,
    /// Particle count per kind at end of tick.
    pub census: BTreeMap<ParticleKind, u64>,
}

/// Kinds soil pulls water and nutrients from.
const SOIL_SOURCES: [ParticleKind; 2] = [ParticleKind::Soil, ParticleKind::Compost];

/// Kinds grass pulls water and nutrients from.
const GRASS_SOURCES: [ParticleKind; 1] = [ParticleKind::Soil];

/// Kinds bark pulls water and nutrients from.
const BARK_SOURCES: [ParticleKind; 2] = [ParticleKind::Soil, ParticleKind::Bark];

/// Executes one full simulation tick.
pub fn run_tick<R: Rng>(
    grid: &mut Grid,
    config: &SimConfig,
    rng: &mut R,
) -> Result<TickSummary, TickError> {
    grid.advance_tick();
    let tick = grid.tick();
    grid.refresh_all();

    if grid.is_raining {
        apply_rain(grid, config);
    }

    let mut moves: u64 = 0;
    let height = i32::try_from(grid.height()).unwrap_or(i32::MAX);
    let width = i32::try_from(grid.width()).unwrap_or(i32::MAX);
    for y in 0..height {
        for x in 0..width {
            let kind = {
                let Some(p) = grid.get_mut(x, y) else { continue };
                if p.last_tick == tick {
                    // Already updated: this particle moved here from a
                    // cell the sweep has not reached yet.
                    continue;
                }
                p.last_tick = tick;
                p.kind
            };
            if update_cell(grid, config, rng, kind, Position::new(x, y)) {
                moves = moves.saturating_add(1);
            }
        }
    }

    let mut census: BTreeMap<ParticleKind, u64> = BTreeMap::new();
    for cell in grid.cells() {
        let count = census.entry(cell.kind).or_insert(0);
        *count = count.saturating_add(1);
    }

    let summary = TickSummary {
        tick,
        is_raining: grid.is_raining,
        light_level: grid.light_level,
        moves,
        census,
    };
    debug!(
        tick,
        is_raining = summary.is_raining,
        light = summary.light_level,
        moves = summary.moves,
        "Tick completed"
    );
    Ok(summary)
}

/// Dispatches one cell's update by kind. Returns true when the occupant
/// moved.
fn update_cell<R: Rng>(
    grid: &mut Grid,
    config: &SimConfig,
    rng: &mut R,
    kind: ParticleKind,
    at: Position,
) -> bool {
    match kind {
        ParticleKind::Air | ParticleKind::Boundary => false,
        ParticleKind::Water | ParticleKind::Compost => {
            let (position, moved) = fall_and_erode(grid, config, rng, at);
            if kind == ParticleKind::Compost {
                let _ = diffusion::absorb_water(
                    grid,
                    &config.diffusion,
                    rng,
                    position,
                    &CARDINAL_OFFSETS,
                    &SOIL_SOURCES,
                );
            }
            moved
        }
        ParticleKind::Soil => {
            let (position, moved) = fall_and_erode(grid, config, rng, at);
            let _ = diffusion::absorb_water(
                grid,
                &config.diffusion,
                rng,
                position,
                &CARDINAL_OFFSETS,
                &SOIL_SOURCES,
            );
            let _ = diffusion::absorb_nutrients(
                grid,
                rng,
                position,
                &CARDINAL_OFFSETS,
                &SOIL_SOURCES,
            );
            if lifecycle::try_grass_growth(grid, &config.lifecycle, rng, position) {
                trace!(x = position.x, y = position.y, "Grass sprouted");
            }
            moved
        }
        ParticleKind::Grass => {
            let position = motion::apply_gravity(grid, &config.motion, at).unwrap_or(at);
            let _ = diffusion::absorb_water(
                grid,
                &config.diffusion,
                rng,
                position,
                &CARDINAL_OFFSETS,
                &GRASS_SOURCES,
            );
            let _ = diffusion::absorb_nutrients(
                grid,
                rng,
                position,
                &CARDINAL_OFFSETS,
                &GRASS_SOURCES,
            );
            let _ = lifecycle::try_transpiration(grid, &config.lifecycle, rng, position);
            let _ = lifecycle::try_grass_stack(grid, &config.lifecycle, rng, position);
            let _ = lifecycle::try_grass_death(grid, &config.lifecycle, rng, position);
            position != at
        }
        ParticleKind::DeadPlant => {
            let position = motion::apply_gravity(grid, &config.motion, at).unwrap_or(at);
            let _ = lifecycle::update_dead_plant(grid, position);
            position != at
        }
        ParticleKind::Steam => {
            lifecycle::update_steam(grid, &config.lifecycle, rng, at)
                .is_some_and(|position| position != at)
        }
        ParticleKind::Bark => {
            let _ = diffusion::absorb_water(
                grid,
                &config.diffusion,
                rng,
                at,
                &CARDINAL_OFFSETS,
                &BARK_SOURCES,
            );
            let _ = diffusion::absorb_nutrients(grid, rng, at, &CARDINAL_OFFSETS, &BARK_SOURCES);
            if let Some(child) = growth::update_bark(grid, &config.growth, at) {
                trace!(x = child.x, y = child.y, "Bark grew");
            }
            false
        }
    }
}

/// Gravity then erosion for loose material. Returns the final position
/// and whether either primitive moved the particle.
fn fall_and_erode<R: Rng>(
    grid: &mut Grid,
    config: &SimConfig,
    rng: &mut R,
    at: Position,
) -> (Position, bool) {
    let mut position = at;
    let mut moved = false;
    if let Some(to) = motion::apply_gravity(grid, &config.motion, position) {
        position = to;
        moved = true;
    }
    if let Some(to) = motion::apply_erosion(grid, &config.motion, rng, position) {
        position = to;
        moved = true;
    }
    (position, moved)
}

/// Credits rain water to the topmost organic cell of each column.
fn apply_rain(grid: &mut Grid, config: &SimConfig) {
    let height = i32::try_from(grid.height()).unwrap_or(i32::MAX);
    let width = i32::try_from(grid.width()).unwrap_or(i32::MAX);
    for x in 0..width {
        for y in (0..height).rev() {
            let kind = grid.get(x, y).kind;
            if kind == ParticleKind::Air || kind == ParticleKind::Steam {
                continue;
            }
            if kind.is_organic() {
                if let Some(store) = grid.get_mut(x, y).and_then(Particle::organic_mut) {
                    store.water_level = store
                        .water_level
                        .saturating_add(config.diffusion.rain_water)
                        .min(store.water_capacity);
                }
            }
            // First non-air occupant shadows the rest of the column.
            break;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects, clippy::panic)]
mod tests {
    use super::*;
    use loam_world::{OrganicState, Payload, SteamState};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(21)
    }

    fn quiet_config() -> SimConfig {
        // Probabilistic transitions off so motion tests are exact.
        let mut config = SimConfig::default();
        config.lifecycle.grass_growth_chance = 0.0;
        config.lifecycle.grass_death_chance = 0.0;
        config.lifecycle.grass_stack_chance = 0.0;
        config.lifecycle.transpiration_chance = 0.0;
        config
    }

    #[test]
    fn falling_column_settles_one_cell_per_tick() {
        let mut grid = Grid::new(5, 8).unwrap();
        grid.set(Particle::new(ParticleKind::Soil, 2, 6)).unwrap();
        let mut rng = rng();
        let summary = run_tick(&mut grid, &quiet_config(), &mut rng).unwrap();
        assert_eq!(summary.moves, 1);
        assert_eq!(grid.get(2, 5).kind, ParticleKind::Soil);

        run_tick(&mut grid, &quiet_config(), &mut rng).unwrap();
        assert_eq!(grid.get(2, 4).kind, ParticleKind::Soil);
    }

    #[test]
    fn every_cell_stays_singly_occupied() {
        let mut grid = Grid::new(10, 10).unwrap();
        for x in 0..10 {
            grid.set(Particle::new(ParticleKind::Soil, x, 5)).unwrap();
            grid.set(Particle::new(ParticleKind::Water, x, 7)).unwrap();
        }
        let mut rng = rng();
        for _ in 0..20 {
            run_tick(&mut grid, &quiet_config(), &mut rng).unwrap();
            let count = grid.cells().count();
            assert_eq!(count, 100);
        }
    }

    #[test]
    fn particle_counts_are_conserved_by_motion() {
        let mut grid = Grid::new(10, 10).unwrap();
        for x in 0..10 {
            grid.set(Particle::new(ParticleKind::Soil, x, 6)).unwrap();
        }
        for x in 3..7 {
            grid.set(Particle::new(ParticleKind::Water, x, 8)).unwrap();
        }
        let mut rng = rng();
        for _ in 0..30 {
            let summary = run_tick(&mut grid, &quiet_config(), &mut rng).unwrap();
            assert_eq!(summary.census.get(&ParticleKind::Soil).copied(), Some(10));
            assert_eq!(summary.census.get(&ParticleKind::Water).copied(), Some(4));
        }
    }

    #[test]
    fn a_riser_is_not_double_processed() {
        // Steam moving up lands in cells the sweep has not visited yet;
        // the tick stamp must keep it from updating twice in one tick.
        let mut grid = Grid::new(5, 12).unwrap();
        grid.set(Particle::with_payload(
            ParticleKind::Steam,
            2,
            1,
            Payload::Steam(SteamState {
                condensation_countdown: 1000,
            }),
        ))
        .unwrap();
        let mut rng = rng();
        run_tick(&mut grid, &quiet_config(), &mut rng).unwrap();
        let steam_y: Vec<i32> = grid
            .cells()
            .filter(|p| p.kind == ParticleKind::Steam)
            .map(|p| p.position.y)
            .collect();
        assert_eq!(steam_y, vec![2], "steam must rise exactly one cell per tick");
    }

    #[test]
    fn steam_condenses_into_water_during_a_tick() {
        let mut grid = Grid::new(5, 5).unwrap();
        grid.set(Particle::with_payload(
            ParticleKind::Steam,
            2,
            2,
            Payload::Steam(SteamState {
                condensation_countdown: 1,
            }),
        ))
        .unwrap();
        let mut rng = rng();
        let summary = run_tick(&mut grid, &quiet_config(), &mut rng).unwrap();
        assert_eq!(grid.get(2, 2).kind, ParticleKind::Water);
        assert_eq!(summary.census.get(&ParticleKind::Steam), None);
    }

    #[test]
    fn condensed_water_waits_a_tick_before_falling() {
        // The replacement water is stamped with the current tick, so it
        // must not also fall within the same tick.
        let mut grid = Grid::new(5, 5).unwrap();
        grid.set(Particle::with_payload(
            ParticleKind::Steam,
            2,
            3,
            Payload::Steam(SteamState {
                condensation_countdown: 1,
            }),
        ))
        .unwrap();
        let mut rng = rng();
        run_tick(&mut grid, &quiet_config(), &mut rng).unwrap();
        assert_eq!(grid.get(2, 3).kind, ParticleKind::Water);
        run_tick(&mut grid, &quiet_config(), &mut rng).unwrap();
        assert_eq!(grid.get(2, 2).kind, ParticleKind::Water);
    }

    #[test]
    fn a_fresh_dead_plant_outlives_its_first_tick() {
        let mut grid = Grid::new(5, 5).unwrap();
        grid.set(Particle::new(ParticleKind::DeadPlant, 2, 0)).unwrap();
        let mut rng = rng();
        run_tick(&mut grid, &quiet_config(), &mut rng).unwrap();
        assert_eq!(grid.get(2, 0).kind, ParticleKind::DeadPlant);
        match &grid.get(2, 0).payload {
            Payload::Decay(decay) => {
                assert_eq!(decay.remaining_lifetime, loam_world::particle::DECAY_LIFETIME - 1);
            }
            other => panic!("payload was {other:?}"),
        }
    }

    #[test]
    fn rain_waters_the_surface_only() {
        let mut grid = Grid::new(3, 6).unwrap();
        for y in 0..3 {
            grid.set(Particle::with_payload(
                ParticleKind::Soil,
                1,
                y,
                Payload::Organic(OrganicState::empty()),
            ))
            .unwrap();
        }
        grid.is_raining = true;
        let mut rng = rng();
        let config = quiet_config();
        run_tick(&mut grid, &config, &mut rng).unwrap();
        let surface = grid.get(1, 2).organic().unwrap().water_level;
        let buried = grid.get(1, 1).organic().unwrap().water_level;
        let deep = grid.get(1, 0).organic().unwrap().water_level;
        // Rain only credits the surface; anything below it comes from
        // diffusion out of that credit.
        assert_eq!(surface + buried + deep, config.diffusion.rain_water);
        assert!(surface >= buried);
    }

    #[test]
    fn dry_run_summary_reports_globals() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.light_level = 73;
        let mut rng = rng();
        let summary = run_tick(&mut grid, &quiet_config(), &mut rng).unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.light_level, 73);
        assert!(!summary.is_raining);
        assert_eq!(summary.moves, 0);
        assert_eq!(summary.census.get(&ParticleKind::Air).copied(), Some(16));
    }
}
