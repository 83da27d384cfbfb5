//! Default starting world: a soil bed, a damp subsoil, and one seed.
//!
//! The layout is deliberately simple so early ticks exercise every
//! subsystem: dry topsoil pulls water up from the wet rows beneath it,
//! the seed starts branching as nutrients reach it, and rain refills the
//! surface from above.

use loam_types::{ParticleKind, PlantDna, Position};
use tracing::debug;

use crate::error::WorldError;
use crate::grid::Grid;
use crate::particle::{OrganicState, Particle, Payload};

/// Water level pre-loaded into the damp subsoil rows.
pub const SUBSOIL_WATER: u32 = 40;

/// Nutrient level pre-loaded into every starting soil cell.
pub const SOIL_NUTRIENTS: u32 = 30;

/// Builds the default starting grid.
///
/// The bottom third of the grid is soil. The lower half of the soil bed
/// is pre-wetted with [`SUBSOIL_WATER`], and a single bark seed carrying
/// `dna` is planted on the surface at the center column.
pub fn create_starting_world(width: u32, height: u32, dna: PlantDna) -> Result<Grid, WorldError> {
    let mut grid = Grid::new(width, height)?;

    let soil_top = i32::try_from(height / 3).unwrap_or(i32::MAX);
    let damp_top = soil_top / 2;

    for y in 0..soil_top {
        for x in 0..i32::try_from(width).unwrap_or(i32::MAX) {
            let water = if y < damp_top { SUBSOIL_WATER } else { 0 };
            let soil = Particle::with_payload(
                ParticleKind::Soil,
                x,
                y,
                Payload::Organic(OrganicState::new(water, SOIL_NUTRIENTS)),
            );
            grid.set(soil)?;
        }
    }

    let seed_pos = seed_position(width, soil_top);
    plant_seed(&mut grid, seed_pos, dna)?;
    debug!(width, height, seed_x = seed_pos.x, seed_y = seed_pos.y, "Starting world created");

    Ok(grid)
}

/// Plants a bark seed at `position` with the given DNA.
pub fn plant_seed(grid: &mut Grid, position: Position, dna: PlantDna) -> Result<(), WorldError> {
    let seed = Particle::with_payload(
        ParticleKind::Bark,
        position.x,
        position.y,
        Payload::Bark(Box::new(crate::particle::BarkState::seed(dna))),
    );
    grid.set(seed)
}

/// The cell just above the soil surface at center column.
fn seed_position(width: u32, soil_top: i32) -> Position {
    let center = i32::try_from(width / 2).unwrap_or(0);
    Position::new(center, soil_top)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn bottom_third_is_soil() {
        let grid = create_starting_world(12, 12, PlantDna::default()).unwrap();
        for x in 0..12 {
            for y in 0..4 {
                assert_eq!(grid.get(x, y).kind, ParticleKind::Soil, "({x}, {y})");
            }
        }
        assert_eq!(grid.get(0, 4).kind, ParticleKind::Air);
    }

    #[test]
    fn subsoil_is_damp_and_topsoil_dry() {
        let grid = create_starting_world(12, 12, PlantDna::default()).unwrap();
        let damp = grid.get(3, 0).organic().unwrap();
        assert_eq!(damp.water_level, SUBSOIL_WATER);
        let dry = grid.get(3, 3).organic().unwrap();
        assert_eq!(dry.water_level, 0);
    }

    #[test]
    fn all_soil_carries_nutrients() {
        let grid = create_starting_world(12, 12, PlantDna::default()).unwrap();
        for x in 0..12 {
            for y in 0..4 {
                assert_eq!(grid.get(x, y).organic().unwrap().nutrient_level, SOIL_NUTRIENTS);
            }
        }
    }

    #[test]
    fn seed_sits_on_the_surface() {
        let grid = create_starting_world(12, 12, PlantDna::default()).unwrap();
        let seed = grid.get(6, 4);
        assert_eq!(seed.kind, ParticleKind::Bark);
        match &seed.payload {
            Payload::Bark(bark) => {
                assert_eq!(bark.current_length, 0);
                assert!(bark.active);
            }
            other => panic!("seed payload was {other:?}"),
        }
    }
}
