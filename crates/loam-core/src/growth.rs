//! Bark branch growth.
//!
//! A bark cell holds a queue of up to three candidate growth offsets:
//! the offset derived from its DNA's growth angle plus the two neighbor
//! rotations (45 degrees either way). One candidate is consumed per tick
//! while the cell holds enough stored nutrients to pay the activation
//! cost and has not reached its lineage's target length. Stored
//! nutrients are the cell's growth energy; they arrive through ordinary
//! organic diffusion from the soil and bark around it.
//!
//! A candidate blocked by loose material (soil, water, steam, compost)
//! is requeued in the hope it falls away; one already occupied by plant
//! tissue is dropped. A cell whose queue empties is permanently inactive.

use std::collections::VecDeque;

use loam_types::{ParticleKind, Position};
use loam_world::{BarkState, Grid, Particle, Payload};

use crate::config::GrowthConfig;

/// Growth offsets by 45-degree sector, clockwise from straight up.
const SECTOR_OFFSETS: [(i32, i32); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Advances the bark cell at `at` by at most one growth step.
///
/// Returns the position of the newly grown child, if any.
pub fn update_bark(grid: &mut Grid, config: &GrowthConfig, at: Position) -> Option<Position> {
    let mut bark = match &grid.at(at).payload {
        Payload::Bark(bark) => bark.as_ref().clone(),
        _ => return None,
    };
    if !bark.active {
        return None;
    }
    if bark.current_length >= bark.dna.max_length {
        bark.active = false;
        store_bark(grid, at, bark);
        return None;
    }

    let mut candidates = bark
        .candidates
        .take()
        .unwrap_or_else(|| initial_candidates(bark.dna.growth_angle_deg));

    if bark.organic.nutrient_level < config.activation_level {
        // Not enough energy this tick; keep the queue for later.
        bark.candidates = Some(candidates);
        store_bark(grid, at, bark);
        return None;
    }

    let mut grown = None;
    if let Some(offset) = candidates.pop_front() {
        let target = at.offset(offset.x, offset.y);
        let occupant = grid.at(target).kind;

        if occupant == ParticleKind::Air || occupant == ParticleKind::Grass {
            let mut child = bark.child();
            bark.organic.nutrient_level = bark
                .organic
                .nutrient_level
                .saturating_sub(config.activation_level);
            if config.closed_economy {
                let water_share = bark.organic.water_level.checked_div(2).unwrap_or(0);
                let nutrient_share = bark.organic.nutrient_level.checked_div(2).unwrap_or(0);
                bark.organic.water_level = bark.organic.water_level.saturating_sub(water_share);
                bark.organic.nutrient_level =
                    bark.organic.nutrient_level.saturating_sub(nutrient_share);
                child.organic.water_level = water_share;
                child.organic.nutrient_level = nutrient_share;
            }
            let sprout = Particle::with_payload(
                ParticleKind::Bark,
                target.x,
                target.y,
                Payload::Bark(Box::new(child)),
            );
            if grid.set(sprout).is_ok() {
                grown = Some(target);
            }
        } else if !occupant.is_plant_tissue() && occupant != ParticleKind::Boundary {
            // Loose material may move away; try this direction again.
            candidates.push_back(offset);
        }
        // Plant tissue and the boundary consume the candidate for good.
    }

    if candidates.is_empty() {
        bark.active = false;
    }
    bark.candidates = Some(candidates);
    store_bark(grid, at, bark);
    grown
}

/// The angle-derived primary offset and its two neighbor rotations.
fn initial_candidates(growth_angle_deg: i16) -> VecDeque<Position> {
    [0_i32, -45, 45]
        .into_iter()
        .map(|rotation| {
            let (dx, dy) = sector_offset(i32::from(growth_angle_deg).saturating_add(rotation));
            Position::new(dx, dy)
        })
        .collect()
}

/// Maps an angle in degrees (0 = straight up, clockwise positive) onto
/// one of the eight neighbor offsets.
fn sector_offset(angle_deg: i32) -> (i32, i32) {
    let normalized = angle_deg.rem_euclid(360);
    let sector = normalized
        .saturating_add(22)
        .checked_div(45)
        .unwrap_or(0)
        .checked_rem(8)
        .unwrap_or(0);
    usize::try_from(sector)
        .ok()
        .and_then(|s| SECTOR_OFFSETS.get(s).copied())
        .unwrap_or((0, 1))
}

fn store_bark(grid: &mut Grid, at: Position, bark: BarkState) {
    if let Some(p) = grid.get_mut(at.x, at.y) {
        p.payload = Payload::Bark(Box::new(bark));
    }
}
