//! Material lifecycle state machines: phase change, decay, and the
//! probabilistic soil/grass transitions.
//!
//! Every routine here is evaluated at most once per particle per tick by
//! the dispatcher; the tick guard lives there, not here. Probabilistic
//! transitions are independent Bernoulli trials with per-tick chances
//! from [`LifecycleConfig`], scaled by ambient light where the living
//! material depends on it.

use loam_types::{ParticleKind, Position};
use loam_world::{DecayState, Grid, OrganicState, Particle, Payload, SteamState};
use rand::Rng;

use crate::config::LifecycleConfig;
use crate::motion::apply_rise;

/// Kinds a buried grass cell tolerates directly above itself.
const GRASS_COVER: [ParticleKind; 4] = [
    ParticleKind::Air,
    ParticleKind::Grass,
    ParticleKind::Bark,
    ParticleKind::Water,
];

/// Advances a steam particle: countdown, rise, and lateral drift.
///
/// The countdown decrements once per tick; at zero the cell condenses
/// into water in place. While airborne the particle rises one cell when
/// it can, and drifts sideways with a propensity that decays linearly
/// with the remaining countdown fraction.
pub fn update_steam<R: Rng>(
    grid: &mut Grid,
    config: &LifecycleConfig,
    rng: &mut R,
    at: Position,
) -> Option<Position> {
    let remaining = match &grid.at(at).payload {
        Payload::Steam(steam) => steam.condensation_countdown.saturating_sub(1),
        _ => return None,
    };

    if remaining == 0 {
        // Condensed: the steam cell becomes water at the same coordinate.
        let _ = grid.set(Particle::new(ParticleKind::Water, at.x, at.y));
        return None;
    }
    if let Some(p) = grid.get_mut(at.x, at.y) {
        p.payload = Payload::Steam(SteamState {
            condensation_countdown: remaining,
        });
    }

    let mut position = at;
    if let Some(risen) = apply_rise(grid, position) {
        position = risen;
    }

    let drift_propensity = fraction(remaining, config.condensation_countdown);
    if rng.random_bool(drift_propensity) {
        let dx = if rng.random_bool(0.5) { 1 } else { -1 };
        let target = position.offset(dx, 0);
        if grid.at(target).kind == ParticleKind::Air
            && grid.at(position).moveable_x
            && grid.displace(position, target).is_ok()
        {
            position = target;
        }
    }
    Some(position)
}

/// Advances a dead plant cell's decay countdown.
///
/// At zero the tissue becomes compost, carrying its remaining water and
/// nutrient stores forward. Returns true on the transition.
pub fn update_dead_plant(grid: &mut Grid, at: Position) -> bool {
    let decayed = match &grid.at(at).payload {
        Payload::Decay(decay) => DecayState {
            remaining_lifetime: decay.remaining_lifetime.saturating_sub(1),
            organic: decay.organic,
        },
        _ => return false,
    };

    if decayed.remaining_lifetime == 0 {
        let compost = Particle::with_payload(
            ParticleKind::Compost,
            at.x,
            at.y,
            Payload::Organic(decayed.organic),
        );
        let _ = grid.set(compost);
        return true;
    }
    if let Some(p) = grid.get_mut(at.x, at.y) {
        p.payload = Payload::Decay(decayed);
    }
    false
}

/// Rolls for a soil cell sprouting grass.
///
/// Only soil that has not moved this tick, holds some water, and has
/// open air directly above may sprout. The chance scales with ambient
/// light. On success a fresh grass cell replaces the air above; the
/// soil stays where it is.
pub fn try_grass_growth<R: Rng>(
    grid: &mut Grid,
    config: &LifecycleConfig,
    rng: &mut R,
    at: Position,
) -> bool {
    let soil = grid.at(at);
    if soil.kind != ParticleKind::Soil || !soil.fully_moveable() {
        return false;
    }
    if soil.organic().is_none_or(|o| o.water_level == 0) {
        return false;
    }
    if grid.at(at.above()).kind != ParticleKind::Air {
        return false;
    }

    let chance = scaled_chance(config.grass_growth_chance, light_factor(grid));
    if !rng.random_bool(chance) {
        return false;
    }
    let above = at.above();
    let sprout = Particle::with_payload(
        ParticleKind::Grass,
        above.x,
        above.y,
        Payload::Organic(OrganicState::empty()),
    );
    grid.set(sprout).is_ok()
}

/// Rolls for a grass cell stacking a second cell on top of itself.
///
/// Capped to one stacked cell: only grass rooted directly on soil may
/// stack, and only into open air.
pub fn try_grass_stack<R: Rng>(
    grid: &mut Grid,
    config: &LifecycleConfig,
    rng: &mut R,
    at: Position,
) -> bool {
    let grass = grid.at(at);
    if grass.kind != ParticleKind::Grass || !grass.fully_moveable() {
        return false;
    }
    if grid.at(at.below()).kind != ParticleKind::Soil
        || grid.at(at.above()).kind != ParticleKind::Air
    {
        return false;
    }
    let chance = scaled_chance(config.grass_stack_chance, light_factor(grid));
    if !rng.random_bool(chance) {
        return false;
    }
    let above = at.above();
    let sprout = Particle::with_payload(
        ParticleKind::Grass,
        above.x,
        above.y,
        Payload::Organic(OrganicState::empty()),
    );
    grid.set(sprout).is_ok()
}

/// Rolls for a buried grass cell dying back to compost.
///
/// Fires only when the cell directly above is something grass cannot
/// live under.
pub fn try_grass_death<R: Rng>(
    grid: &mut Grid,
    config: &LifecycleConfig,
    rng: &mut R,
    at: Position,
) -> bool {
    if grid.at(at).kind != ParticleKind::Grass {
        return false;
    }
    if GRASS_COVER.contains(&grid.at(at.above()).kind) {
        return false;
    }
    if !rng.random_bool(config.grass_death_chance.clamp(0.0, 1.0)) {
        return false;
    }
    if let Some(p) = grid.get_mut(at.x, at.y) {
        p.kind = ParticleKind::Compost;
    }
    true
}

/// Rolls for a grass cell transpiring part of its water as steam.
///
/// The chance is per unit of stored water; rain suppresses it entirely.
/// On success a steam cell with a full condensation countdown replaces
/// the air above, and the water it carries is debited from the grass.
pub fn try_transpiration<R: Rng>(
    grid: &mut Grid,
    config: &LifecycleConfig,
    rng: &mut R,
    at: Position,
) -> bool {
    if grid.is_raining {
        return false;
    }
    let grass = grid.at(at);
    if grass.kind != ParticleKind::Grass {
        return false;
    }
    let Some(water_level) = grass.organic().map(|o| o.water_level) else {
        return false;
    };
    if water_level == 0 || grid.at(at.above()).kind != ParticleKind::Air {
        return false;
    }

    let chance = scaled_chance(config.transpiration_chance, f64::from(water_level));
    if !rng.random_bool(chance) {
        return false;
    }

    let vented = water_level.min(10);
    if let Some(store) = grid.get_mut(at.x, at.y).and_then(Particle::organic_mut) {
        store.water_level = store.water_level.saturating_sub(vented);
    }
    let above = at.above();
    let steam = Particle::with_payload(
        ParticleKind::Steam,
        above.x,
        above.y,
        Payload::Steam(SteamState {
            condensation_countdown: config.condensation_countdown,
        }),
    );
    grid.set(steam).is_ok()
}

/// Ambient light as a 0.0..=1.0 factor.
fn light_factor(grid: &Grid) -> f64 {
    fraction(u32::from(grid.light_level.min(100)), 100)
}

/// A bounded ratio as a probability.
#[allow(clippy::arithmetic_side_effects)] // float quotient, clamped
fn fraction(numerator: u32, denominator: u32) -> f64 {
    (f64::from(numerator) / f64::from(denominator.max(1))).clamp(0.0, 1.0)
}

/// A probability scaled by a factor and clamped into the valid range.
#[allow(clippy::arithmetic_side_effects)] // float product, clamped
fn scaled_chance(base: f64, factor: f64) -> f64 {
    (base * factor).clamp(0.0, 1.0)
}
