//! Shared motion primitives: gravity, erosion, rise, and tunneling.
//!
//! All movement goes through [`Grid::displace`], so every primitive here
//! is a swap of two cells. An infeasible move is a silent no-op, never an
//! error: blocked material is a valid steady state.
//!
//! # Tunneling
//!
//! Kinds with a non-empty tunnelable set (soil and grass, through bark)
//! get a tunnel attempt before any plain swap. The attempt scans ahead
//! through the chain of tunnelable occupants up to a bounded lookahead;
//! past the bound the move is optimistically allowed so a particle never
//! stalls forever against a tall structure. A particle already mid-tunnel
//! that can reach neither open space nor another tunnelable cell falls
//! back to a bounded breadth-first relocation scan, which is what keeps
//! it from being permanently wedged inside non-tunnelable material.

use std::collections::VecDeque;

use loam_types::{ParticleKind, Position};
use loam_world::Grid;
use rand::Rng;

use crate::config::MotionConfig;

/// Outcome of a tunnel attempt toward one target cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TunnelOutcome {
    /// The particle moved; its new position.
    Moved(Position),
    /// Tunneling rules did not apply; the caller may try a plain swap.
    NotApplicable,
    /// Tunneling applied but denied the move; no fallback swap.
    Blocked,
}

/// Attempts a one-cell fall for the particle at `from`.
///
/// Tunneling is tried first; a plain swap only fires when the particle
/// is not mid-tunnel, the cell below is strictly lighter, and both sides
/// still hold vertical permission. Returns the new position on a move.
pub fn apply_gravity(grid: &mut Grid, config: &MotionConfig, from: Position) -> Option<Position> {
    let mover = grid.at(from);
    if !mover.moveable_y {
        return None;
    }
    let target = from.below();

    match try_tunnel(grid, config, from, target) {
        TunnelOutcome::Moved(to) => return Some(to),
        TunnelOutcome::Blocked => return None,
        TunnelOutcome::NotApplicable => {}
    }

    let mover = grid.at(from);
    if mover.passing_through || mover.was_passing_through {
        return None;
    }
    let below = grid.at(target);
    if below.moveable_y && mover.weight > below.weight && grid.displace(from, target).is_ok() {
        return Some(target);
    }
    None
}

/// Attempts a lateral erosion step for the particle at `from`.
///
/// Only fires when the particle sits on a local peak: all three cells
/// below (down-left, down, down-right) strictly lighter. Eligible lateral
/// offsets keep the neighbor's own upper diagonal lighter too, so eroding
/// never builds a new peak one step over. The final offset is drawn
/// uniformly from {stay} plus the eligible laterals.
pub fn apply_erosion<R: Rng>(
    grid: &mut Grid,
    config: &MotionConfig,
    rng: &mut R,
    from: Position,
) -> Option<Position> {
    let mover = grid.at(from);
    if !mover.moveable_x || !mover.moveable_y {
        return None;
    }
    if mover.passing_through || mover.was_passing_through {
        return None;
    }
    let weight = mover.weight;

    let on_peak = [-1, 0, 1]
        .into_iter()
        .all(|dx| grid.at(from.offset(dx, -1)).weight < weight);
    if !on_peak {
        return None;
    }

    let mut candidates: Vec<i32> = vec![0];
    for dx in [-1, 1] {
        let lateral = grid.at(from.offset(dx, 0));
        let upper_diagonal = grid.at(from.offset(dx, 1));
        if lateral.moveable_x && lateral.weight < weight && upper_diagonal.weight < weight {
            candidates.push(dx);
        }
    }
    if candidates.len() < 2 {
        return None;
    }

    let pick = rng.random_range(0..candidates.len());
    let dx = candidates.get(pick).copied().unwrap_or(0);
    if dx == 0 {
        return None;
    }
    let target = from.offset(dx, 0);

    match try_tunnel(grid, config, from, target) {
        TunnelOutcome::Moved(to) => return Some(to),
        TunnelOutcome::Blocked => return None,
        TunnelOutcome::NotApplicable => {}
    }

    if grid.displace(from, target).is_ok() {
        return Some(target);
    }
    None
}

/// Attempts a one-cell rise for the particle at `from`.
///
/// The gas analog of gravity with the comparison inverted: a riser moves
/// into open air above when it is no heavier than the occupant there.
pub fn apply_rise(grid: &mut Grid, from: Position) -> Option<Position> {
    let mover = grid.at(from);
    if !mover.moveable_y {
        return None;
    }
    let target = from.above();
    let above = grid.at(target);
    if above.kind == ParticleKind::Air
        && above.moveable_y
        && mover.weight <= above.weight
        && grid.displace(from, target).is_ok()
    {
        return Some(target);
    }
    None
}

/// Tunnel decision for the particle at `from` moving toward `target`.
fn try_tunnel(
    grid: &mut Grid,
    config: &MotionConfig,
    from: Position,
    target: Position,
) -> TunnelOutcome {
    let mover = grid.at(from);
    if !mover.kind.has_tunneling() || !mover.moveable {
        return TunnelOutcome::NotApplicable;
    }
    if (target.x != from.x && !mover.moveable_x) || (target.y != from.y && !mover.moveable_y) {
        return TunnelOutcome::Blocked;
    }
    let mover_kind = mover.kind;
    let occupant = grid.at(target).kind;

    if mover_kind.can_tunnel_through(occupant) {
        let step = direction(from, target);
        if lookahead_clear(grid, mover_kind, target, step, config.gravity_lookahead) {
            if grid.displace(from, target).is_ok() {
                return TunnelOutcome::Moved(target);
            }
            return TunnelOutcome::Blocked;
        }
        return TunnelOutcome::Blocked;
    }

    if !grid.at(from).passing_through {
        return TunnelOutcome::NotApplicable;
    }

    if occupant == ParticleKind::Air {
        if grid.displace(from, target).is_ok() {
            return TunnelOutcome::Moved(target);
        }
        return TunnelOutcome::Blocked;
    }

    if let Some(refuge) = relocation_scan(grid, config, from) {
        if grid.displace(from, refuge).is_ok() {
            return TunnelOutcome::Moved(refuge);
        }
    }
    TunnelOutcome::Blocked
}

/// Scans in `step` direction from `start` through the chain of occupants
/// `mover` can tunnel through.
///
/// Returns true when the first non-tunnelable occupant past the chain is
/// air, or when the chain outruns `bound` (optimistic allowance).
fn lookahead_clear(
    grid: &Grid,
    mover: ParticleKind,
    start: Position,
    step: (i32, i32),
    bound: u32,
) -> bool {
    let mut cursor = start;
    let mut steps: u32 = 0;
    loop {
        if steps >= bound {
            return true;
        }
        let occupant = grid.at(cursor).kind;
        if !mover.can_tunnel_through(occupant) {
            return occupant == ParticleKind::Air;
        }
        cursor = cursor.offset(step.0, step.1);
        steps = steps.saturating_add(1);
    }
}

/// Bounded breadth-first search for a relocation target around `from`.
///
/// Expands over 4-connected neighbors, skipping the boundary, until it
/// finds a cell that is either air or tunnelable with a clear lookahead.
/// Gives up after visiting `relocation_lookahead` cells.
fn relocation_scan(grid: &Grid, config: &MotionConfig, from: Position) -> Option<Position> {
    let mover = grid.at(from).kind;
    let mut frontier: VecDeque<Position> = VecDeque::new();
    let mut seen: Vec<Position> = vec![from];
    frontier.push_back(from);
    let mut visited: u32 = 0;

    while let Some(cursor) = frontier.pop_front() {
        if visited >= config.relocation_lookahead {
            return None;
        }
        visited = visited.saturating_add(1);

        for (dx, dy) in [(0, -1), (-1, 0), (1, 0), (0, 1)] {
            let next = cursor.offset(dx, dy);
            if seen.contains(&next) {
                continue;
            }
            seen.push(next);
            let occupant = grid.at(next).kind;
            if occupant == ParticleKind::Boundary {
                continue;
            }
            if occupant == ParticleKind::Air {
                return Some(next);
            }
            if mover.can_tunnel_through(occupant) {
                if lookahead_clear(grid, mover, next, (dx, dy), config.relocation_lookahead) {
                    return Some(next);
                }
                frontier.push_back(next);
            }
        }
    }
    None
}

/// Componentwise sign of the step from `from` toward `to`.
const fn direction(from: Position, to: Position) -> (i32, i32) {
    (
        to.x.saturating_sub(from.x).signum(),
        to.y.saturating_sub(from.y).signum(),
    )
}
