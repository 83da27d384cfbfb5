//! The world grid: a dense arena of particles with swap-based movement.
//!
//! Every cell always holds exactly one [`Particle`]; empty space is air.
//! Reads outside the grid return a shared immovable boundary sentinel so
//! neighbor arithmetic at the edges needs no bounds branching, while
//! writes outside the grid fail fast with [`WorldError::OutOfBounds`].
//!
//! Movement is always a swap of two cells, never a copy, so particle
//! count per kind is conserved by construction.

use loam_types::{CellSnapshot, ParticleKind, Position, WorldSnapshot};

use crate::error::WorldError;
use crate::particle::Particle;

/// Largest accepted grid area, keeps the arena allocation sane.
const MAX_AREA: u64 = 4_000_000;

/// A dense `width * height` particle arena.
///
/// Cells are stored row-major from the bottom row up: index
/// `y * width + x`, with `y` increasing upward.
#[derive(Debug, Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Particle>,
    boundary: Particle,
    tick: u64,
    /// Whether rain is currently falling over the grid.
    pub is_raining: bool,
    /// Ambient light, 0 (night) to 100 (full daylight).
    pub light_level: u8,
}

impl Grid {
    /// Creates a grid of the given dimensions filled with air.
    pub fn new(width: u32, height: u32) -> Result<Self, WorldError> {
        let area = u64::from(width).saturating_mul(u64::from(height));
        if width == 0 || height == 0 || area > MAX_AREA {
            return Err(WorldError::InvalidDimensions { width, height });
        }
        let capacity =
            usize::try_from(area).map_err(|_| WorldError::InvalidDimensions { width, height })?;

        let mut cells = Vec::with_capacity(capacity);
        for y in 0..height {
            for x in 0..width {
                cells.push(Particle::air(reindex(x), reindex(y)));
            }
        }

        Ok(Self {
            width,
            height,
            cells,
            boundary: Particle::new(ParticleKind::Boundary, -1, -1),
            tick: 0,
            is_raining: false,
            light_level: 100,
        })
    }

    /// Grid width in cells.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Advances the tick counter by one.
    pub const fn advance_tick(&mut self) {
        self.tick = self.tick.saturating_add(1);
    }

    /// Whether `(x, y)` lies inside the grid.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0
            && y >= 0
            && i64::from(x) < i64::from(self.width)
            && i64::from(y) < i64::from(self.height)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.contains(x, y) {
            return None;
        }
        let x = u64::try_from(x).ok()?;
        let y = u64::try_from(y).ok()?;
        usize::try_from(y.checked_mul(u64::from(self.width))?.checked_add(x)?).ok()
    }

    /// The particle at `(x, y)`, or the boundary sentinel outside the grid.
    pub fn get(&self, x: i32, y: i32) -> &Particle {
        self.index(x, y)
            .and_then(|i| self.cells.get(i))
            .unwrap_or(&self.boundary)
    }

    /// The particle at `position`, or the boundary sentinel outside the grid.
    pub fn at(&self, position: Position) -> &Particle {
        self.get(position.x, position.y)
    }

    /// Mutable access to the particle at `(x, y)`, `None` outside the grid.
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Particle> {
        self.index(x, y).and_then(|i| self.cells.get_mut(i))
    }

    /// Overwrites the cell at the particle's own position.
    ///
    /// The only way material enters or leaves the world. Fails fast when
    /// the position is outside the grid.
    pub fn set(&mut self, mut particle: Particle) -> Result<(), WorldError> {
        let Position { x, y } = particle.position;
        let index = self.index(x, y).ok_or(WorldError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })?;
        particle.last_tick = self.tick;
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = particle;
        }
        Ok(())
    }

    /// Moves the particle at `from` to `to`, displacing the occupant of
    /// `to` back into `from`.
    ///
    /// Updates both particles' positions and consumes their movement
    /// permission along each axis the move covered. When the mover is a
    /// kind capable of tunneling it also maintains the pass-through
    /// flags: the mover is marked `passing_through` while it sits inside
    /// a tunnelable host, the displaced host is marked
    /// `was_passing_through` for the remainder of the tick. Plain swaps
    /// by other kinds leave those flags untouched.
    pub fn displace(&mut self, from: Position, to: Position) -> Result<(), WorldError> {
        let i = self.index(from.x, from.y).ok_or(WorldError::OutOfBounds {
            x: from.x,
            y: from.y,
            width: self.width,
            height: self.height,
        })?;
        let j = self.index(to.x, to.y).ok_or(WorldError::OutOfBounds {
            x: to.x,
            y: to.y,
            width: self.width,
            height: self.height,
        })?;
        if i == j {
            return Ok(());
        }

        let moved_x = from.x != to.x;
        let moved_y = from.y != to.y;
        let mover_kind = self.get(from.x, from.y).kind;
        let host_kind = self.get(to.x, to.y).kind;

        self.cells.swap(i, j);

        if let Some(mover) = self.cells.get_mut(j) {
            mover.position = to;
            if moved_x {
                mover.moveable_x = false;
            }
            if moved_y {
                mover.moveable_y = false;
            }
        }
        if let Some(displaced) = self.cells.get_mut(i) {
            displaced.position = from;
            if moved_x {
                displaced.moveable_x = false;
            }
            if moved_y {
                displaced.moveable_y = false;
            }
        }

        if mover_kind.has_tunneling() {
            if let Some(displaced) = self.cells.get_mut(i) {
                if displaced.kind != ParticleKind::Air {
                    displaced.was_passing_through = true;
                }
                displaced.passing_through = false;
            }
            if let Some(mover) = self.cells.get_mut(j) {
                mover.was_passing_through = false;
                mover.passing_through =
                    host_kind != ParticleKind::Air && mover_kind.can_tunnel_through(host_kind);
            }
        }
        Ok(())
    }

    /// Mutable access to two distinct cells at once, for pairwise
    /// resource transfers.
    pub fn pair_mut(
        &mut self,
        a: Position,
        b: Position,
    ) -> Option<(&mut Particle, &mut Particle)> {
        let i = self.index(a.x, a.y)?;
        let j = self.index(b.x, b.y)?;
        if i == j {
            return None;
        }
        if i < j {
            let (low, high) = self.cells.split_at_mut(j);
            Some((low.get_mut(i)?, high.first_mut()?))
        } else {
            let (low, high) = self.cells.split_at_mut(i);
            let (first, second) = (high.first_mut()?, low.get_mut(j)?);
            Some((first, second))
        }
    }

    /// Restores per-tick state on every particle. Called once at the
    /// start of each tick, before any movement.
    pub fn refresh_all(&mut self) {
        for cell in &mut self.cells {
            cell.refresh();
        }
    }

    /// Iterates over all cells in row-major bottom-up order.
    pub fn cells(&self) -> impl Iterator<Item = &Particle> {
        self.cells.iter()
    }

    /// A full read-only copy of the grid state.
    pub fn snapshot(&self) -> WorldSnapshot {
        let cells = self
            .cells
            .iter()
            .map(|p| {
                let organic = p.organic();
                CellSnapshot {
                    kind: p.kind,
                    water_level: organic.map_or(0, |o| o.water_level),
                    nutrient_level: organic.map_or(0, |o| o.nutrient_level),
                    shade: p.shade,
                }
            })
            .collect();
        WorldSnapshot {
            width: self.width,
            height: self.height,
            tick: self.tick,
            is_raining: self.is_raining,
            light_level: self.light_level,
            cells,
        }
    }
}

/// Converts a construction-loop counter into a cell coordinate.
fn reindex(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}
