//! Grid coordinates.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A cell coordinate in the world grid.
///
/// `y` increases upward: gravity pulls toward `y - 1`, rising gases move
/// toward `y + 1`. Signed so neighbor arithmetic can step past the edge
/// and let the boundary sentinel answer the lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Column, 0 at the left edge.
    pub x: i32,
    /// Row, 0 at the bottom edge.
    pub y: i32,
}

impl Position {
    /// Creates a position at `(x, y)`.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The position offset by `(dx, dy)`, saturating at the `i32` range.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// The cell directly below (gravity direction).
    pub const fn below(self) -> Self {
        self.offset(0, -1)
    }

    /// The cell directly above (rise direction).
    pub const fn above(self) -> Self {
        self.offset(0, 1)
    }
}
