//! Read-only world snapshots for rendering and inspection.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ParticleKind;

/// One cell of a [`WorldSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CellSnapshot {
    /// Material occupying the cell.
    pub kind: ParticleKind,
    /// Stored water, 0 when the kind carries no stores.
    pub water_level: u32,
    /// Stored nutrients, 0 when the kind carries no stores.
    pub nutrient_level: u32,
    /// Small per-cell brightness offset for rendering texture.
    pub shade: u8,
}

/// A full copy of the grid state at one tick, row-major from the bottom
/// row up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldSnapshot {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Tick the snapshot was taken at.
    pub tick: u64,
    /// Whether rain was falling at snapshot time.
    pub is_raining: bool,
    /// Ambient light, 0 (night) to 100 (full daylight).
    pub light_level: u8,
    /// `width * height` cells, index `y * width + x`.
    pub cells: Vec<CellSnapshot>,
}
