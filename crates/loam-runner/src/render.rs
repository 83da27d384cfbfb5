//! Terminal rendering of world snapshots.
//!
//! One glyph per cell, top row first so the printout matches the world's
//! orientation (`y` increases upward).

use loam_types::{CellSnapshot, ParticleKind, WorldSnapshot};

/// The glyph used for one material kind.
pub const fn glyph_of(kind: ParticleKind) -> char {
    match kind {
        ParticleKind::Air => ' ',
        ParticleKind::Boundary => '#',
        ParticleKind::Water => '~',
        ParticleKind::Steam => '\'',
        ParticleKind::Soil => '.',
        ParticleKind::Grass => '"',
        ParticleKind::Compost => ',',
        ParticleKind::DeadPlant => 'x',
        ParticleKind::Bark => '|',
    }
}

/// Renders a snapshot as one string, rows separated by newlines, top row
/// first.
pub fn render(snapshot: &WorldSnapshot) -> String {
    let width = usize::try_from(snapshot.width).unwrap_or(0);
    let height = usize::try_from(snapshot.height).unwrap_or(0);
    let mut out = String::with_capacity(height.saturating_mul(width.saturating_add(1)));
    for y in (0..height).rev() {
        for x in 0..width {
            let glyph = snapshot
                .cells
                .get(y.saturating_mul(width).saturating_add(x))
                .map_or('?', |cell: &CellSnapshot| glyph_of(cell.kind));
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}
