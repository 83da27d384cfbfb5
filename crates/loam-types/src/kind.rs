//! Material kinds and their static capabilities.
//!
//! Every grid cell is occupied by exactly one material kind at all times.
//! Empty space is the [`ParticleKind::Air`] kind, never a null, and reads
//! outside the grid resolve to the immovable [`ParticleKind::Boundary`]
//! sentinel so edge logic needs no special-casing.
//!
//! Static capabilities (weight, moveability, tunnelable kinds) are
//! functions of the kind alone; per-tick permissions live on the particle.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Weight of the boundary sentinel: above every real material, so nothing
/// ever displaces it.
pub const BOUNDARY_WEIGHT: u8 = u8::MAX;

/// A material kind occupying one grid cell.
///
/// The ordinal `weight` decides every displacement comparison: a strictly
/// heavier particle can displace a lighter one, never the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ParticleKind {
    // --- Empty space and edges ---
    /// Empty space. A first-class occupant with weight 0.
    Air,
    /// The out-of-range sentinel. Immovable, heavier than everything.
    Boundary,

    // --- Fluids and gases ---
    /// Liquid water. Falls and erodes sideways.
    Water,
    /// Water vapor. Rises, condenses back into water over time.
    Steam,

    // --- Organics ---
    /// Mineral soil carrying water and nutrient stores.
    Soil,
    /// Living grass sprouted over soil.
    Grass,
    /// Decomposed organic matter, the end of the decay chain.
    Compost,
    /// Dead plant tissue counting down to compost.
    DeadPlant,

    // --- Plant tissue ---
    /// Woody plant tissue that branches outward while it has energy.
    Bark,
}

impl ParticleKind {
    /// Ordinal displacement weight for this kind.
    ///
    /// Air and Steam are 0, Water 1, organics 2, Bark 3, Boundary above
    /// all real materials.
    pub const fn weight(self) -> u8 {
        match self {
            Self::Air | Self::Steam => 0,
            Self::Water => 1,
            Self::Soil | Self::Grass | Self::Compost | Self::DeadPlant => 2,
            Self::Bark => 3,
            Self::Boundary => BOUNDARY_WEIGHT,
        }
    }

    /// Whether this kind can ever be displaced by gravity, erosion, or
    /// tunneling. Plant tissue and the boundary are fixed in place.
    pub const fn is_moveable(self) -> bool {
        match self {
            Self::Air
            | Self::Water
            | Self::Steam
            | Self::Soil
            | Self::Grass
            | Self::Compost
            | Self::DeadPlant => true,
            Self::Bark | Self::Boundary => false,
        }
    }

    /// Whether this kind can pass through cells occupied by `other`.
    ///
    /// Soil-derived kinds tunnel through plant tissue so a growing trunk
    /// does not trap the ground around it; everything else has an empty
    /// tunnelable set.
    pub const fn can_tunnel_through(self, other: Self) -> bool {
        matches!(self, Self::Soil | Self::Grass) && matches!(other, Self::Bark)
    }

    /// Whether this kind has any tunnelable kinds at all.
    pub const fn has_tunneling(self) -> bool {
        matches!(self, Self::Soil | Self::Grass)
    }

    /// Whether this kind carries water/nutrient stores and participates
    /// in organic diffusion.
    pub const fn is_organic(self) -> bool {
        matches!(
            self,
            Self::Soil | Self::Grass | Self::Compost | Self::DeadPlant | Self::Bark
        )
    }

    /// Whether this kind is living or dead plant tissue.
    pub const fn is_plant_tissue(self) -> bool {
        matches!(self, Self::Bark | Self::DeadPlant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_outweighs_everything() {
        for kind in [
            ParticleKind::Air,
            ParticleKind::Water,
            ParticleKind::Steam,
            ParticleKind::Soil,
            ParticleKind::Grass,
            ParticleKind::Compost,
            ParticleKind::DeadPlant,
            ParticleKind::Bark,
        ] {
            assert!(kind.weight() < ParticleKind::Boundary.weight());
        }
    }

    #[test]
    fn boundary_is_immovable() {
        assert!(!ParticleKind::Boundary.is_moveable());
    }

    #[test]
    fn soil_tunnels_through_bark_only() {
        assert!(ParticleKind::Soil.can_tunnel_through(ParticleKind::Bark));
        assert!(!ParticleKind::Soil.can_tunnel_through(ParticleKind::Soil));
        assert!(!ParticleKind::Soil.can_tunnel_through(ParticleKind::Boundary));
        assert!(!ParticleKind::Water.can_tunnel_through(ParticleKind::Bark));
    }

    #[test]
    fn organics_are_heavier_than_water() {
        assert!(ParticleKind::Soil.weight() > ParticleKind::Water.weight());
        assert!(ParticleKind::Water.weight() > ParticleKind::Air.weight());
    }
}
