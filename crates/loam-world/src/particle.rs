//! Per-cell particle state.
//!
//! A [`Particle`] couples a material kind with its mutable runtime state:
//! per-tick movement permissions, the tick guard against double updates,
//! and a kind-specific [`Payload`] holding resource stores, countdowns,
//! or growth state.
//!
//! # Movement permissions
//!
//! Each tick begins by refreshing `moveable_x` and `moveable_y` from the
//! kind's static moveability. Every movement primitive that fires clears
//! the permission for the axis it moved along, which is what guarantees
//! at most one horizontal and one vertical move per particle per tick
//! even though the grid is mutated in place during the sweep.

use std::collections::VecDeque;

use loam_types::{ParticleKind, PlantDna, Position};

/// Default store capacity for organic particles.
pub const ORGANIC_CAPACITY: u32 = 100;

/// Default decay countdown for freshly dead plant tissue, in ticks.
pub const DECAY_LIFETIME: u32 = 500;

/// Water and nutrient stores carried by organic particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrganicState {
    /// Stored water, `0..=water_capacity`.
    pub water_level: u32,
    /// Maximum water this particle can hold.
    pub water_capacity: u32,
    /// Stored nutrients, `0..=nutrient_capacity`.
    pub nutrient_level: u32,
    /// Maximum nutrients this particle can hold.
    pub nutrient_capacity: u32,
    /// Whether water moved through this particle this tick.
    pub water_transferred: bool,
    /// Whether nutrients moved through this particle this tick.
    pub nutrient_transferred: bool,
}

impl OrganicState {
    /// Fresh organic stores at the given starting levels.
    pub const fn new(water_level: u32, nutrient_level: u32) -> Self {
        Self {
            water_level,
            water_capacity: ORGANIC_CAPACITY,
            nutrient_level,
            nutrient_capacity: ORGANIC_CAPACITY,
            water_transferred: false,
            nutrient_transferred: false,
        }
    }

    /// Empty stores with the default capacity.
    pub const fn empty() -> Self {
        Self::new(0, 0)
    }

    /// Clears the per-tick transfer flags.
    pub const fn refresh(&mut self) {
        self.water_transferred = false;
        self.nutrient_transferred = false;
    }
}

impl Default for OrganicState {
    fn default() -> Self {
        Self::empty()
    }
}

/// Condensation countdown carried by steam particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SteamState {
    /// Ticks of airborne life remaining before condensing into water.
    pub condensation_countdown: u32,
}

/// Decay countdown carried by dead plant matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecayState {
    /// Ticks remaining before the tissue becomes compost.
    pub remaining_lifetime: u32,
    /// Stores inherited from the living tissue, passed on to compost.
    pub organic: OrganicState,
}

/// Growth state carried by bark tissue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarkState {
    /// Resource stores, fed by the roots and spent on growth.
    pub organic: OrganicState,
    /// Distance in cells from the seed, 0 at the seed itself.
    pub current_length: u32,
    /// Heritable growth parameters, copied verbatim into children.
    pub dna: PlantDna,
    /// Pending growth offsets relative to this cell, lazily initialized
    /// on the first activated tick.
    pub candidates: Option<VecDeque<Position>>,
    /// Whether this cell can still grow. Cleared permanently once the
    /// candidate queue empties.
    pub active: bool,
}

impl BarkState {
    /// A freshly planted seed with the given DNA.
    pub const fn seed(dna: PlantDna) -> Self {
        Self {
            organic: OrganicState::empty(),
            current_length: 0,
            dna,
            candidates: None,
            active: true,
        }
    }

    /// A child tissue cell one step further from the seed.
    pub const fn child(&self) -> Self {
        Self {
            organic: OrganicState::empty(),
            current_length: self.current_length.saturating_add(1),
            dna: self.dna,
            candidates: None,
            active: true,
        }
    }
}

/// Kind-specific state attached to a particle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// No extra state (air, water, boundary).
    Inert,
    /// Resource stores for soil, grass, and compost.
    Organic(OrganicState),
    /// Condensation countdown for steam.
    Steam(SteamState),
    /// Decay countdown for dead plant matter.
    Decay(DecayState),
    /// Growth state for bark tissue.
    Bark(Box<BarkState>),
}

/// One grid cell's occupant and its runtime state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)] // movement permissions are independent flags
pub struct Particle {
    /// Material kind.
    pub kind: ParticleKind,
    /// Current grid coordinate, kept in sync by the grid on every move.
    pub position: Position,
    /// Displacement weight, cached from the kind.
    pub weight: u8,
    /// Whether the kind can ever move.
    pub moveable: bool,
    /// Permission to move horizontally this tick.
    pub moveable_x: bool,
    /// Permission to move vertically this tick.
    pub moveable_y: bool,
    /// Set while this particle sits inside a tunnelable host cell.
    pub passing_through: bool,
    /// Set for one tick on a particle just displaced by a tunneler.
    pub was_passing_through: bool,
    /// Tick this particle was last updated, guards against a second
    /// update when a move lands it ahead of the sweep.
    pub last_tick: u64,
    /// Stable per-cell brightness offset for rendering texture.
    pub shade: u8,
    /// Kind-specific state.
    pub payload: Payload,
}

impl Particle {
    /// Creates a particle of `kind` at `(x, y)` with default payload.
    pub fn new(kind: ParticleKind, x: i32, y: i32) -> Self {
        let payload = match kind {
            ParticleKind::Air | ParticleKind::Boundary | ParticleKind::Water => Payload::Inert,
            ParticleKind::Soil | ParticleKind::Grass | ParticleKind::Compost => {
                Payload::Organic(OrganicState::empty())
            }
            ParticleKind::Steam => Payload::Steam(SteamState {
                condensation_countdown: 0,
            }),
            ParticleKind::DeadPlant => Payload::Decay(DecayState {
                remaining_lifetime: DECAY_LIFETIME,
                organic: OrganicState::empty(),
            }),
            ParticleKind::Bark => Payload::Bark(Box::new(BarkState::seed(PlantDna::default()))),
        };
        Self::with_payload(kind, x, y, payload)
    }

    /// Creates a particle with an explicit payload.
    pub fn with_payload(kind: ParticleKind, x: i32, y: i32, payload: Payload) -> Self {
        Self {
            kind,
            position: Position::new(x, y),
            weight: kind.weight(),
            moveable: kind.is_moveable(),
            moveable_x: kind.is_moveable(),
            moveable_y: kind.is_moveable(),
            passing_through: false,
            was_passing_through: false,
            last_tick: 0,
            shade: derive_shade(x, y),
            payload,
        }
    }

    /// An air particle at `(x, y)`.
    pub fn air(x: i32, y: i32) -> Self {
        Self::with_payload(ParticleKind::Air, x, y, Payload::Inert)
    }

    /// Restores per-tick movement permissions and transfer flags at the
    /// start of a tick. `was_passing_through` lasts exactly one tick.
    pub fn refresh(&mut self) {
        self.moveable_x = self.moveable;
        self.moveable_y = self.moveable;
        self.was_passing_through = false;
        match &mut self.payload {
            Payload::Organic(organic) => organic.refresh(),
            Payload::Decay(decay) => decay.organic.refresh(),
            Payload::Bark(bark) => bark.organic.refresh(),
            Payload::Inert | Payload::Steam(_) => {}
        }
    }

    /// The organic stores of this particle, if its kind carries any.
    pub fn organic(&self) -> Option<&OrganicState> {
        match &self.payload {
            Payload::Organic(organic) => Some(organic),
            Payload::Decay(decay) => Some(&decay.organic),
            Payload::Bark(bark) => Some(&bark.organic),
            Payload::Inert | Payload::Steam(_) => None,
        }
    }

    /// Mutable access to the organic stores, if any.
    pub fn organic_mut(&mut self) -> Option<&mut OrganicState> {
        match &mut self.payload {
            Payload::Organic(organic) => Some(organic),
            Payload::Decay(decay) => Some(&mut decay.organic),
            Payload::Bark(bark) => Some(&mut bark.organic),
            Payload::Inert | Payload::Steam(_) => None,
        }
    }

    /// Whether this particle still holds permission to move along both axes.
    pub const fn fully_moveable(&self) -> bool {
        self.moveable_x && self.moveable_y
    }
}

/// Small deterministic brightness offset so uniform fills do not render
/// as flat color blocks.
fn derive_shade(x: i32, y: i32) -> u8 {
    let mixed = x.wrapping_mul(31).wrapping_add(y.wrapping_mul(17)).unsigned_abs();
    let folded = mixed.wrapping_mul(0x9e37_79b9).checked_shr(28).unwrap_or(0) & 0x0f;
    u8::try_from(folded).unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn refresh_restores_permissions() {
        let mut p = Particle::new(ParticleKind::Water, 2, 3);
        p.moveable_x = false;
        p.moveable_y = false;
        p.was_passing_through = true;
        p.refresh();
        assert!(p.moveable_x);
        assert!(p.moveable_y);
        assert!(!p.was_passing_through);
    }

    #[test]
    fn refresh_never_grants_permission_to_immovable_kinds() {
        let mut p = Particle::new(ParticleKind::Bark, 0, 0);
        p.refresh();
        assert!(!p.moveable_x);
        assert!(!p.moveable_y);
    }

    #[test]
    fn refresh_clears_transfer_flags() {
        let mut p = Particle::new(ParticleKind::Soil, 0, 0);
        let organic = p.organic_mut().unwrap();
        organic.water_transferred = true;
        organic.nutrient_transferred = true;
        p.refresh();
        let organic = p.organic().unwrap();
        assert!(!organic.water_transferred);
        assert!(!organic.nutrient_transferred);
    }

    #[test]
    fn fresh_dead_plant_carries_the_default_lifetime() {
        let dead = Particle::new(ParticleKind::DeadPlant, 0, 0);
        match &dead.payload {
            Payload::Decay(decay) => assert_eq!(decay.remaining_lifetime, DECAY_LIFETIME),
            other => panic!("payload was {other:?}"),
        }
    }

    #[test]
    fn organic_reaches_into_decay_and_bark_payloads() {
        let dead = Particle::new(ParticleKind::DeadPlant, 0, 0);
        assert!(dead.organic().is_some());
        let bark = Particle::new(ParticleKind::Bark, 0, 0);
        assert!(bark.organic().is_some());
        let water = Particle::new(ParticleKind::Water, 0, 0);
        assert!(water.organic().is_none());
    }

    #[test]
    fn bark_child_extends_length_and_inherits_dna() {
        let dna = PlantDna {
            growth_angle_deg: -30,
            max_length: 8,
        };
        let seed = BarkState::seed(dna);
        let child = seed.child();
        assert_eq!(child.current_length, 1);
        assert_eq!(child.dna, dna);
        assert!(child.candidates.is_none());
        assert!(child.active);
    }

    #[test]
    fn shade_is_deterministic() {
        let a = Particle::new(ParticleKind::Soil, 4, 9);
        let b = Particle::new(ParticleKind::Soil, 4, 9);
        assert_eq!(a.shade, b.shade);
    }
}
