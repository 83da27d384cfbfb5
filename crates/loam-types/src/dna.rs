//! Heritable growth parameters for plant tissue.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Growth parameters carried by a plant seed and inherited unchanged by
/// every tissue cell it grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlantDna {
    /// Preferred growth direction in degrees, 0 pointing straight up,
    /// positive values rotating clockwise.
    pub growth_angle_deg: i16,
    /// Maximum trunk length, in cells, this lineage grows to.
    pub max_length: u32,
}

impl PlantDna {
    /// DNA for a plain vertical trunk.
    pub const fn upright(max_length: u32) -> Self {
        Self {
            growth_angle_deg: 0,
            max_length,
        }
    }
}

impl Default for PlantDna {
    fn default() -> Self {
        Self::upright(12)
    }
}
