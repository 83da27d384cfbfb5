//! Tick cycle, movement resolution, and material lifecycles for the
//! Loam simulation.
//!
//! This crate holds the engine proper: the per-tick sweep, the shared
//! motion primitives (gravity, erosion, rise, tunneling), organic
//! water/nutrient diffusion, the material lifecycle state machines, and
//! the typed configuration that tunes all of them.
//!
//! # Modules
//!
//! - [`config`] -- Typed configuration with YAML loading.
//! - [`motion`] -- Gravity, erosion, rise, and tunneling primitives.
//! - [`diffusion`] -- Gradient-limited water/nutrient transfers.
//! - [`lifecycle`] -- Phase change, decay, and the soil/grass rolls.
//! - [`growth`] -- Bark branch growth.
//! - [`tick`] -- The per-tick sweep and its summary.

pub mod config;
pub mod diffusion;
pub mod growth;
pub mod lifecycle;
pub mod motion;
pub mod tick;

// Re-export primary types at crate root.
pub use config::{ConfigError, SimConfig};
pub use tick::{TickError, TickSummary, run_tick};
