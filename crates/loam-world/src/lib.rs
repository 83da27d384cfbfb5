//! Grid, particles, and environment for the Loam simulation.
//!
//! This crate models the physical substrate: a dense particle grid with
//! swap-based movement and a boundary sentinel, per-particle runtime
//! state (permissions, stores, countdowns), the deterministic weather
//! cycle, and the default starting world.
//!
//! # Modules
//!
//! - [`error`] -- Error types for grid operations.
//! - [`grid`] -- The dense particle arena with swap-based movement and
//!   pass-through bookkeeping.
//! - [`particle`] -- Per-cell state: permissions, tick guard, and
//!   kind-specific payloads.
//! - [`weather`] -- Deterministic rain and day/night cycles.
//! - [`genesis`] -- Default starting world builder.

pub mod error;
pub mod genesis;
pub mod grid;
pub mod particle;
pub mod weather;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use genesis::{create_starting_world, plant_seed};
pub use grid::Grid;
pub use particle::{BarkState, DecayState, OrganicState, Particle, Payload, SteamState};
pub use weather::WeatherCycle;
