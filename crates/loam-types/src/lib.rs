//! Shared type definitions for the Loam simulation.
//!
//! This crate is the single source of truth for types used across the
//! Loam workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the renderer.
//!
//! # Modules
//!
//! - [`kind`] -- Material kinds and their static capabilities
//! - [`position`] -- Grid coordinates
//! - [`dna`] -- Heritable growth parameters for plant tissue
//! - [`snapshot`] -- Read-only world snapshots for rendering

pub mod dna;
pub mod kind;
pub mod position;
pub mod snapshot;

// Re-export all public types at crate root for convenience.
pub use dna::PlantDna;
pub use kind::{BOUNDARY_WEIGHT, ParticleKind};
pub use position::Position;
pub use snapshot::{CellSnapshot, WorldSnapshot};
