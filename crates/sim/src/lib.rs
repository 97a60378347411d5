//! Simulation worlds: rapier pipelines wrapped for deterministic stepping.
//!
//! Two parallel modules, one per dimensionality: [`dim2`] (rapier2d,
//! planar) and [`dim3`] (rapier3d, spatial). Both step a fixed timestep
//! so a replay with the same inputs reproduces the same states.
//!
//! # Invariants
//! - The timestep is a configuration constant, never adaptive.
//! - Simulation state is owned here exclusively; render code reads poses
//!   only through the synchronization layer above.

pub mod dim2;
pub mod dim3;

/// Fixed simulation timestep (60 Hz).
pub const SIM_DT: f32 = 1.0 / 60.0;

/// Construction failure of a simulation world.
///
/// A half-initialized simulation must never run, so these abort
/// construction of whatever owns the world.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("gravity vector must be finite")]
    NonFiniteGravity,
    #[error("timestep must be positive and finite, got {0}")]
    InvalidTimestep(f32),
}

/// Hashes an f32 by bit pattern, for state hashing.
pub(crate) fn hash_f32(value: f32, hasher: &mut impl std::hash::Hasher) {
    use std::hash::Hash;
    value.to_bits().hash(hasher);
}

pub fn crate_info() -> &'static str {
    "tableau-sim v0.1.0"
}
