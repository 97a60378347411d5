//! Shared types: stable ids and spatial transforms.
//!
//! # Invariants
//! - Ids are unique per construction and totally ordered, so BTreeMap
//!   keyed storage iterates deterministically.
//! - `BodyId` round-trips losslessly through a `u128`.

pub mod types;

pub use types::{BodyId, InstanceId, ObjectId, Transform};

pub fn crate_info() -> &'static str {
    "tableau-common v0.1.0"
}
