//! Scene graph: the exclusive owner of renderable transforms.
//!
//! # Invariants
//! - The scene graph is restructured (insert/remove) only through
//!   [`Scene`]; collaborating systems write into existing transform
//!   slots, never add or remove nodes.
//! - An instanced object's instance array is index-stable for the
//!   lifetime of the object.
//! - Iteration order is deterministic (BTreeMap keyed by `ObjectId`).

pub mod graph;
pub mod object;

pub use graph::Scene;
pub use object::{Instance, PickBounds, SceneNode, SceneObject};

pub fn crate_info() -> &'static str {
    "tableau-scene v0.1.0"
}
