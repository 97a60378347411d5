//! Rendering boundary: renderer-agnostic interface.
//!
//! # Invariants
//! - A renderer cannot mutate the scene; render state derives from scene
//!   state and view.
//! - Picking rays and rendered frames share the same view-projection, so
//!   what the pointer hits is what the camera sees.
//!
//! # Workaround
//! Ships a trait-based renderer interface with a debug text renderer as
//! a workaround for a GPU backend. The trait is stable; swap in a GPU
//! implementation without changing consumers.

mod renderer;
mod view;

pub use renderer::{DebugTextRenderer, Renderer};
pub use view::{Ray, RenderView};

pub fn crate_info() -> &'static str {
    "tableau-render v0.1.0"
}
