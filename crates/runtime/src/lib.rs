//! Runtime composition root: the world, its frame scheduler, physics
//! synchronization layers, pointer dispatch, and the tweakable-control
//! registry.
//!
//! # Invariants
//! - Per frame, tickables run before the physics sequence; no tickable
//!   observes a half-stepped simulation.
//! - The physics sequence is fixed: step, write-back, sleep/wake,
//!   collisions, contacts.
//! - Behavior capabilities are routed once at registration; subsystems
//!   never re-inspect objects afterwards.
//! - Callbacks mutate scheduling through [`frame::FrameCommands`], never
//!   the scheduler directly, so stopping the loop from inside a tick is
//!   safe.

pub mod behavior;
pub mod frame;
pub mod gui;
pub mod physics;
pub mod physics2d;
pub mod physics3d;
pub mod pointer;
pub mod world;

pub use behavior::{
    Behavior, BehaviorMap, Clickable, CollisionHandler, ContactHandler, Hoverable, Inert,
    PhysicsAttachable2D, PhysicsAttachable3D, PointerContext, SharedBehavior, SleepHandler,
    TickContext, Tickable, Tweakable, shared,
};
pub use frame::{FrameCommands, FrameLoop, FrameStats, FrameloopMode, RunWhileContext};
pub use gui::{ControlKind, ControlSet, ControlValue, Gui, GuiContext};
pub use physics::{BodyHandle, ColliderKey, ContactParticipant, PhysicsBody};
pub use physics2d::Physics2D;
pub use physics3d::Physics3D;
pub use pointer::{Pointer, PointerHit};
pub use world::{PhysicsChoice, World, WorldConfig, WorldError};

pub fn crate_info() -> &'static str {
    "tableau-runtime v0.1.0"
}
