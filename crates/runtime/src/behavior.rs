//! Behavior capabilities: the hooks an object can opt into and the
//! umbrella trait the world routes on.
//!
//! An object declares a capability by overriding the matching `as_*`
//! accessor to return itself. Routing happens once, at registration;
//! the accessors are not consulted again afterwards except to borrow
//! the hook for dispatch.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tableau_common::ObjectId;
use tableau_scene::Scene;

use crate::frame::{FrameCommands, FrameloopMode};
use crate::gui::{ControlSet, GuiContext};
use crate::physics::{ContactParticipant, PhysicsBody};
use crate::pointer::PointerHit;
use crate::{physics2d, physics3d};

/// Context handed to per-frame tick hooks.
pub struct TickContext<'a> {
    /// The ticked object's own id.
    pub object: ObjectId,
    pub delta: f32,
    pub frameloop: FrameloopMode,
    pub scene: &'a mut Scene,
    pub commands: &'a mut FrameCommands,
}

/// Context handed to pointer hooks.
pub struct PointerContext<'a> {
    pub scene: &'a mut Scene,
    pub commands: &'a mut FrameCommands,
}

/// Per-frame logic.
pub trait Tickable {
    fn tick(&mut self, ctx: &mut TickContext<'_>);
}

/// Builds the object's bodies in a planar simulation.
pub trait PhysicsAttachable2D {
    fn add_physics_2d(&mut self, ctx: &mut physics2d::AttachContext<'_>);
}

/// Builds the object's bodies in a spatial simulation.
pub trait PhysicsAttachable3D {
    fn add_physics_3d(&mut self, ctx: &mut physics3d::AttachContext<'_>);
}

/// Reacts to a pointer click landing on the object.
pub trait Clickable {
    fn on_click(&mut self, hit: &PointerHit, ctx: &mut PointerContext<'_>);
}

/// Reacts to the pointer's nearest hit moving onto or off the object.
pub trait Hoverable {
    fn on_pointer_enter(&mut self, _ctx: &mut PointerContext<'_>) {}
    fn on_pointer_leave(&mut self, _ctx: &mut PointerContext<'_>) {}
}

/// Reacts to collision begin/end events on the object's bodies.
pub trait CollisionHandler {
    fn on_collision_enter(&mut self, _own: &PhysicsBody, _other: &ContactParticipant) {}
    fn on_collision_exit(&mut self, _own: &PhysicsBody, _other: &ContactParticipant) {}
}

/// Polled each frame with every body currently touching the object's
/// bodies.
pub trait ContactHandler {
    fn on_contacts_with(&mut self, own: &PhysicsBody, other: &ContactParticipant);
}

/// Reacts to a body crossing the sleep boundary.
pub trait SleepHandler {
    fn on_sleep(&mut self, _own: &PhysicsBody) {}
    fn on_wake(&mut self, _own: &PhysicsBody) {}
}

/// Exposes tunable parameters through the control registry.
pub trait Tweakable {
    /// Registers controls. Runs once, after physics attachment.
    fn update_gui(&mut self, ctx: &mut GuiContext<'_>);

    /// The object's live parameter values, written by the host through
    /// [`crate::World::set_control`].
    fn control_set(&mut self) -> &mut ControlSet;
}

/// Umbrella trait: every object behavior implements this, overriding
/// the accessors for the capabilities it has.
pub trait Behavior {
    fn as_tickable(&mut self) -> Option<&mut dyn Tickable> {
        None
    }
    fn as_physics2d(&mut self) -> Option<&mut dyn PhysicsAttachable2D> {
        None
    }
    fn as_physics3d(&mut self) -> Option<&mut dyn PhysicsAttachable3D> {
        None
    }
    fn as_clickable(&mut self) -> Option<&mut dyn Clickable> {
        None
    }
    fn as_hoverable(&mut self) -> Option<&mut dyn Hoverable> {
        None
    }
    fn as_collision_handler(&mut self) -> Option<&mut dyn CollisionHandler> {
        None
    }
    fn as_contact_handler(&mut self) -> Option<&mut dyn ContactHandler> {
        None
    }
    fn as_sleep_handler(&mut self) -> Option<&mut dyn SleepHandler> {
        None
    }
    fn as_tweakable(&mut self) -> Option<&mut dyn Tweakable> {
        None
    }
}

/// Shared ownership wrapper for behaviors; the world and in-flight
/// dispatches both hold them.
pub type SharedBehavior = Rc<RefCell<dyn Behavior>>;

/// Behaviors keyed by object, deterministic iteration order.
pub type BehaviorMap = BTreeMap<ObjectId, SharedBehavior>;

/// Wraps a concrete behavior for registration.
pub fn shared<B: Behavior + 'static>(behavior: B) -> SharedBehavior {
    Rc::new(RefCell::new(behavior))
}

/// Scenery: an object with no hooks at all.
#[derive(Debug, Default)]
pub struct Inert;

impl Behavior for Inert {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inert_has_no_capabilities() {
        let mut inert = Inert;
        assert!(inert.as_tickable().is_none());
        assert!(inert.as_physics2d().is_none());
        assert!(inert.as_physics3d().is_none());
        assert!(inert.as_clickable().is_none());
        assert!(inert.as_hoverable().is_none());
        assert!(inert.as_collision_handler().is_none());
        assert!(inert.as_contact_handler().is_none());
        assert!(inert.as_sleep_handler().is_none());
        assert!(inert.as_tweakable().is_none());
    }

    struct Spinner;

    impl Behavior for Spinner {
        fn as_tickable(&mut self) -> Option<&mut dyn Tickable> {
            Some(self)
        }
    }

    impl Tickable for Spinner {
        fn tick(&mut self, _ctx: &mut TickContext<'_>) {}
    }

    #[test]
    fn overridden_accessor_exposes_the_hook() {
        let behavior = shared(Spinner);
        assert!(behavior.borrow_mut().as_tickable().is_some());
        assert!(behavior.borrow_mut().as_hoverable().is_none());
    }
}
