//! The built-in demo scene: a fixed floor, a bouncing ball that logs
//! its physics events, a clickable cube that spins on demand, and a
//! column of instanced cubes with one slot pinned in place.

use glam::{Quat, Vec3};
use rapier3d::prelude::{ColliderBuilder, RigidBodyBuilder, Vector};
use tableau_common::Transform;
use tableau_runtime::{
    Behavior, Clickable, CollisionHandler, ContactParticipant, ControlKind, ControlSet,
    ControlValue, GuiContext, Hoverable, PhysicsAttachable3D, PhysicsBody, PointerContext,
    PointerHit, SharedBehavior, SleepHandler, Tweakable, World, physics3d, shared,
};
use tableau_scene::{Instance, PickBounds, SceneObject};

/// Wide fixed slab the rest of the scene lands on.
struct Floor;

impl Behavior for Floor {
    fn as_physics3d(&mut self) -> Option<&mut dyn PhysicsAttachable3D> {
        Some(self)
    }
}

impl PhysicsAttachable3D for Floor {
    fn add_physics_3d(&mut self, ctx: &mut physics3d::AttachContext<'_>) {
        let p = ctx.transform().map(|t| t.position).unwrap_or_default();
        ctx.add_body(
            RigidBodyBuilder::fixed().translation(Vector::new(p.x, p.y, p.z)),
            ColliderBuilder::cuboid(20.0, 0.5, 20.0),
        );
    }
}

/// Dynamic ball that narrates its life through the log.
struct Ball;

impl Behavior for Ball {
    fn as_physics3d(&mut self) -> Option<&mut dyn PhysicsAttachable3D> {
        Some(self)
    }
    fn as_collision_handler(&mut self) -> Option<&mut dyn CollisionHandler> {
        Some(self)
    }
    fn as_sleep_handler(&mut self) -> Option<&mut dyn SleepHandler> {
        Some(self)
    }
}

impl PhysicsAttachable3D for Ball {
    fn add_physics_3d(&mut self, ctx: &mut physics3d::AttachContext<'_>) {
        let p = ctx.transform().map(|t| t.position).unwrap_or_default();
        ctx.add_body(
            RigidBodyBuilder::dynamic().translation(Vector::new(p.x, p.y, p.z)),
            ColliderBuilder::ball(0.5).restitution(0.6),
        );
    }
}

impl CollisionHandler for Ball {
    fn on_collision_enter(&mut self, _own: &PhysicsBody, other: &ContactParticipant) {
        tracing::info!(other = %other.id.0, "ball touched down");
    }
    fn on_collision_exit(&mut self, _own: &PhysicsBody, other: &ContactParticipant) {
        tracing::info!(other = %other.id.0, "ball bounced off");
    }
}

impl SleepHandler for Ball {
    fn on_sleep(&mut self, _own: &PhysicsBody) {
        tracing::info!("ball settled");
    }
    fn on_wake(&mut self, _own: &PhysicsBody) {
        tracing::info!("ball awake");
    }
}

/// Clickable cube: a click starts a timed spin driven by transient
/// frame work, with the rate taken from its control set.
struct SpinCube {
    controls: ControlSet,
}

impl SpinCube {
    fn new() -> Self {
        let mut controls = ControlSet::new();
        controls.insert("spin_speed".into(), ControlValue::Scalar(3.0));
        Self { controls }
    }
}

impl Behavior for SpinCube {
    fn as_clickable(&mut self) -> Option<&mut dyn Clickable> {
        Some(self)
    }
    fn as_hoverable(&mut self) -> Option<&mut dyn Hoverable> {
        Some(self)
    }
    fn as_tweakable(&mut self) -> Option<&mut dyn Tweakable> {
        Some(self)
    }
}

impl Clickable for SpinCube {
    fn on_click(&mut self, hit: &PointerHit, ctx: &mut PointerContext<'_>) {
        let object = hit.object;
        let speed = match self.controls.get("spin_speed") {
            Some(ControlValue::Scalar(s)) => *s,
            _ => 3.0,
        };
        tracing::info!(distance = hit.distance, "cube clicked, spinning");
        let mut remaining = 1.0_f32;
        ctx.commands.run_while(move |ctx| {
            remaining -= ctx.delta;
            if let Some(t) = ctx.scene.transform_mut(object) {
                t.rotation *= Quat::from_rotation_y(speed * ctx.delta);
            }
            if remaining > 0.0 {
                ctx.commands.request_render();
                true
            } else {
                false
            }
        });
        ctx.commands.request_render();
    }
}

impl Hoverable for SpinCube {
    fn on_pointer_enter(&mut self, ctx: &mut PointerContext<'_>) {
        tracing::debug!("cube hovered");
        ctx.commands.request_render();
    }
    fn on_pointer_leave(&mut self, ctx: &mut PointerContext<'_>) {
        ctx.commands.request_render();
    }
}

impl Tweakable for SpinCube {
    fn update_gui(&mut self, ctx: &mut GuiContext<'_>) {
        ctx.add_control(
            "cube",
            "spin_speed",
            ControlKind::Slider {
                min: 0.0,
                max: 10.0,
            },
        );
        ctx.show_group("cube", true);
    }

    fn control_set(&mut self) -> &mut ControlSet {
        &mut self.controls
    }
}

/// Instanced column: every slot gets its own body, the middle slot is
/// pinned and keeps its authored placement.
struct Column {
    pinned_slot: usize,
}

impl Behavior for Column {
    fn as_physics3d(&mut self) -> Option<&mut dyn PhysicsAttachable3D> {
        Some(self)
    }
}

impl PhysicsAttachable3D for Column {
    fn add_physics_3d(&mut self, ctx: &mut physics3d::AttachContext<'_>) {
        for slot in 0..ctx.instance_count() {
            let Some(instance) = ctx.instance(slot) else {
                continue;
            };
            let p = instance.transform.position;
            let builder = if slot == self.pinned_slot {
                RigidBodyBuilder::fixed()
            } else {
                RigidBodyBuilder::dynamic()
            };
            ctx.add_instance_body(
                builder.translation(Vector::new(p.x, p.y, p.z)),
                ColliderBuilder::cuboid(0.4, 0.4, 0.4),
            );
        }
    }
}

/// Assembles the demo objects into the world.
pub fn populate(world: &mut World) {
    let objects: Vec<(SceneObject, SharedBehavior)> = vec![
        (
            SceneObject::single(
                "floor",
                Transform::at(Vec3::new(0.0, -0.5, 0.0)),
                PickBounds::Cuboid {
                    half_extents: Vec3::new(20.0, 0.5, 20.0),
                },
            ),
            shared(Floor),
        ),
        (
            SceneObject::single(
                "ball",
                Transform::at(Vec3::new(-2.0, 6.0, 0.0)),
                PickBounds::Sphere { radius: 0.5 },
            ),
            shared(Ball),
        ),
        (
            SceneObject::single(
                "cube",
                Transform::at(Vec3::new(0.0, 1.0, 0.0)),
                PickBounds::Cuboid {
                    half_extents: Vec3::splat(0.5),
                },
            ),
            shared(SpinCube::new()),
        ),
        (
            SceneObject::instanced(
                "column",
                vec![
                    Instance::with_color(Transform::at(Vec3::new(3.0, 1.0, 0.0)), [0.9, 0.2, 0.2]),
                    Instance::with_color(Transform::at(Vec3::new(3.0, 3.0, 0.0)), [0.2, 0.9, 0.2]),
                    Instance::with_color(Transform::at(Vec3::new(3.0, 5.0, 0.0)), [0.2, 0.2, 0.9]),
                ],
                PickBounds::Cuboid {
                    half_extents: Vec3::splat(0.4),
                },
            ),
            shared(Column { pinned_slot: 1 }),
        ),
    ];
    world.add_objects(objects);
}
