//! The world: composition root tying together the scene, frame loop,
//! physics synchronization, pointer dispatch, and control registry.
//!
//! # Invariants
//! - Object registration routes capabilities exactly once; batch
//!   initialization runs physics attachment before control building.
//! - `advance` runs at most one frame per call and keeps the frame
//!   order fixed: tickables, transients, physics.
//! - Host entry points mutate the world only between frames; dispatched
//!   callbacks reach scheduling through commands, never the loop.

use glam::Vec2;
use tableau_common::ObjectId;
use tableau_render::RenderView;
use tableau_scene::{Scene, SceneObject};
use tableau_sim::SimError;
use tableau_sim::{dim2, dim3};

use crate::behavior::{BehaviorMap, PointerContext, SharedBehavior, TickContext};
use crate::frame::{FrameCommands, FrameLoop, FrameStats, FrameloopMode, RunWhileContext};
use crate::gui::{ControlValue, Gui};
use crate::physics::EventInterests;
use crate::physics2d::Physics2D;
use crate::physics3d::Physics3D;
use crate::pointer::Pointer;

/// Which physics backend the world runs, chosen at construction.
#[derive(Debug, Clone, Copy, Default)]
pub enum PhysicsChoice {
    #[default]
    None,
    TwoD(dim2::SimConfig),
    ThreeD(dim3::SimConfig),
}

enum PhysicsKind {
    None,
    TwoD(Physics2D),
    ThreeD(Physics3D),
}

/// World construction parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldConfig {
    pub mode: FrameloopMode,
    pub physics: PhysicsChoice,
    pub view: RenderView,
}

/// World construction failure. A world with a broken simulation must
/// never come up.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("physics world construction failed: {0}")]
    Physics(#[from] SimError),
}

/// The composition root.
pub struct World {
    scene: Scene,
    view: RenderView,
    behaviors: BehaviorMap,
    frame: FrameLoop,
    pointer: Pointer,
    physics: PhysicsKind,
    gui: Gui,
    stats: FrameStats,
}

impl World {
    pub fn new(config: WorldConfig) -> Result<Self, WorldError> {
        let physics = match config.physics {
            PhysicsChoice::None => PhysicsKind::None,
            PhysicsChoice::TwoD(sim) => PhysicsKind::TwoD(Physics2D::new(sim)?),
            PhysicsChoice::ThreeD(sim) => PhysicsKind::ThreeD(Physics3D::new(sim)?),
        };
        tracing::info!(mode = ?config.mode, "world up");
        Ok(Self {
            scene: Scene::new(),
            view: config.view,
            behaviors: BehaviorMap::new(),
            frame: FrameLoop::new(config.mode),
            pointer: Pointer::new(),
            physics,
            gui: Gui::new(),
            stats: FrameStats::default(),
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Authoring access to the scene. Callbacks use their context
    /// instead; this is for hosts between frames.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn view(&self) -> &RenderView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut RenderView {
        &mut self.view
    }

    pub fn gui(&self) -> &Gui {
        &self.gui
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn mode(&self) -> FrameloopMode {
        self.frame.mode()
    }

    pub fn is_running(&self) -> bool {
        self.frame.is_running()
    }

    pub fn physics2d(&self) -> Option<&Physics2D> {
        match &self.physics {
            PhysicsKind::TwoD(p) => Some(p),
            _ => None,
        }
    }

    pub fn physics3d(&self) -> Option<&Physics3D> {
        match &self.physics {
            PhysicsKind::ThreeD(p) => Some(p),
            _ => None,
        }
    }

    /// Deterministic hash of the simulation state, if physics runs.
    pub fn state_hash(&self) -> Option<u64> {
        match &self.physics {
            PhysicsKind::None => None,
            PhysicsKind::TwoD(p) => Some(p.state_hash()),
            PhysicsKind::ThreeD(p) => Some(p.state_hash()),
        }
    }

    /// Adds a batch of objects. Capabilities are routed per object,
    /// then the whole batch initializes: physics bodies first, controls
    /// second, so control hooks can see attached bodies.
    pub fn add_objects(&mut self, objects: Vec<(SceneObject, SharedBehavior)>) -> Vec<ObjectId> {
        let mut added = Vec::with_capacity(objects.len());
        for (object, behavior) in objects {
            let id = self.scene.insert(object);
            self.route(id, &behavior);
            self.behaviors.insert(id, behavior);
            added.push(id);
        }

        match &mut self.physics {
            PhysicsKind::TwoD(p) => p.init(&self.behaviors, &self.scene),
            PhysicsKind::ThreeD(p) => p.init(&self.behaviors, &self.scene),
            PhysicsKind::None => {}
        }
        self.gui.init(&self.behaviors);
        added
    }

    fn route(&mut self, id: ObjectId, behavior: &SharedBehavior) {
        let mut b = behavior.borrow_mut();

        if b.as_tickable().is_some() {
            self.frame.register_tickable(id);
        }

        let interests = EventInterests {
            sleep_wake: b.as_sleep_handler().is_some(),
            collisions: b.as_collision_handler().is_some(),
            contacts: b.as_contact_handler().is_some(),
        };
        match &mut self.physics {
            PhysicsKind::TwoD(p) if b.as_physics2d().is_some() => p.enqueue(id, interests),
            PhysicsKind::ThreeD(p) if b.as_physics3d().is_some() => p.enqueue(id, interests),
            _ => {}
        }

        if b.as_clickable().is_some() || b.as_hoverable().is_some() {
            self.pointer.register(id);
        }
        if b.as_tweakable().is_some() {
            self.gui.enqueue(id);
        }
    }

    pub fn start(&mut self) {
        self.frame.start();
    }

    pub fn stop(&mut self) {
        self.frame.stop();
    }

    pub fn request_render(&mut self) {
        self.frame.request_render();
    }

    /// Registers transient work starting on the next frame.
    pub fn run_while(
        &mut self,
        predicate: impl FnMut(&mut RunWhileContext<'_>) -> bool + 'static,
    ) {
        self.frame.run_while(predicate);
    }

    pub fn transient_count(&self) -> usize {
        self.frame.transient_count()
    }

    /// Drives one display refresh. Returns whether a frame ran.
    pub fn advance(&mut self, delta: f32) -> bool {
        if !self.frame.take_frame() {
            return false;
        }
        let mode = self.frame.mode();

        let mut commands = FrameCommands::default();
        for id in self.frame.tickables().to_vec() {
            let Some(behavior) = self.behaviors.get(&id).cloned() else {
                continue;
            };
            let mut behavior = behavior.borrow_mut();
            let Some(tickable) = behavior.as_tickable() else {
                continue;
            };
            let mut ctx = TickContext {
                object: id,
                delta,
                frameloop: mode,
                scene: &mut self.scene,
                commands: &mut commands,
            };
            tickable.tick(&mut ctx);
        }

        // Tick commands stay unapplied through the transient pass, so a
        // run_while registered from a tick first runs next frame.
        self.frame
            .run_transients(&mut self.scene, delta, &mut commands);
        self.frame.apply(&mut commands);

        match &mut self.physics {
            PhysicsKind::TwoD(p) => p.update(&mut self.scene, &self.behaviors),
            PhysicsKind::ThreeD(p) => p.update(&mut self.scene, &self.behaviors),
            PhysicsKind::None => {}
        }

        self.stats.record(delta);
        true
    }

    /// Pointer movement in surface coordinates. Recomputes hover state
    /// and fires enter/leave edges on the nearest-hit object.
    pub fn pointer_moved(&mut self, offset: Vec2, surface: Vec2) {
        self.pointer.set_position(offset, surface);
        let hits = self.pointer.cast_ray(&self.scene, &self.view);
        let current = hits.first().map(|hit| (hit.object, hit.instance));
        let previous = self.pointer.hovered();

        if current.map(|(id, _)| id) == previous.map(|(id, _)| id) {
            self.pointer.set_hovered(current);
            return;
        }

        let mut commands = FrameCommands::default();
        if let Some((prev, _)) = previous {
            self.dispatch_hover(prev, false, &mut commands);
        }
        if let Some((id, _)) = current {
            self.dispatch_hover(id, true, &mut commands);
        }
        self.pointer.set_hovered(current);
        self.frame.apply(&mut commands);
    }

    fn dispatch_hover(&mut self, id: ObjectId, enter: bool, commands: &mut FrameCommands) {
        let Some(behavior) = self.behaviors.get(&id).cloned() else {
            return;
        };
        let mut behavior = behavior.borrow_mut();
        let Some(hoverable) = behavior.as_hoverable() else {
            return;
        };
        let mut ctx = PointerContext {
            scene: &mut self.scene,
            commands,
        };
        if enter {
            hoverable.on_pointer_enter(&mut ctx);
        } else {
            hoverable.on_pointer_leave(&mut ctx);
        }
    }

    /// A pointer click at the current position. Dispatches to the
    /// nearest hit if that object is clickable.
    pub fn pointer_clicked(&mut self) {
        let hits = self.pointer.cast_ray(&self.scene, &self.view);
        let Some(hit) = hits.first().copied() else {
            return;
        };
        let Some(behavior) = self.behaviors.get(&hit.object).cloned() else {
            return;
        };
        let mut behavior = behavior.borrow_mut();
        let Some(clickable) = behavior.as_clickable() else {
            return;
        };
        let mut commands = FrameCommands::default();
        let mut ctx = PointerContext {
            scene: &mut self.scene,
            commands: &mut commands,
        };
        clickable.on_click(&hit, &mut ctx);
        drop(behavior);
        self.frame.apply(&mut commands);
    }

    /// Writes a control value through the registry into the owning
    /// object's control set, then requests a frame so the change shows.
    pub fn set_control(&mut self, group: &str, name: &str, value: ControlValue) -> bool {
        let Some(control) = self.gui.find(group, name) else {
            return false;
        };
        let object = control.object;
        let Some(behavior) = self.behaviors.get(&object).cloned() else {
            return false;
        };
        let mut behavior = behavior.borrow_mut();
        let Some(tweakable) = behavior.as_tweakable() else {
            return false;
        };
        tweakable.control_set().insert(name.to_string(), value);
        drop(behavior);
        self.frame.request_render();
        true
    }

    /// Toggles a control group's visibility and requests a frame.
    pub fn show_gui_group(&mut self, group: &str, visible: bool) -> bool {
        let changed = self.gui.set_visible(group, visible);
        if changed {
            self.frame.request_render();
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::{Quat, Vec3};
    use rapier3d::prelude as rp3;
    use tableau_common::Transform;
    use tableau_scene::PickBounds;
    use tableau_sim::SIM_DT;

    use crate::behavior::{
        Behavior, Clickable, Hoverable, Inert, PhysicsAttachable3D, Tickable, Tweakable, shared,
    };
    use crate::gui::{ControlKind, ControlSet, GuiContext};
    use crate::physics3d;
    use crate::pointer::PointerHit;

    type Log = Rc<RefCell<Vec<String>>>;

    fn world_3d(mode: FrameloopMode) -> World {
        World::new(WorldConfig {
            mode,
            physics: PhysicsChoice::ThreeD(dim3::SimConfig::default()),
            view: RenderView {
                eye: Vec3::new(0.0, 0.0, 10.0),
                target: Vec3::ZERO,
                fov_degrees: 60.0,
            },
        })
        .unwrap()
    }

    fn sphere(name: &str, position: Vec3) -> SceneObject {
        SceneObject::single(
            name,
            Transform::at(position),
            PickBounds::Sphere { radius: 1.0 },
        )
    }

    struct Probe {
        log: Log,
        label: &'static str,
    }

    impl Probe {
        fn new(log: &Log, label: &'static str) -> Self {
            Self {
                log: log.clone(),
                label,
            }
        }
    }

    impl Behavior for Probe {
        fn as_hoverable(&mut self) -> Option<&mut dyn Hoverable> {
            Some(self)
        }
        fn as_clickable(&mut self) -> Option<&mut dyn Clickable> {
            Some(self)
        }
    }

    impl Hoverable for Probe {
        fn on_pointer_enter(&mut self, _ctx: &mut PointerContext<'_>) {
            self.log.borrow_mut().push(format!("enter {}", self.label));
        }
        fn on_pointer_leave(&mut self, _ctx: &mut PointerContext<'_>) {
            self.log.borrow_mut().push(format!("leave {}", self.label));
        }
    }

    impl Clickable for Probe {
        fn on_click(&mut self, hit: &PointerHit, ctx: &mut PointerContext<'_>) {
            self.log
                .borrow_mut()
                .push(format!("click {} d={:.1}", self.label, hit.distance));
            ctx.commands.request_render();
        }
    }

    #[test]
    fn inert_objects_route_nowhere() {
        let mut world = world_3d(FrameloopMode::Continuous);
        world.add_objects(vec![(sphere("rock", Vec3::ZERO), shared(Inert))]);
        assert_eq!(world.scene().len(), 1);
        assert_eq!(world.pointer.interactive_count(), 0);
        assert_eq!(world.physics3d().unwrap().body_count(), 0);
        assert!(world.frame.tickables().is_empty());
    }

    struct FallingBall;

    impl Behavior for FallingBall {
        fn as_physics3d(&mut self) -> Option<&mut dyn PhysicsAttachable3D> {
            Some(self)
        }
    }

    impl PhysicsAttachable3D for FallingBall {
        fn add_physics_3d(&mut self, ctx: &mut physics3d::AttachContext<'_>) {
            let p = ctx.transform().map(|t| t.position).unwrap_or_default();
            ctx.add_body(
                rp3::RigidBodyBuilder::dynamic().translation(rp3::Vector::new(p.x, p.y, p.z)),
                rp3::ColliderBuilder::ball(0.5),
            );
        }
    }

    #[test]
    fn registered_physics_object_gets_exactly_one_body() {
        let mut world = world_3d(FrameloopMode::Continuous);
        let ids = world.add_objects(vec![
            (sphere("ball", Vec3::new(0.0, 5.0, 0.0)), shared(FallingBall)),
            (sphere("rock", Vec3::ZERO), shared(Inert)),
        ]);
        let physics = world.physics3d().unwrap();
        assert_eq!(physics.body_count(), 1);
        assert!(physics.single_body(ids[0]).is_some());
        assert!(physics.single_body(ids[1]).is_none());
    }

    #[test]
    fn advance_steps_physics_and_writes_back() {
        let mut world = world_3d(FrameloopMode::Continuous);
        let ids = world.add_objects(vec![(
            sphere("ball", Vec3::new(0.0, 5.0, 0.0)),
            shared(FallingBall),
        )]);
        world.start();
        for _ in 0..30 {
            assert!(world.advance(SIM_DT));
        }
        assert!(world.scene().transform(ids[0]).unwrap().position.y < 5.0);
        assert_eq!(world.stats().frames, 30);
    }

    #[test]
    fn stopped_world_does_not_advance() {
        let mut world = world_3d(FrameloopMode::Continuous);
        assert!(!world.advance(SIM_DT));
        assert_eq!(world.stats().frames, 0);
    }

    #[test]
    fn identical_runs_hash_identically() {
        let run = || {
            let mut world = world_3d(FrameloopMode::Continuous);
            world.add_objects(vec![(
                sphere("ball", Vec3::new(0.0, 5.0, 0.0)),
                shared(FallingBall),
            )]);
            world.start();
            for _ in 0..60 {
                world.advance(SIM_DT);
            }
            world.state_hash().unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn hover_edges_fire_on_nearest_object_transitions() {
        let log: Log = Rc::default();
        let mut world = world_3d(FrameloopMode::OnDemand);
        let ids = world.add_objects(vec![
            (sphere("a", Vec3::ZERO), shared(Probe::new(&log, "a"))),
            (
                sphere("b", Vec3::new(0.0, 0.0, -4.0)),
                shared(Probe::new(&log, "b")),
            ),
        ]);
        let surface = Vec2::new(100.0, 100.0);

        // Center: a is nearer than b along the same ray.
        world.pointer_moved(Vec2::new(50.0, 50.0), surface);
        // Same object again: no new edges.
        world.pointer_moved(Vec2::new(51.0, 50.0), surface);
        // Off both: leave a.
        world.pointer_moved(Vec2::new(99.0, 99.0), surface);
        // Bring b in front of a, then point back at center: enter b.
        world.scene_mut().transform_mut(ids[1]).unwrap().position = Vec3::new(0.0, 0.0, 4.0);
        world.pointer_moved(Vec2::new(50.0, 50.0), surface);

        assert_eq!(
            log.borrow().as_slice(),
            ["enter a", "leave a", "enter b"]
        );
    }

    #[test]
    fn click_dispatches_to_nearest_hit_and_requests_a_frame() {
        let log: Log = Rc::default();
        let mut world = world_3d(FrameloopMode::OnDemand);
        world.add_objects(vec![
            (sphere("a", Vec3::ZERO), shared(Probe::new(&log, "a"))),
            (
                sphere("b", Vec3::new(0.0, 0.0, 4.0)),
                shared(Probe::new(&log, "b")),
            ),
        ]);
        world.start();

        // Click before any move: the pointer is off-screen, nothing fires.
        world.pointer_clicked();
        assert!(!world.advance(SIM_DT));

        world.pointer_moved(Vec2::new(50.0, 50.0), Vec2::new(100.0, 100.0));
        log.borrow_mut().clear();
        world.pointer_clicked();
        assert_eq!(log.borrow().as_slice(), ["click b d=5.0"]);

        // The handler's render request admits exactly one frame.
        assert!(world.advance(SIM_DT));
        assert!(!world.advance(SIM_DT));
    }

    struct Spinner {
        controls: ControlSet,
        order: Log,
    }

    impl Behavior for Spinner {
        fn as_tickable(&mut self) -> Option<&mut dyn Tickable> {
            Some(self)
        }
        fn as_physics3d(&mut self) -> Option<&mut dyn PhysicsAttachable3D> {
            Some(self)
        }
        fn as_tweakable(&mut self) -> Option<&mut dyn Tweakable> {
            Some(self)
        }
    }

    impl Tickable for Spinner {
        fn tick(&mut self, ctx: &mut TickContext<'_>) {
            self.order.borrow_mut().push("tick".into());
            let speed = match self.controls.get("speed") {
                Some(ControlValue::Scalar(s)) => *s,
                _ => 1.0,
            };
            if let Some(t) = ctx.scene.transform_mut(ctx.object) {
                t.rotation *= Quat::from_rotation_y(speed * ctx.delta);
            }
        }
    }

    impl PhysicsAttachable3D for Spinner {
        fn add_physics_3d(&mut self, ctx: &mut physics3d::AttachContext<'_>) {
            self.order.borrow_mut().push("physics".into());
            let p = ctx.transform().map(|t| t.position).unwrap_or_default();
            ctx.add_body(
                rp3::RigidBodyBuilder::fixed().translation(rp3::Vector::new(p.x, p.y, p.z)),
                rp3::ColliderBuilder::cuboid(0.5, 0.5, 0.5),
            );
        }
    }

    impl Tweakable for Spinner {
        fn update_gui(&mut self, ctx: &mut GuiContext<'_>) {
            self.order.borrow_mut().push("gui".into());
            self.controls
                .insert("speed".into(), ControlValue::Scalar(1.0));
            ctx.add_control(
                "spinner",
                "speed",
                ControlKind::Slider { min: 0.0, max: 5.0 },
            );
        }

        fn control_set(&mut self) -> &mut ControlSet {
            &mut self.controls
        }
    }

    #[test]
    fn batch_init_attaches_physics_before_building_controls() {
        let order: Log = Rc::default();
        let mut world = world_3d(FrameloopMode::OnDemand);
        world.add_objects(vec![(
            sphere("spinner", Vec3::ZERO),
            shared(Spinner {
                controls: ControlSet::new(),
                order: order.clone(),
            }),
        )]);
        assert_eq!(order.borrow().as_slice(), ["physics", "gui"]);
    }

    #[test]
    fn control_write_reaches_the_object_and_admits_one_frame() {
        let order: Log = Rc::default();
        let mut world = world_3d(FrameloopMode::OnDemand);
        world.add_objects(vec![(
            sphere("spinner", Vec3::ZERO),
            shared(Spinner {
                controls: ControlSet::new(),
                order: order.clone(),
            }),
        )]);
        world.start();
        assert!(!world.advance(SIM_DT));

        assert!(world.set_control("spinner", "speed", ControlValue::Scalar(3.0)));
        assert!(world.advance(SIM_DT));
        assert!(!world.advance(SIM_DT));

        // Unknown controls change nothing.
        assert!(!world.set_control("spinner", "nope", ControlValue::Scalar(0.0)));
        assert!(!world.advance(SIM_DT));
    }

    #[test]
    fn group_visibility_toggle_requests_a_frame() {
        let order: Log = Rc::default();
        let mut world = world_3d(FrameloopMode::OnDemand);
        world.add_objects(vec![(
            sphere("spinner", Vec3::ZERO),
            shared(Spinner {
                controls: ControlSet::new(),
                order,
            }),
        )]);
        world.start();

        assert!(world.show_gui_group("spinner", true));
        assert!(world.gui().group("spinner").unwrap().visible);
        assert!(world.advance(SIM_DT));
        assert!(!world.advance(SIM_DT));

        assert!(!world.show_gui_group("missing", true));
        assert!(!world.advance(SIM_DT));
    }

    #[test]
    fn run_while_keeps_on_demand_animation_alive_until_done() {
        let mut world = world_3d(FrameloopMode::OnDemand);
        let ids = world.add_objects(vec![(sphere("cube", Vec3::ZERO), shared(Inert))]);
        let cube = ids[0];
        world.start();

        let mut remaining = 0.5_f32;
        world.run_while(move |ctx| {
            remaining -= ctx.delta;
            if let Some(t) = ctx.scene.transform_mut(cube) {
                t.rotation *= Quat::from_rotation_y(2.0 * ctx.delta);
            }
            if remaining > 0.0 {
                ctx.commands.request_render();
                true
            } else {
                false
            }
        });
        world.request_render();

        let mut frames = 0;
        while world.advance(SIM_DT) {
            frames += 1;
            assert!(frames < 1000);
        }
        // Roughly 0.5s of spin at 60Hz; the exact count depends on f32
        // accumulation of the countdown.
        assert!((29..=31).contains(&frames), "frames = {frames}");
        assert_eq!(world.transient_count(), 0);
        assert_ne!(world.scene().transform(cube).unwrap().rotation, Quat::IDENTITY);
    }

    struct Launcher {
        log: Log,
        armed: bool,
    }

    impl Behavior for Launcher {
        fn as_tickable(&mut self) -> Option<&mut dyn Tickable> {
            Some(self)
        }
    }

    impl Tickable for Launcher {
        fn tick(&mut self, ctx: &mut TickContext<'_>) {
            self.log.borrow_mut().push("tick".into());
            if self.armed {
                self.armed = false;
                let log = self.log.clone();
                ctx.commands.run_while(move |_ctx| {
                    log.borrow_mut().push("transient".into());
                    false
                });
            }
        }
    }

    #[test]
    fn transient_registered_from_a_tick_starts_next_frame() {
        let log: Log = Rc::default();
        let mut world = world_3d(FrameloopMode::Continuous);
        world.add_objects(vec![(
            sphere("launcher", Vec3::ZERO),
            shared(Launcher {
                log: log.clone(),
                armed: true,
            }),
        )]);
        world.start();

        world.advance(SIM_DT);
        assert_eq!(log.borrow().as_slice(), ["tick"]);

        world.advance(SIM_DT);
        assert_eq!(log.borrow().as_slice(), ["tick", "tick", "transient"]);
        assert_eq!(world.transient_count(), 0);
    }

    struct StopSwitch {
        after: u32,
    }

    impl Behavior for StopSwitch {
        fn as_tickable(&mut self) -> Option<&mut dyn Tickable> {
            Some(self)
        }
    }

    impl Tickable for StopSwitch {
        fn tick(&mut self, ctx: &mut TickContext<'_>) {
            if self.after == 0 {
                ctx.commands.request_stop();
            } else {
                self.after -= 1;
            }
        }
    }

    #[test]
    fn stopping_from_inside_a_tick_halts_after_the_frame() {
        let mut world = world_3d(FrameloopMode::Continuous);
        world.add_objects(vec![(
            sphere("switch", Vec3::ZERO),
            shared(StopSwitch { after: 2 }),
        )]);
        world.start();

        assert!(world.advance(SIM_DT));
        assert!(world.advance(SIM_DT));
        // Third tick requests the stop; its own frame still completes.
        assert!(world.advance(SIM_DT));
        assert!(!world.is_running());
        assert!(!world.advance(SIM_DT));
        assert_eq!(world.stats().frames, 3);
    }
}
