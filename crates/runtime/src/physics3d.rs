//! Spatial physics synchronization: the [`tableau_sim::dim3`]
//! counterpart of [`crate::physics2d`]. Same fixed frame order, same
//! bookkeeping; poses carry full 3D rotation.

use std::collections::BTreeMap;
use std::sync::Mutex;

use rapier3d::prelude as rp;
use tableau_common::{BodyId, ObjectId, Transform};
use tableau_scene::{Instance, Scene, SceneNode};
use tableau_sim::SimError;
use tableau_sim::dim3::{SimConfig, SimWorld};

use crate::behavior::BehaviorMap;
use crate::physics::{
    BodyHandle, ColliderKey, ContactParticipant, EventInterests, PhysicsBody, SleepEdge, sleep_edge,
};

fn body_handle(handle: rp::RigidBodyHandle) -> BodyHandle {
    let (index, generation) = handle.into_raw_parts();
    BodyHandle { index, generation }
}

fn raw_body(handle: BodyHandle) -> rp::RigidBodyHandle {
    rp::RigidBodyHandle::from_raw_parts(handle.index, handle.generation)
}

fn collider_key(handle: rp::ColliderHandle) -> ColliderKey {
    let (index, generation) = handle.into_raw_parts();
    ColliderKey { index, generation }
}

fn raw_collider(key: ColliderKey) -> rp::ColliderHandle {
    rp::ColliderHandle::from_raw_parts(key.index, key.generation)
}

/// Collects the step's collision begin/end pairs off the pipeline.
#[derive(Default)]
struct EventCollector {
    events: Mutex<Vec<(rp::ColliderHandle, rp::ColliderHandle, bool)>>,
}

impl EventCollector {
    fn drain(&self) -> Vec<(rp::ColliderHandle, rp::ColliderHandle, bool)> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(_) => Vec::new(),
        }
    }
}

impl rp::EventHandler for EventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &rp::RigidBodySet,
        _colliders: &rp::ColliderSet,
        event: rp::CollisionEvent,
        _contact_pair: Option<&rp::ContactPair>,
    ) {
        if let Ok(mut events) = self.events.lock() {
            events.push((event.collider1(), event.collider2(), event.started()));
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: rp::Real,
        _bodies: &rp::RigidBodySet,
        _colliders: &rp::ColliderSet,
        _contact_pair: &rp::ContactPair,
        _total_force_magnitude: rp::Real,
    ) {
    }
}

/// The spatial synchronization layer.
pub struct Physics3D {
    sim: SimWorld,
    events: EventCollector,
    pending: Vec<ObjectId>,
    single_bodies: BTreeMap<ObjectId, PhysicsBody>,
    instanced_bodies: BTreeMap<ObjectId, Vec<PhysicsBody>>,
    sleep_wake: Vec<ObjectId>,
    collisions: Vec<ObjectId>,
    contacts: Vec<ObjectId>,
}

impl Physics3D {
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        Ok(Self {
            sim: SimWorld::new(config)?,
            events: EventCollector::default(),
            pending: Vec::new(),
            single_bodies: BTreeMap::new(),
            instanced_bodies: BTreeMap::new(),
            sleep_wake: Vec::new(),
            collisions: Vec::new(),
            contacts: Vec::new(),
        })
    }

    pub fn sim(&self) -> &SimWorld {
        &self.sim
    }

    pub fn state_hash(&self) -> u64 {
        self.sim.state_hash()
    }

    pub fn single_body(&self, id: ObjectId) -> Option<&PhysicsBody> {
        self.single_bodies.get(&id)
    }

    /// Index-aligned with the object's instance array.
    pub fn instance_bodies(&self, id: ObjectId) -> Option<&[PhysicsBody]> {
        self.instanced_bodies.get(&id).map(Vec::as_slice)
    }

    pub fn body_count(&self) -> usize {
        self.single_bodies.len()
            + self
                .instanced_bodies
                .values()
                .map(Vec::len)
                .sum::<usize>()
    }

    pub(crate) fn enqueue(&mut self, id: ObjectId, interests: EventInterests) {
        self.pending.push(id);
        if interests.sleep_wake {
            self.sleep_wake.push(id);
        }
        if interests.collisions {
            self.collisions.push(id);
        }
        if interests.contacts {
            self.contacts.push(id);
        }
    }

    /// Builds bodies for every queued object. Each object attaches once.
    pub(crate) fn init(&mut self, behaviors: &BehaviorMap, scene: &Scene) {
        for id in std::mem::take(&mut self.pending) {
            let Some(behavior) = behaviors.get(&id).cloned() else {
                continue;
            };
            let mut behavior = behavior.borrow_mut();
            let Some(attachable) = behavior.as_physics3d() else {
                continue;
            };
            let Some(object) = scene.get(id) else {
                continue;
            };

            let mut ctx = AttachContext {
                sim: &mut self.sim,
                node: &object.node,
                object: id,
                single: &mut self.single_bodies,
                instanced: &mut self.instanced_bodies,
            };
            attachable.add_physics_3d(&mut ctx);

            if let Some(bodies) = self.instanced_bodies.get(&id) {
                let slots = object.node.instances().len();
                if bodies.len() != slots {
                    tracing::warn!(
                        object = %id.0,
                        bodies = bodies.len(),
                        slots,
                        "instance body list out of step with instance array"
                    );
                }
            }
        }
    }

    /// One full frame of physics work.
    pub(crate) fn update(&mut self, scene: &mut Scene, behaviors: &BehaviorMap) {
        self.step_sim();
        self.write_back(scene);
        self.handle_sleep_and_wake(behaviors);
        self.handle_collisions(behaviors);
        self.handle_contacts_with(behaviors);
    }

    pub(crate) fn step_sim(&mut self) {
        self.sim.step(&self.events);
    }

    /// Copies simulation poses into render transforms.
    pub(crate) fn write_back(&self, scene: &mut Scene) {
        for (&id, body) in &self.single_bodies {
            let Some(rb) = self.sim.get_rigid_body(raw_body(body.rigid_body)) else {
                continue;
            };
            if rb.is_fixed() {
                continue;
            }
            let Some(transform) = scene.transform_mut(id) else {
                continue;
            };
            write_pose(transform, rb);
        }

        for (&id, bodies) in &self.instanced_bodies {
            let Some(object) = scene.get_mut(id) else {
                continue;
            };
            let instances = object.node.instances_mut();
            for (slot, body) in bodies.iter().enumerate() {
                let Some(rb) = self.sim.get_rigid_body(raw_body(body.rigid_body)) else {
                    continue;
                };
                if rb.is_fixed() {
                    continue;
                }
                let Some(instance) = instances.get_mut(slot) else {
                    continue;
                };
                write_pose(&mut instance.transform, rb);
            }
        }
    }

    pub(crate) fn handle_sleep_and_wake(&mut self, behaviors: &BehaviorMap) {
        for id in self.sleep_wake.clone() {
            if let Some(body) = self.single_bodies.get_mut(&id) {
                if let Some(rb) = self.sim.get_rigid_body(raw_body(body.rigid_body)) {
                    if let Some(edge) = sleep_edge(&mut body.is_sleeping, rb.is_sleeping()) {
                        let snapshot = *body;
                        dispatch_sleep(behaviors, id, snapshot, edge);
                    }
                }
            }
            if let Some(bodies) = self.instanced_bodies.get_mut(&id) {
                let mut edges = Vec::new();
                for body in bodies.iter_mut() {
                    if let Some(rb) = self.sim.get_rigid_body(raw_body(body.rigid_body)) {
                        if let Some(edge) = sleep_edge(&mut body.is_sleeping, rb.is_sleeping()) {
                            edges.push((*body, edge));
                        }
                    }
                }
                for (body, edge) in edges {
                    dispatch_sleep(behaviors, id, body, edge);
                }
            }
        }
    }

    pub(crate) fn handle_collisions(&mut self, behaviors: &BehaviorMap) {
        for (h1, h2, started) in self.events.drain() {
            for &id in &self.collisions {
                for own in self.bodies_of(id) {
                    let own_collider = raw_collider(own.collider);
                    if own_collider != h1 && own_collider != h2 {
                        continue;
                    }
                    let other_handle = if own_collider == h1 { h2 } else { h1 };
                    let Some(other) = self.participant(other_handle) else {
                        continue;
                    };
                    dispatch_collision(behaviors, id, own, other, started);
                }
            }
        }
    }

    /// Polls the narrow phase for every body currently touching a
    /// registered object's bodies.
    pub(crate) fn handle_contacts_with(&self, behaviors: &BehaviorMap) {
        for &id in &self.contacts {
            for own in self.bodies_of(id) {
                let own_collider = raw_collider(own.collider);
                let touching: Vec<rp::ColliderHandle> = self
                    .sim
                    .narrow_phase
                    .contact_pairs_with(own_collider)
                    .filter(|pair| pair.has_any_active_contact())
                    .map(|pair| {
                        if pair.collider1 == own_collider {
                            pair.collider2
                        } else {
                            pair.collider1
                        }
                    })
                    .collect();
                for other_handle in touching {
                    let Some(other) = self.participant(other_handle) else {
                        continue;
                    };
                    dispatch_contact(behaviors, id, own, other);
                }
            }
        }
    }

    fn bodies_of(&self, id: ObjectId) -> Vec<PhysicsBody> {
        let mut out = Vec::new();
        if let Some(body) = self.single_bodies.get(&id) {
            out.push(*body);
        }
        if let Some(bodies) = self.instanced_bodies.get(&id) {
            out.extend(bodies.iter().copied());
        }
        out
    }

    /// Resolves a collider back to a registered participant through the
    /// parent body's `user_data`.
    fn participant(&self, collider: rp::ColliderHandle) -> Option<ContactParticipant> {
        let col = self.sim.get_collider(collider)?;
        let parent = col.parent()?;
        let rb = self.sim.get_rigid_body(parent)?;
        let id = BodyId::from_user_data(rb.user_data)?;
        Some(ContactParticipant {
            id,
            body: body_handle(parent),
            collider: collider_key(collider),
        })
    }
}

fn write_pose(transform: &mut Transform, rb: &rp::RigidBody) {
    let pos = rb.translation();
    transform.position = glam::Vec3::new(pos.x, pos.y, pos.z);
    let rot = rb.rotation();
    transform.rotation = glam::Quat::from_xyzw(rot.x, rot.y, rot.z, rot.w);
}

fn dispatch_sleep(behaviors: &BehaviorMap, id: ObjectId, body: PhysicsBody, edge: SleepEdge) {
    let Some(behavior) = behaviors.get(&id).cloned() else {
        return;
    };
    let mut behavior = behavior.borrow_mut();
    let Some(handler) = behavior.as_sleep_handler() else {
        return;
    };
    match edge {
        SleepEdge::FellAsleep => handler.on_sleep(&body),
        SleepEdge::WokeUp => handler.on_wake(&body),
    }
}

fn dispatch_collision(
    behaviors: &BehaviorMap,
    id: ObjectId,
    own: PhysicsBody,
    other: ContactParticipant,
    started: bool,
) {
    let Some(behavior) = behaviors.get(&id).cloned() else {
        return;
    };
    let mut behavior = behavior.borrow_mut();
    let Some(handler) = behavior.as_collision_handler() else {
        return;
    };
    if started {
        handler.on_collision_enter(&own, &other);
    } else {
        handler.on_collision_exit(&own, &other);
    }
}

fn dispatch_contact(
    behaviors: &BehaviorMap,
    id: ObjectId,
    own: PhysicsBody,
    other: ContactParticipant,
) {
    let Some(behavior) = behaviors.get(&id).cloned() else {
        return;
    };
    let mut behavior = behavior.borrow_mut();
    let Some(handler) = behavior.as_contact_handler() else {
        return;
    };
    handler.on_contacts_with(&own, &other);
}

/// Body-construction context handed to `add_physics_3d` hooks, scoped
/// to one object.
pub struct AttachContext<'a> {
    sim: &'a mut SimWorld,
    node: &'a SceneNode,
    object: ObjectId,
    single: &'a mut BTreeMap<ObjectId, PhysicsBody>,
    instanced: &'a mut BTreeMap<ObjectId, Vec<PhysicsBody>>,
}

impl AttachContext<'_> {
    pub fn object_id(&self) -> ObjectId {
        self.object
    }

    /// The authored transform of a `Single` object.
    pub fn transform(&self) -> Option<&Transform> {
        self.node.transform()
    }

    pub fn instance_count(&self) -> usize {
        self.node.instances().len()
    }

    pub fn instance(&self, index: usize) -> Option<Instance> {
        self.node.instances().get(index).copied()
    }

    /// Builds and registers the body of a `Single` object.
    pub fn add_body(
        &mut self,
        body: rp::RigidBodyBuilder,
        collider: rp::ColliderBuilder,
    ) -> PhysicsBody {
        let entry = insert_body(self.sim, body, collider);
        self.single.insert(self.object, entry);
        entry
    }

    /// Builds and registers the body for the next instance slot. Call
    /// once per slot, in slot order.
    pub fn add_instance_body(
        &mut self,
        body: rp::RigidBodyBuilder,
        collider: rp::ColliderBuilder,
    ) -> PhysicsBody {
        let entry = insert_body(self.sim, body, collider);
        self.instanced.entry(self.object).or_default().push(entry);
        entry
    }
}

fn insert_body(
    sim: &mut SimWorld,
    body: rp::RigidBodyBuilder,
    collider: rp::ColliderBuilder,
) -> PhysicsBody {
    let id = BodyId::new();
    let handle = sim.add_rigid_body(body.user_data(id.as_u128()).build());
    let collider_handle = sim.add_collider(
        collider
            .active_events(rp::ActiveEvents::COLLISION_EVENTS)
            .build(),
        handle,
    );
    PhysicsBody {
        id,
        rigid_body: body_handle(handle),
        collider: collider_key(collider_handle),
        is_sleeping: None,
    }
}
