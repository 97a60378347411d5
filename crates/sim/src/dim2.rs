//! Planar simulation world on rapier2d.

use rapier2d::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::{SIM_DT, SimError, hash_f32};

/// Configuration for a planar simulation world.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Gravity in world units per second squared.
    pub gravity: glam::Vec2,
    /// Fixed timestep in seconds.
    pub dt: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: glam::Vec2::new(0.0, -9.81),
            dt: SIM_DT,
        }
    }
}

/// A planar rigid-body world wrapping the full rapier2d pipeline state.
pub struct SimWorld {
    pub rigid_bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joints: ImpulseJointSet,
    pub multibody_joints: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub gravity: Vector,
    pub frame: u64,
}

impl fmt::Debug for SimWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimWorld")
            .field("frame", &self.frame)
            .field("rigid_body_count", &self.rigid_bodies.len())
            .field("collider_count", &self.colliders.len())
            .field("gravity", &self.gravity)
            .finish_non_exhaustive()
    }
}

impl SimWorld {
    /// Creates a planar world. Fails on a non-finite gravity vector or a
    /// non-positive timestep rather than running a broken simulation.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        if !config.gravity.is_finite() {
            return Err(SimError::NonFiniteGravity);
        }
        if !(config.dt.is_finite() && config.dt > 0.0) {
            return Err(SimError::InvalidTimestep(config.dt));
        }

        let integration_parameters = IntegrationParameters {
            dt: config.dt,
            ..Default::default()
        };

        Ok(Self {
            rigid_bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            gravity: Vector::new(config.gravity.x, config.gravity.y),
            frame: 0,
        })
    }

    /// Advances the simulation by one fixed timestep, forwarding
    /// collision events into the caller's collector.
    pub fn step(&mut self, events: &dyn EventHandler) {
        self.physics_pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            events,
        );
        self.frame += 1;
    }

    /// Adds a rigid body and returns its handle.
    pub fn add_rigid_body(&mut self, rigid_body: RigidBody) -> RigidBodyHandle {
        self.rigid_bodies.insert(rigid_body)
    }

    /// Adds a collider attached to a rigid body.
    pub fn add_collider(&mut self, collider: Collider, parent: RigidBodyHandle) -> ColliderHandle {
        self.colliders
            .insert_with_parent(collider, parent, &mut self.rigid_bodies)
    }

    /// Removes a rigid body and its attached colliders.
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_bodies.get(handle)
    }

    pub fn get_rigid_body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_bodies.get_mut(handle)
    }

    pub fn get_collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.get(handle)
    }

    /// Deterministic hash of the current simulation state.
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.frame.hash(&mut hasher);

        for (handle, body) in self.rigid_bodies.iter() {
            let (index, generation) = handle.into_raw_parts();
            index.hash(&mut hasher);
            generation.hash(&mut hasher);

            let pos = body.translation();
            hash_f32(pos.x, &mut hasher);
            hash_f32(pos.y, &mut hasher);
            hash_f32(body.rotation().angle(), &mut hasher);

            let linvel = body.linvel();
            hash_f32(linvel.x, &mut hasher);
            hash_f32(linvel.y, &mut hasher);
            hash_f32(body.angvel(), &mut hasher);
        }

        hasher.finish()
    }
}
