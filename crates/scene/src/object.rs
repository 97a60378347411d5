use glam::Vec3;
use serde::{Deserialize, Serialize};
use tableau_common::{InstanceId, Transform};

/// Per-slot data of an instanced object: one logical copy inside a
/// shared draw batch, with its own transform and render color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: InstanceId,
    pub transform: Transform,
    pub color: [f32; 3],
}

impl Instance {
    pub fn new(transform: Transform) -> Self {
        Self {
            id: InstanceId::new(),
            transform,
            color: [1.0, 1.0, 1.0],
        }
    }

    pub fn with_color(transform: Transform, color: [f32; 3]) -> Self {
        Self {
            id: InstanceId::new(),
            transform,
            color,
        }
    }
}

/// Object-local bounds used for CPU ray picking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PickBounds {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3 },
}

impl Default for PickBounds {
    fn default() -> Self {
        Self::Cuboid {
            half_extents: Vec3::splat(0.5),
        }
    }
}

/// The renderable payload of a scene object.
///
/// `Single` is one transform and one draw; `Instanced` is N logical
/// copies sharing one draw call, each with its own transform. Exhaustive
/// matching on this enum is what keeps physics write-back and pointer
/// picking honest about the two shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneNode {
    Single(Transform),
    Instanced(Vec<Instance>),
}

impl SceneNode {
    /// The transform for a `Single` node.
    pub fn transform(&self) -> Option<&Transform> {
        match self {
            Self::Single(t) => Some(t),
            Self::Instanced(_) => None,
        }
    }

    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        match self {
            Self::Single(t) => Some(t),
            Self::Instanced(_) => None,
        }
    }

    /// The instance array for an `Instanced` node; empty for `Single`.
    pub fn instances(&self) -> &[Instance] {
        match self {
            Self::Single(_) => &[],
            Self::Instanced(list) => list,
        }
    }

    pub fn instances_mut(&mut self) -> &mut [Instance] {
        match self {
            Self::Single(_) => &mut [],
            Self::Instanced(list) => list,
        }
    }
}

/// A renderable entity owned by the scene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Human-readable label, used by debug rendering and GUI groups.
    pub name: String,
    pub node: SceneNode,
    pub bounds: PickBounds,
}

impl SceneObject {
    pub fn single(name: impl Into<String>, transform: Transform, bounds: PickBounds) -> Self {
        Self {
            name: name.into(),
            node: SceneNode::Single(transform),
            bounds,
        }
    }

    pub fn instanced(
        name: impl Into<String>,
        instances: Vec<Instance>,
        bounds: PickBounds,
    ) -> Self {
        Self {
            name: name.into(),
            node: SceneNode::Instanced(instances),
            bounds,
        }
    }
}
