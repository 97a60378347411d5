//! Pointer picking: tracks the cursor in normalized device coordinates
//! and casts rays against the registered interactive objects.
//!
//! # Invariants
//! - Before the first pointer move, the stored NDC sits outside the
//!   valid range and every cast returns no hits.
//! - Hits come back nearest-first; dispatch targets `hits[0]` only.
//! - Picking uses the same view-projection as rendering, so what the
//!   pointer hits is what the camera shows.

use glam::{Mat4, Vec2, Vec3};
use tableau_common::{InstanceId, ObjectId, Transform};
use tableau_render::{Ray, RenderView};
use tableau_scene::{PickBounds, Scene, SceneNode};

/// A single ray-object intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerHit {
    pub object: ObjectId,
    /// Which instance slot was hit, for instanced objects.
    pub instance: Option<InstanceId>,
    /// World distance along the ray.
    pub distance: f32,
    /// World-space intersection point.
    pub point: Vec3,
}

/// Pointer state and the interactive-object list.
pub struct Pointer {
    ndc: Vec2,
    surface: Vec2,
    interactive: Vec<ObjectId>,
    hovered: Option<(ObjectId, Option<InstanceId>)>,
}

impl Pointer {
    pub fn new() -> Self {
        Self {
            // Off-screen sentinel: no hits until the first real move.
            ndc: Vec2::splat(2.0),
            surface: Vec2::new(1.0, 1.0),
            interactive: Vec::new(),
            hovered: None,
        }
    }

    pub fn ndc(&self) -> Vec2 {
        self.ndc
    }

    pub(crate) fn register(&mut self, id: ObjectId) {
        self.interactive.push(id);
    }

    pub fn interactive_count(&self) -> usize {
        self.interactive.len()
    }

    /// Recompute NDC from a pointer offset within the render surface.
    pub fn set_position(&mut self, offset: Vec2, surface: Vec2) {
        if surface.x <= 0.0 || surface.y <= 0.0 {
            return;
        }
        self.surface = surface;
        self.ndc = Vec2::new(
            offset.x / surface.x * 2.0 - 1.0,
            -(offset.y / surface.y * 2.0 - 1.0),
        );
    }

    pub(crate) fn hovered(&self) -> Option<(ObjectId, Option<InstanceId>)> {
        self.hovered
    }

    pub(crate) fn set_hovered(&mut self, hovered: Option<(ObjectId, Option<InstanceId>)>) {
        self.hovered = hovered;
    }

    /// Cast the current pointer ray against every interactive object.
    /// Hits are sorted nearest-first.
    pub fn cast_ray(&self, scene: &Scene, view: &RenderView) -> Vec<PointerHit> {
        if self.ndc.x.abs() > 1.0 || self.ndc.y.abs() > 1.0 {
            return Vec::new();
        }
        let aspect = self.surface.x / self.surface.y;
        let ray = view.ray_through(self.ndc, aspect);

        let mut hits = Vec::new();
        for &id in &self.interactive {
            let Some(object) = scene.get(id) else {
                continue;
            };
            match &object.node {
                SceneNode::Single(transform) => {
                    if let Some(t) = intersect(&ray, object.bounds, transform) {
                        hits.push(PointerHit {
                            object: id,
                            instance: None,
                            distance: t,
                            point: ray.point_at(t),
                        });
                    }
                }
                SceneNode::Instanced(instances) => {
                    for instance in instances {
                        if let Some(t) = intersect(&ray, object.bounds, &instance.transform) {
                            hits.push(PointerHit {
                                object: id,
                                instance: Some(instance.id),
                                distance: t,
                                point: ray.point_at(t),
                            });
                        }
                    }
                }
            }
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

impl Default for Pointer {
    fn default() -> Self {
        Self::new()
    }
}

/// Ray-bounds test in the object's local space. The ray parameter is
/// preserved under the affine transform, so the returned `t` is still
/// world distance along the unit world ray.
fn intersect(ray: &Ray, bounds: PickBounds, transform: &Transform) -> Option<f32> {
    let local =
        Mat4::from_scale_rotation_translation(transform.scale, transform.rotation, transform.position)
            .inverse();
    let origin = local.transform_point3(ray.origin);
    let dir = local.transform_vector3(ray.dir);
    match bounds {
        PickBounds::Sphere { radius } => ray_sphere(origin, dir, radius),
        PickBounds::Cuboid { half_extents } => ray_cuboid(origin, dir, half_extents),
    }
}

fn ray_sphere(origin: Vec3, dir: Vec3, radius: f32) -> Option<f32> {
    let a = dir.dot(dir);
    let b = 2.0 * origin.dot(dir);
    let c = origin.dot(origin) - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let sqrt = disc.sqrt();
    let t0 = (-b - sqrt) / (2.0 * a);
    let t1 = (-b + sqrt) / (2.0 * a);
    if t0 >= 0.0 {
        Some(t0)
    } else if t1 >= 0.0 {
        Some(t1)
    } else {
        None
    }
}

fn ray_cuboid(origin: Vec3, dir: Vec3, half: Vec3) -> Option<f32> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        if dir[axis].abs() < 1e-8 {
            if origin[axis].abs() > half[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir[axis];
        let mut t0 = (-half[axis] - origin[axis]) * inv;
        let mut t1 = (half[axis] - origin[axis]) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }
    if t_min >= 0.0 {
        Some(t_min)
    } else if t_max >= 0.0 {
        Some(t_max)
    } else {
        None
    }
}
