use glam::{Mat4, Vec2, Vec3};

/// Near/far planes shared by rendering and picking.
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 1000.0;

/// Camera/view configuration for rendering and picking.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 10.0, 10.0),
            target: Vec3::ZERO,
            fov_degrees: 60.0,
        }
    }
}

impl RenderView {
    /// Combined view-projection matrix for the given aspect ratio.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, Vec3::Y);
        let proj = Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, Z_NEAR, Z_FAR);
        proj * view
    }

    /// World-space ray through a normalized-device-coordinate point,
    /// for pointer picking. `ndc` is in [-1, 1] on both axes with +y up.
    /// The ray originates at the camera, so hit parameters are distances
    /// from the eye.
    pub fn ray_through(&self, ndc: Vec2, aspect: f32) -> Ray {
        let inverse = self.view_projection(aspect).inverse();
        let far = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray {
            origin: self.eye,
            dir: (far - self.eye).normalize(),
        }
    }
}

/// A world-space half-line used for picking.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub dir: Vec3,
}

impl Ray {
    /// The point at parameter `t` (world distance, since `dir` is unit).
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}
