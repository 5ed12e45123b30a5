//! Perspective camera looking at the particle field.

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Fixed perspective camera on the +Z axis, looking toward the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World position of the eye.
    pub position: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Width over height of the render surface.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Create the default backdrop camera for the given aspect ratio.
    pub fn new(aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            fov_y_degrees: 75.0,
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Update the aspect ratio after a resize. Zero-sized surfaces are ignored.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, Vec3::NEG_Z, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Map a point in normalized device coordinates back to world space.
    ///
    /// `depth` is in wgpu's clip range, 0.0 at the near plane and 1.0 at the far plane.
    pub fn unproject(&self, ndc: Vec2, depth: f32) -> Vec3 {
        let inverse = self.view_proj().inverse();
        let world = inverse * Vec4::new(ndc.x, ndc.y, depth, 1.0);
        world.truncate() / world.w
    }

    /// Intersect the pointer ray through `ndc` with the plane `z = plane_z`.
    ///
    /// Returns `None` if the ray is parallel to the plane or the plane is behind the eye.
    pub fn ray_to_plane_z(&self, ndc: Vec2, plane_z: f32) -> Option<Vec3> {
        let through = self.unproject(ndc, 0.5);
        let dir = (through - self.position).normalize_or_zero();
        if dir.z.abs() < f32::EPSILON {
            return None;
        }
        let distance = (plane_z - self.position.z) / dir.z;
        if distance <= 0.0 {
            return None;
        }
        Some(self.position + dir * distance)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}
