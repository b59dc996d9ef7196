//! Perspective camera used to turn pointer input into world positions
//!
//! Rendering itself happens elsewhere; the core only needs the camera's
//! projection to unproject normalized device coordinates (NDC).

use glam::{Mat4, Vec2, Vec3};

use crate::picking::Ray;

/// What the drag controller needs from a camera.
pub trait CameraView {
    /// Maps an NDC point (x and y in `[-1, 1]`, z in `[0, 1]`) to world space.
    fn unproject(&self, ndc: Vec3) -> Vec3;
    /// World position of the eye.
    fn position(&self) -> Vec3;
}

/// Simple look-at camera
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// Camera position
    pub eye: Vec3,
    /// Point the camera looks at
    pub target: Vec3,
    /// Up vector
    pub up: Vec3,
    /// Render target aspect ratio
    pub aspect: f32,
    /// Field of view in radians
    pub fovy: f32,
    /// Near clipping plane distance
    pub znear: f32,
    /// Far clipping plane distance
    pub zfar: f32,
}

impl Camera {
    /// Camera framing the card row: 14 units back, 25 degree field of view.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 14.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: aspect_ratio(width, height),
            fovy: 25.0f32.to_radians(),
            znear: 0.1,
            zfar: 100.0,
        }
    }

    /// Update aspect ratio when the viewport is resized
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    #[must_use]
    pub fn build_view_projection_matrix(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let proj = Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }

    /// Maps a world point to NDC.
    #[must_use]
    pub fn project(&self, world: Vec3) -> Vec3 {
        self.build_view_projection_matrix().project_point3(world)
    }

    /// Ray from the near plane through the pointer.
    #[must_use]
    pub fn ray(&self, ndc: Vec2) -> Ray {
        let near = self.unproject(ndc.extend(0.0));
        let far = self.unproject(ndc.extend(1.0));
        Ray::new(near, far - near)
    }
}

impl CameraView for Camera {
    fn unproject(&self, ndc: Vec3) -> Vec3 {
        self.build_view_projection_matrix().inverse().project_point3(ndc)
    }

    fn position(&self) -> Vec3 {
        self.eye
    }
}

#[allow(clippy::cast_precision_loss)]
fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}
