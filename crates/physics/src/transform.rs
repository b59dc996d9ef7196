//! Model matrices for bodies
//!
//! Converts the physics pose (position + quaternion) into the column-major
//! 4x4 matrices a renderer consumes.

use glam::{Mat4, Quat, Vec3};

use crate::types::BodyState;

/// Column-major rigid transform: rotate, then translate.
#[must_use]
pub fn to_transform_matrix(position: Vec3, rotation: Quat) -> [[f32; 4]; 4] {
    Mat4::from_rotation_translation(rotation, position).to_cols_array_2d()
}

impl BodyState {
    #[must_use]
    pub fn transform_matrix(&self) -> [[f32; 4]; 4] {
        to_transform_matrix(self.position, self.rotation)
    }
}
