//! GPU-compatible frame output
//!
//! Plain `Pod` structs a renderer can upload as-is with
//! `bytemuck::cast_slice`.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::chain::BodyTransform;

/// One rope polyline vertex, padded to 16 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CurveVertex {
    pub position: [f32; 3],
    pub _pad: f32,
}

impl From<Vec3> for CurveVertex {
    fn from(position: Vec3) -> Self {
        Self {
            position: position.to_array(),
            _pad: 0.0,
        }
    }
}

/// Model matrix of one body mesh.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct BodyInstance {
    pub transform: [[f32; 4]; 4],
}

impl From<&BodyTransform> for BodyInstance {
    fn from(body: &BodyTransform) -> Self {
        Self {
            transform: physics::transform::to_transform_matrix(body.position, body.rotation),
        }
    }
}
