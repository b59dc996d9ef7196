//! # World Builder
//!
//! Validation and insertion of bodies and joints.

use crate::body::{Joint, RigidBody};
use crate::error::PhysicsError;
use crate::types::{BodyDesc, JointDesc, JointKind, Shape};
use crate::{BodyHandle, JointHandle, World};

impl World {
    pub(crate) fn insert_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError> {
        if let Some(limit) = self.config.max_bodies {
            if self.bodies.len() >= limit {
                tracing::warn!("Body allocation refused: capacity {limit} reached");
                return Err(PhysicsError::BodyCapacity { limit });
            }
        }
        validate_body(desc)?;
        let handle = BodyHandle(self.bodies.insert(RigidBody::from_desc(desc)));
        self.stats.created_bodies += 1;
        tracing::trace!("Created {handle} ({:?}) at {:?}", desc.mode, desc.position);
        Ok(handle)
    }

    pub(crate) fn insert_joint(&mut self, desc: &JointDesc) -> Result<JointHandle, PhysicsError> {
        if let Some(limit) = self.config.max_joints {
            if self.joints.len() >= limit {
                tracing::warn!("Joint allocation refused: capacity {limit} reached");
                return Err(PhysicsError::JointCapacity { limit });
            }
        }
        if desc.body_a == desc.body_b {
            return Err(PhysicsError::SelfJoint(desc.body_a));
        }
        if self.bodies.get(desc.body_a.0).is_none() {
            return Err(PhysicsError::StaleBody(desc.body_a));
        }
        if self.bodies.get(desc.body_b.0).is_none() {
            return Err(PhysicsError::StaleBody(desc.body_b));
        }
        if let JointKind::Rope { max_distance } = desc.kind {
            if !(max_distance.is_finite() && max_distance >= 0.0) {
                return Err(PhysicsError::InvalidDescription("rope length must be finite and non-negative"));
            }
        }
        if !(desc.anchor_a.is_finite() && desc.anchor_b.is_finite()) {
            return Err(PhysicsError::InvalidDescription("joint anchors must be finite"));
        }
        let handle = JointHandle(self.joints.insert(Joint {
            kind: desc.kind,
            body_a: desc.body_a,
            body_b: desc.body_b,
            anchor_a: desc.anchor_a,
            anchor_b: desc.anchor_b,
        }));
        self.stats.created_joints += 1;
        Ok(handle)
    }
}

fn validate_body(desc: &BodyDesc) -> Result<(), PhysicsError> {
    if !(desc.position.is_finite() && desc.rotation.is_finite()) {
        return Err(PhysicsError::InvalidDescription("body pose must be finite"));
    }
    if !(desc.mass.is_finite() && desc.mass > 0.0) {
        return Err(PhysicsError::InvalidDescription("body mass must be positive"));
    }
    if desc.linear_damping < 0.0 || desc.angular_damping < 0.0 {
        return Err(PhysicsError::InvalidDescription("damping must be non-negative"));
    }
    match desc.shape {
        Shape::Ball { radius } if !(radius.is_finite() && radius > 0.0) => {
            Err(PhysicsError::InvalidDescription("ball radius must be positive"))
        }
        Shape::Cuboid { half_extents } if !(half_extents.is_finite() && half_extents.min_element() >= 0.0) => {
            Err(PhysicsError::InvalidDescription("cuboid extents must be non-negative"))
        }
        _ => Ok(()),
    }
}
