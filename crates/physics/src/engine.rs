use glam::{Quat, Vec3};

use crate::error::PhysicsError;
use crate::types::{BodyDesc, BodyState, JointDesc, MotionMode};
use crate::{BodyHandle, JointHandle};

/// The surface a chain needs from a rigid-body engine.
///
/// Every call goes through an opaque handle. A handle whose entry was
/// destroyed yields [`PhysicsError::StaleBody`] or
/// [`PhysicsError::StaleJoint`] instead of touching whatever now occupies the
/// slot.
pub trait PhysicsEngine {
    /// Allocates a body.
    ///
    /// # Errors
    /// Returns an error if the description is invalid or the engine is full.
    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError>;

    /// Allocates a joint between two live bodies.
    ///
    /// # Errors
    /// Returns an error if either body is stale, both are the same body, or
    /// the engine is full.
    fn create_joint(&mut self, desc: &JointDesc) -> Result<JointHandle, PhysicsError>;

    /// # Errors
    /// Returns [`PhysicsError::StaleBody`] if the body was already released.
    fn destroy_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError>;

    /// # Errors
    /// Returns [`PhysicsError::StaleJoint`] if the joint was already released.
    fn destroy_joint(&mut self, handle: JointHandle) -> Result<(), PhysicsError>;

    /// # Errors
    /// Returns [`PhysicsError::StaleBody`] for a released body.
    fn wake(&mut self, handle: BodyHandle) -> Result<(), PhysicsError>;

    /// Switches a body between motion modes. Takes effect on the next step.
    ///
    /// # Errors
    /// Returns [`PhysicsError::StaleBody`] for a released body.
    fn set_motion_mode(&mut self, handle: BodyHandle, mode: MotionMode) -> Result<(), PhysicsError>;

    /// Sets the translation a kinematic body reaches by the end of the next step.
    ///
    /// # Errors
    /// Returns [`PhysicsError::NotKinematic`] unless the body is in
    /// [`MotionMode::KinematicTarget`].
    fn set_kinematic_target(&mut self, handle: BodyHandle, position: Vec3) -> Result<(), PhysicsError>;

    /// Overwrites the angular velocity of a [`MotionMode::Dynamic`] body.
    ///
    /// Kinematic and fixed bodies keep their current angular velocity and the
    /// call succeeds without effect.
    ///
    /// # Errors
    /// Returns [`PhysicsError::StaleBody`] for a released body.
    fn set_angular_velocity(&mut self, handle: BodyHandle, angular_velocity: Vec3) -> Result<(), PhysicsError>;

    /// # Errors
    /// Returns [`PhysicsError::StaleBody`] for a released body.
    fn body(&self, handle: BodyHandle) -> Result<BodyState, PhysicsError>;

    /// Advances the simulation by `dt` seconds.
    fn step(&mut self, dt: f32);

    fn body_count(&self) -> usize;

    fn joint_count(&self) -> usize;

    /// # Errors
    /// Returns [`PhysicsError::StaleBody`] for a released body.
    fn translation(&self, handle: BodyHandle) -> Result<Vec3, PhysicsError> {
        self.body(handle).map(|state| state.position)
    }

    /// # Errors
    /// Returns [`PhysicsError::StaleBody`] for a released body.
    fn rotation(&self, handle: BodyHandle) -> Result<Quat, PhysicsError> {
        self.body(handle).map(|state| state.rotation)
    }

    /// # Errors
    /// Returns [`PhysicsError::StaleBody`] for a released body.
    fn linear_velocity(&self, handle: BodyHandle) -> Result<Vec3, PhysicsError> {
        self.body(handle).map(|state| state.linear_velocity)
    }

    /// # Errors
    /// Returns [`PhysicsError::StaleBody`] for a released body.
    fn angular_velocity(&self, handle: BodyHandle) -> Result<Vec3, PhysicsError> {
        self.body(handle).map(|state| state.angular_velocity)
    }
}
