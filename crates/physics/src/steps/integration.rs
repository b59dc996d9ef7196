//! Prediction and velocity derivation for one substep.

use glam::{Quat, Vec3};

use crate::body::RigidBody;
use crate::types::MotionMode;

/// Advances `rotation` by angular velocity `omega` over `h` seconds.
pub(crate) fn integrate_rotation(rotation: Quat, omega: Vec3, h: f32) -> Quat {
    let spin = Quat::from_xyzw(omega.x, omega.y, omega.z, 0.0) * rotation;
    (rotation + spin * (0.5 * h)).normalize()
}

/// Predicts the next pose. `fraction` is how far through the full step this
/// substep ends, used to walk kinematic bodies toward their target.
pub(crate) fn predict(body: &mut RigidBody, gravity: Vec3, h: f32, fraction: f32) {
    body.prev_position = body.position;
    body.prev_rotation = body.rotation;
    match body.mode {
        MotionMode::Dynamic if !body.sleeping => {
            body.linear_velocity += gravity * h;
            body.position += body.linear_velocity * h;
            body.rotation = integrate_rotation(body.rotation, body.angular_velocity, h);
        }
        MotionMode::KinematicTarget => {
            if let Some(target) = body.kinematic_target {
                body.position = body.kinematic_start.lerp(target, fraction);
            }
        }
        MotionMode::Dynamic | MotionMode::Fixed => {}
    }
}

/// Recovers velocities from the corrected pose and applies damping.
pub(crate) fn derive_velocities(body: &mut RigidBody, h: f32) {
    match body.mode {
        MotionMode::Dynamic if !body.sleeping => {
            body.linear_velocity = (body.position - body.prev_position) / h;
            body.angular_velocity = angular_velocity_between(body.prev_rotation, body.rotation, h);
            body.linear_velocity *= 1.0 / (1.0 + h * body.linear_damping);
            body.angular_velocity *= 1.0 / (1.0 + h * body.angular_damping);
        }
        MotionMode::KinematicTarget => {
            body.linear_velocity = (body.position - body.prev_position) / h;
            body.angular_velocity = angular_velocity_between(body.prev_rotation, body.rotation, h);
        }
        MotionMode::Dynamic | MotionMode::Fixed => {}
    }
}

fn angular_velocity_between(from: Quat, to: Quat, h: f32) -> Vec3 {
    let dq = to * from.inverse();
    let omega = Vec3::new(dq.x, dq.y, dq.z) * (2.0 / h);
    if dq.w < 0.0 {
        -omega
    } else {
        omega
    }
}
