//! Position-based joint projection.

use crate::body::{Joint, RigidBody};
use crate::types::JointKind;

const EPSILON: f32 = 1e-6;
/// Constraint error above which a sleeping participant is woken.
const WAKE_ERROR: f32 = 1e-3;

/// Projects one joint; `a` and `b` are the joint's bodies in order.
pub(crate) fn solve_joint(joint: &Joint, a: &mut RigidBody, b: &mut RigidBody) {
    let ra = a.rotation * joint.anchor_a;
    let rb = b.rotation * joint.anchor_b;
    let delta = (b.position + rb) - (a.position + ra);
    let distance = delta.length();
    let error = match joint.kind {
        JointKind::Rope { max_distance } => distance - max_distance,
        JointKind::Spherical => distance,
    };
    if error <= EPSILON || distance <= EPSILON {
        return;
    }
    if error > WAKE_ERROR {
        if a.sleeping {
            a.wake();
        }
        if b.sleeping {
            b.wake();
        }
    }

    let n = delta / distance;
    let w = a.generalized_inverse_mass(ra, n) + b.generalized_inverse_mass(rb, n);
    if w <= EPSILON {
        return;
    }
    let impulse = n * (error / w);
    a.apply_correction(impulse, ra);
    b.apply_correction(-impulse, rb);
}
