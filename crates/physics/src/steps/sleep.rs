use crate::body::RigidBody;
use crate::types::MotionMode;

/// Thresholds for putting a resting body to sleep.
#[derive(Copy, Clone, Debug)]
pub(crate) struct SleepPolicy {
    pub linear_threshold: f32,
    pub angular_threshold: f32,
    pub time_to_sleep: f32,
}

pub(crate) fn update_sleep(body: &mut RigidBody, policy: SleepPolicy, dt: f32) {
    if body.mode != MotionMode::Dynamic || !body.can_sleep || body.sleeping {
        return;
    }
    let resting = body.linear_velocity.length() < policy.linear_threshold
        && body.angular_velocity.length() < policy.angular_threshold;
    if !resting {
        body.sleep_timer = 0.0;
        return;
    }
    body.sleep_timer += dt;
    if body.sleep_timer >= policy.time_to_sleep {
        body.sleeping = true;
        body.linear_velocity = glam::Vec3::ZERO;
        body.angular_velocity = glam::Vec3::ZERO;
    }
}
