//! World-internal body and joint records.

use glam::{Quat, Vec3};

use crate::types::{BodyDesc, BodyState, JointKind, MotionMode};
use crate::BodyHandle;

pub(crate) struct RigidBody {
    pub mode: MotionMode,
    pub position: Vec3,
    pub rotation: Quat,
    pub prev_position: Vec3,
    pub prev_rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub inverse_mass: f32,
    /// Body-local principal inverse inertia.
    pub inverse_inertia: Vec3,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Translation at the start of the current step, kinematic bodies only.
    pub kinematic_start: Vec3,
    pub kinematic_target: Option<Vec3>,
    pub can_sleep: bool,
    pub sleeping: bool,
    pub sleep_timer: f32,
}

impl RigidBody {
    pub fn from_desc(desc: &BodyDesc) -> Self {
        let inertia = desc.shape.principal_inertia(desc.mass);
        let inverse_inertia = Vec3::new(
            recip_or_zero(inertia.x),
            recip_or_zero(inertia.y),
            recip_or_zero(inertia.z),
        );
        let rotation = desc.rotation.normalize();
        Self {
            mode: desc.mode,
            position: desc.position,
            rotation,
            prev_position: desc.position,
            prev_rotation: rotation,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            inverse_mass: recip_or_zero(desc.mass),
            inverse_inertia,
            linear_damping: desc.linear_damping,
            angular_damping: desc.angular_damping,
            kinematic_start: desc.position,
            kinematic_target: None,
            can_sleep: desc.can_sleep,
            sleeping: false,
            sleep_timer: 0.0,
        }
    }

    pub fn state(&self) -> BodyState {
        BodyState {
            position: self.position,
            rotation: self.rotation,
            linear_velocity: self.linear_velocity,
            angular_velocity: self.angular_velocity,
            mode: self.mode,
            sleeping: self.sleeping,
        }
    }

    /// Dynamic and awake: the only bodies joint corrections may move.
    pub fn is_simulated(&self) -> bool {
        self.mode == MotionMode::Dynamic && !self.sleeping
    }

    pub fn wake(&mut self) {
        self.sleeping = false;
        self.sleep_timer = 0.0;
    }

    pub fn set_mode(&mut self, mode: MotionMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.kinematic_target = None;
        self.kinematic_start = self.position;
        if mode == MotionMode::Fixed {
            self.linear_velocity = Vec3::ZERO;
            self.angular_velocity = Vec3::ZERO;
        }
        self.wake();
    }

    fn world_inverse_inertia(&self, v: Vec3) -> Vec3 {
        if !self.is_simulated() {
            return Vec3::ZERO;
        }
        self.rotation * (self.inverse_inertia * (self.rotation.inverse() * v))
    }

    /// Inverse mass seen by a positional correction along `n` applied at `r`.
    pub fn generalized_inverse_mass(&self, r: Vec3, n: Vec3) -> f32 {
        if !self.is_simulated() {
            return 0.0;
        }
        let rn = r.cross(n);
        self.inverse_mass + rn.dot(self.world_inverse_inertia(rn))
    }

    /// Applies a positional impulse at world offset `r` from the body origin.
    pub fn apply_correction(&mut self, impulse: Vec3, r: Vec3) {
        if !self.is_simulated() {
            return;
        }
        self.position += impulse * self.inverse_mass;
        let dtheta = self.world_inverse_inertia(r.cross(impulse));
        let spin = Quat::from_xyzw(dtheta.x, dtheta.y, dtheta.z, 0.0) * self.rotation;
        self.rotation = (self.rotation + spin * 0.5).normalize();
    }
}

pub(crate) struct Joint {
    pub kind: JointKind,
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub anchor_a: Vec3,
    pub anchor_b: Vec3,
}

fn recip_or_zero(value: f32) -> f32 {
    if value > f32::EPSILON && value.is_finite() {
        value.recip()
    } else {
        0.0
    }
}
