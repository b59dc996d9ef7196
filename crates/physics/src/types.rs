//! Body and joint descriptions plus the read-only body snapshot.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// How the world moves a body.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionMode {
    /// Integrated under gravity and joint corrections.
    Dynamic,
    /// Moved to an explicitly set target translation each step, ignores forces.
    KinematicTarget,
    /// Never moves.
    Fixed,
}

/// Collision-free shape used only to derive the inertia tensor.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Unit inertia per unit mass.
    Point,
    Ball { radius: f32 },
    Cuboid { half_extents: Vec3 },
}

impl Shape {
    /// Diagonal of the body-local inertia tensor for the given mass.
    #[must_use]
    pub fn principal_inertia(&self, mass: f32) -> Vec3 {
        match *self {
            Shape::Point => Vec3::splat(mass),
            Shape::Ball { radius } => Vec3::splat(0.4 * mass * radius * radius),
            Shape::Cuboid { half_extents: h } => {
                let sq = h * h;
                Vec3::new(sq.y + sq.z, sq.x + sq.z, sq.x + sq.y) * (mass / 3.0)
            }
        }
    }
}

/// Everything needed to allocate one rigid body.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyDesc {
    pub mode: MotionMode,
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub mass: f32,
    pub shape: Shape,
    /// Whether the body may fall asleep once it comes to rest.
    pub can_sleep: bool,
}

impl BodyDesc {
    #[must_use]
    pub fn new(mode: MotionMode, position: Vec3) -> Self {
        Self {
            mode,
            position,
            rotation: Quat::IDENTITY,
            linear_damping: 0.0,
            angular_damping: 0.0,
            mass: 1.0,
            shape: Shape::Point,
            can_sleep: true,
        }
    }

    #[must_use]
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    #[must_use]
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    #[must_use]
    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    #[must_use]
    pub fn with_can_sleep(mut self, can_sleep: bool) -> Self {
        self.can_sleep = can_sleep;
        self
    }
}

/// Joint constraint flavour.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum JointKind {
    /// Inequality constraint: the anchors may get closer but never further
    /// apart than `max_distance`.
    Rope { max_distance: f32 },
    /// Ball and socket: the anchors coincide, rotation is free.
    Spherical,
}

/// Description of a joint between two bodies, anchors in body-local space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct JointDesc {
    pub kind: JointKind,
    pub body_a: crate::BodyHandle,
    pub body_b: crate::BodyHandle,
    pub anchor_a: Vec3,
    pub anchor_b: Vec3,
}

impl JointDesc {
    #[must_use]
    pub fn rope(
        body_a: crate::BodyHandle,
        body_b: crate::BodyHandle,
        anchors: [Vec3; 2],
        rest_length: f32,
    ) -> Self {
        Self {
            kind: JointKind::Rope {
                max_distance: rest_length,
            },
            body_a,
            body_b,
            anchor_a: anchors[0],
            anchor_b: anchors[1],
        }
    }

    #[must_use]
    pub fn spherical(
        body_a: crate::BodyHandle,
        body_b: crate::BodyHandle,
        anchors: [Vec3; 2],
    ) -> Self {
        Self {
            kind: JointKind::Spherical,
            body_a,
            body_b,
            anchor_a: anchors[0],
            anchor_b: anchors[1],
        }
    }
}

/// Read-only snapshot of a body, copied out of the world on request.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BodyState {
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mode: MotionMode,
    pub sleeping: bool,
}
