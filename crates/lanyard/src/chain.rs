//! # Joint Chain
//!
//! One hanging card: a fixed anchor, three rope links and the card body,
//! joined in a fixed order. The chain owns only handles; the bodies and
//! joints live in the physics engine.
//!
//! ```text
//! anchor ──rope── j1 ──rope── j2 ──rope── j3 ──spherical── card
//! ```

use glam::{Quat, Vec3};
use physics::{BodyDesc, BodyHandle, JointDesc, JointHandle, MotionMode, PhysicsEngine, Shape};

use crate::config::ChainConfig;
use crate::error::ChainError;

/// Bodies per chain.
pub const CHAIN_LEN: usize = 5;
/// Joints per chain: three ropes and one spherical.
pub const JOINT_COUNT: usize = 4;

/// Position of a body within the chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Link {
    Anchor,
    J1,
    J2,
    J3,
    Card,
}

impl Link {
    pub const ALL: [Link; CHAIN_LEN] = [Link::Anchor, Link::J1, Link::J2, Link::J3, Link::Card];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Link::Anchor => 0,
            Link::J1 => 1,
            Link::J2 => 2,
            Link::J3 => 3,
            Link::Card => 4,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BodyTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl BodyTransform {
    /// Position lerped and rotation slerped toward `to` by `t` in `[0, 1]`.
    #[must_use]
    pub fn lerp(&self, to: &BodyTransform, t: f32) -> BodyTransform {
        BodyTransform {
            position: self.position.lerp(to.position, t),
            rotation: self.rotation.slerp(to.rotation, t),
        }
    }
}

/// World transforms of the five bodies, in chain order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ChainTransforms {
    pub anchor: BodyTransform,
    pub j1: BodyTransform,
    pub j2: BodyTransform,
    pub j3: BodyTransform,
    pub card: BodyTransform,
}

impl ChainTransforms {
    #[must_use]
    pub fn to_array(&self) -> [BodyTransform; CHAIN_LEN] {
        [self.anchor, self.j1, self.j2, self.j3, self.card]
    }

    #[must_use]
    pub fn get(&self, link: Link) -> BodyTransform {
        self.to_array()[link.index()]
    }

    /// Pose between the previous physics step (`alpha = 0`) and this one
    /// (`alpha = 1`).
    #[must_use]
    pub fn interpolate(&self, previous: &ChainTransforms, alpha: f32) -> ChainTransforms {
        let t = alpha.clamp(0.0, 1.0);
        ChainTransforms {
            anchor: previous.anchor.lerp(&self.anchor, t),
            j1: previous.j1.lerp(&self.j1, t),
            j2: previous.j2.lerp(&self.j2, t),
            j3: previous.j3.lerp(&self.j3, t),
            card: previous.card.lerp(&self.card, t),
        }
    }
}

pub struct JointChain {
    bodies: [BodyHandle; CHAIN_LEN],
    joints: [JointHandle; JOINT_COUNT],
    card_anchor: Vec3,
    alive: bool,
}

impl JointChain {
    /// Allocates the five bodies and four joints of a chain whose group origin
    /// is `anchor_position`.
    ///
    /// On failure every body and joint allocated so far is released before
    /// the error is returned, leaving the engine as it was.
    ///
    /// # Errors
    /// Returns [`ChainError::Allocation`] naming the part that failed.
    pub fn create(
        engine: &mut dyn PhysicsEngine,
        anchor_position: Vec3,
        config: &ChainConfig,
    ) -> Result<Self, ChainError> {
        let mut bodies = Vec::with_capacity(CHAIN_LEN);
        let mut joints = Vec::with_capacity(JOINT_COUNT);
        let built = build(engine, anchor_position, config, &mut bodies, &mut joints)
            .and_then(|()| Ok((to_array(&bodies)?, to_array(&joints)?)));
        match built {
            Ok((bodies, joints)) => {
                tracing::debug!("Created chain anchored at {anchor_position}");
                Ok(Self {
                    bodies,
                    joints,
                    card_anchor: config.card_anchor,
                    alive: true,
                })
            }
            Err(e) => {
                release(engine, &bodies, &joints);
                Err(e)
            }
        }
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub fn handle(&self, link: Link) -> BodyHandle {
        self.bodies[link.index()]
    }

    #[must_use]
    pub fn card(&self) -> BodyHandle {
        self.handle(Link::Card)
    }

    #[must_use]
    pub fn bodies(&self) -> &[BodyHandle; CHAIN_LEN] {
        &self.bodies
    }

    #[must_use]
    pub fn joints(&self) -> &[JointHandle; JOINT_COUNT] {
        &self.joints
    }

    /// Card-local attachment point of the spherical joint.
    #[must_use]
    pub fn card_anchor(&self) -> Vec3 {
        self.card_anchor
    }

    /// # Errors
    /// Returns [`ChainError::Destroyed`] after [`JointChain::destroy`], or a
    /// physics error if a handle went stale underneath the chain.
    pub fn current_transforms(&self, engine: &dyn PhysicsEngine) -> Result<ChainTransforms, ChainError> {
        if !self.alive {
            return Err(ChainError::Destroyed);
        }
        let read = |link: Link| -> Result<BodyTransform, ChainError> {
            let state = engine.body(self.handle(link))?;
            Ok(BodyTransform {
                position: state.position,
                rotation: state.rotation,
            })
        };
        Ok(ChainTransforms {
            anchor: read(Link::Anchor)?,
            j1: read(Link::J1)?,
            j2: read(Link::J2)?,
            j3: read(Link::J3)?,
            card: read(Link::Card)?,
        })
    }

    /// Wakes every body of the chain.
    ///
    /// # Errors
    /// Returns [`ChainError::Destroyed`] after teardown.
    pub fn wake_all(&self, engine: &mut dyn PhysicsEngine) -> Result<(), ChainError> {
        if !self.alive {
            return Err(ChainError::Destroyed);
        }
        for &body in &self.bodies {
            engine.wake(body)?;
        }
        Ok(())
    }

    /// Releases the joints, then the bodies. A second call is a no-op.
    pub fn destroy(&mut self, engine: &mut dyn PhysicsEngine) {
        if !self.alive {
            return;
        }
        self.alive = false;
        release(engine, &self.bodies, &self.joints);
        tracing::debug!("Destroyed chain, card {}", self.card());
    }
}

fn build(
    engine: &mut dyn PhysicsEngine,
    origin: Vec3,
    config: &ChainConfig,
    bodies: &mut Vec<BodyHandle>,
    joints: &mut Vec<JointHandle>,
) -> Result<(), ChainError> {
    let link_shape = Shape::Ball {
        radius: config.link_radius,
    };
    let link = |offset: Vec3| {
        BodyDesc::new(MotionMode::Dynamic, origin + offset)
            .with_damping(config.linear_damping, config.angular_damping)
            .with_mass(config.link_mass)
            .with_shape(link_shape)
            .with_can_sleep(config.can_sleep)
    };
    let descs = [
        BodyDesc::new(MotionMode::Fixed, origin)
            .with_damping(config.linear_damping, config.angular_damping),
        link(config.j1_offset),
        link(config.j2_offset),
        link(config.j3_offset),
        BodyDesc::new(MotionMode::Dynamic, origin + config.card_offset)
            .with_damping(config.linear_damping, config.angular_damping)
            .with_mass(config.card_mass)
            .with_shape(Shape::Cuboid {
                half_extents: config.card_half_extents,
            })
            .with_can_sleep(config.can_sleep),
    ];
    for desc in &descs {
        let handle = engine
            .create_body(desc)
            .map_err(|source| ChainError::Allocation { what: "body", source })?;
        bodies.push(handle);
    }

    let ropes = [(0, 1), (1, 2), (2, 3)];
    for (a, b) in ropes {
        let desc = JointDesc::rope(bodies[a], bodies[b], [Vec3::ZERO; 2], config.rope_length);
        let handle = engine
            .create_joint(&desc)
            .map_err(|source| ChainError::Allocation { what: "rope joint", source })?;
        joints.push(handle);
    }
    let hinge = JointDesc::spherical(bodies[3], bodies[4], [Vec3::ZERO, config.card_anchor]);
    let handle = engine
        .create_joint(&hinge)
        .map_err(|source| ChainError::Allocation {
            what: "spherical joint",
            source,
        })?;
    joints.push(handle);
    Ok(())
}

/// Releases joints before bodies. Handles already gone are logged and skipped.
fn release(engine: &mut dyn PhysicsEngine, bodies: &[BodyHandle], joints: &[JointHandle]) {
    for &joint in joints.iter().rev() {
        if let Err(e) = engine.destroy_joint(joint) {
            tracing::warn!("Releasing chain joint failed: {e}");
        }
    }
    for &body in bodies.iter().rev() {
        if let Err(e) = engine.destroy_body(body) {
            tracing::warn!("Releasing chain body failed: {e}");
        }
    }
}

fn to_array<T: Copy, const N: usize>(items: &[T]) -> Result<[T; N], ChainError> {
    <[T; N]>::try_from(items)
        .map_err(|_| ChainError::Physics(physics::PhysicsError::InvalidDescription("chain arity mismatch")))
}
