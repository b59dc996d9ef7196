//! # Reference World
//!
//! A CPU rigid-body world implementing [`PhysicsEngine`]. Each step is split
//! into substeps; every substep predicts poses, projects joints and derives
//! velocities from the corrected poses (position-based dynamics).
//! Collision is not simulated.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::body::{Joint, RigidBody};
use crate::engine::PhysicsEngine;
use crate::error::PhysicsError;
use crate::steps::integration::{derive_velocities, predict};
use crate::steps::joint::solve_joint;
use crate::steps::sleep::{update_sleep, SleepPolicy};
use crate::types::{BodyDesc, BodyState, JointDesc, MotionMode};
use crate::{BodyHandle, JointHandle};

/// Simulation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub gravity: Vec3,
    /// Substeps per call to [`PhysicsEngine::step`].
    pub substeps: u32,
    /// Upper bound on live bodies; `None` is unbounded.
    pub max_bodies: Option<usize>,
    /// Upper bound on live joints; `None` is unbounded.
    pub max_joints: Option<usize>,
    pub sleep_linear_threshold: f32,
    pub sleep_angular_threshold: f32,
    /// Seconds a body must rest before it falls asleep.
    pub time_to_sleep: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -50.0, 0.0),
            substeps: 8,
            max_bodies: None,
            max_joints: None,
            sleep_linear_threshold: 0.05,
            sleep_angular_threshold: 0.05,
            time_to_sleep: 0.5,
        }
    }
}

/// Lifetime allocation counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub live_bodies: usize,
    pub live_joints: usize,
    pub created_bodies: usize,
    pub created_joints: usize,
    pub released_bodies: usize,
    pub released_joints: usize,
}

pub struct World {
    pub(crate) config: WorldConfig,
    pub(crate) bodies: Arena<RigidBody>,
    pub(crate) joints: Arena<Joint>,
    pub(crate) stats: WorldStats,
    elapsed: f64,
}

impl World {
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            bodies: Arena::new(),
            joints: Arena::new(),
            stats: WorldStats::default(),
            elapsed: 0.0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    #[must_use]
    pub fn stats(&self) -> WorldStats {
        WorldStats {
            live_bodies: self.bodies.len(),
            live_joints: self.joints.len(),
            ..self.stats
        }
    }

    /// Simulated seconds since construction.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Runs `steps` steps of `dt` seconds.
    pub fn run(&mut self, dt: f32, steps: usize) {
        for _ in 0..steps {
            self.step(dt);
        }
    }

    pub(crate) fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody, PhysicsError> {
        self.bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::StaleBody(handle))
    }

    fn sleep_policy(&self) -> SleepPolicy {
        SleepPolicy {
            linear_threshold: self.config.sleep_linear_threshold,
            angular_threshold: self.config.sleep_angular_threshold,
            time_to_sleep: self.config.time_to_sleep,
        }
    }

    fn solve_joints(&mut self) {
        for (_, joint) in self.joints.iter() {
            // Joints outliving one of their bodies are skipped, not faulted.
            if let Some((a, b)) = self.bodies.get2_mut(joint.body_a.0, joint.body_b.0) {
                solve_joint(joint, a, b);
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl PhysicsEngine for World {
    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError> {
        self.insert_body(desc)
    }

    fn create_joint(&mut self, desc: &JointDesc) -> Result<JointHandle, PhysicsError> {
        self.insert_joint(desc)
    }

    fn destroy_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        self.bodies
            .remove(handle.0)
            .ok_or(PhysicsError::StaleBody(handle))?;
        self.stats.released_bodies += 1;
        Ok(())
    }

    fn destroy_joint(&mut self, handle: JointHandle) -> Result<(), PhysicsError> {
        self.joints
            .remove(handle.0)
            .ok_or(PhysicsError::StaleJoint(handle))?;
        self.stats.released_joints += 1;
        Ok(())
    }

    fn wake(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.wake();
        Ok(())
    }

    fn set_motion_mode(&mut self, handle: BodyHandle, mode: MotionMode) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.set_mode(mode);
        Ok(())
    }

    fn set_kinematic_target(&mut self, handle: BodyHandle, position: Vec3) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        if body.mode != MotionMode::KinematicTarget {
            return Err(PhysicsError::NotKinematic(handle));
        }
        body.kinematic_target = Some(position);
        Ok(())
    }

    fn set_angular_velocity(&mut self, handle: BodyHandle, angular_velocity: Vec3) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        if body.mode == MotionMode::Dynamic {
            body.angular_velocity = angular_velocity;
        }
        Ok(())
    }

    fn body(&self, handle: BodyHandle) -> Result<BodyState, PhysicsError> {
        self.bodies
            .get(handle.0)
            .map(RigidBody::state)
            .ok_or(PhysicsError::StaleBody(handle))
    }

    fn step(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            tracing::debug!("Ignoring step with dt = {dt}");
            return;
        }
        let substeps = self.config.substeps.max(1);
        #[allow(clippy::cast_precision_loss)]
        let h = dt / substeps as f32;
        let gravity = self.config.gravity;

        for body in self.bodies.values_mut() {
            body.kinematic_start = body.position;
        }

        for k in 0..substeps {
            #[allow(clippy::cast_precision_loss)]
            let fraction = (k + 1) as f32 / substeps as f32;
            for body in self.bodies.values_mut() {
                predict(body, gravity, h, fraction);
            }
            self.solve_joints();
            for body in self.bodies.values_mut() {
                derive_velocities(body, h);
            }
        }

        let policy = self.sleep_policy();
        for body in self.bodies.values_mut() {
            update_sleep(body, policy, dt);
        }
        self.elapsed += f64::from(dt);
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn joint_count(&self) -> usize {
        self.joints.len()
    }
}
