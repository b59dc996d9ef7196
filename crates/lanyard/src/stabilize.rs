//! Proportional yaw correction keeping the card from spinning up.

use glam::{EulerRot, Quat, Vec3};
use physics::{BodyHandle, PhysicsEngine};

use crate::config::StabilizerConfig;
use crate::error::ChainError;

#[derive(Clone, Debug, Default)]
pub struct StabilizationController {
    config: StabilizerConfig,
}

impl StabilizationController {
    #[must_use]
    pub fn new(config: StabilizerConfig) -> Self {
        Self { config }
    }

    /// Angular velocity after pulling yaw toward zero; pitch and roll rates
    /// pass through untouched.
    #[must_use]
    pub fn corrected(&self, angular_velocity: Vec3, rotation: Quat) -> Vec3 {
        let (yaw, _, _) = rotation.to_euler(EulerRot::YXZ);
        Vec3::new(
            angular_velocity.x,
            angular_velocity.y - yaw * self.config.damping_factor,
            angular_velocity.z,
        )
    }

    /// Applies the correction to `card`. Runs once per physics tick,
    /// whether or not the card is being dragged. While the card is held
    /// kinematically the engine drops the write, so the correction only
    /// acts on a free card.
    ///
    /// # Errors
    /// Returns a physics error for a stale card handle.
    pub fn apply(&self, engine: &mut dyn PhysicsEngine, card: BodyHandle) -> Result<(), ChainError> {
        let state = engine.body(card)?;
        let corrected = self.corrected(state.angular_velocity, state.rotation);
        if corrected != state.angular_velocity {
            engine.set_angular_velocity(card, corrected)?;
        }
        Ok(())
    }
}
